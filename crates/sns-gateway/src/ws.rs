//! `WebSocket` handler for the timeline stream.
//!
//! Clients connect to `GET /ws/timeline`. Every frame in either direction
//! is a JSON-encoded [`Message`] in a text frame. The first client frame
//! names the user; every later one is a post. Binary and pong frames are
//! ignored, and Axum answers pings itself.
//!
//! A client close or transport error ends the session quietly. A text
//! frame that is not a valid [`Message`], or a failure to open the
//! session, is reported with a close frame carrying the reason.

use std::future;
use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message as Frame, WebSocket, close_code};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use sns_core::{ErrorKind, TimelineError};
use sns_types::Message;
use tracing::{debug, warn};

use crate::state::AppState;

/// Frames buffered between the session and the socket writer.
const WRITER_BUFFER: usize = 16;

/// Longest close reason a control frame can carry.
const MAX_CLOSE_REASON: usize = 123;

/// Upgrade an HTTP request to a timeline `WebSocket`.
///
/// # Route
///
/// `GET /ws/timeline`
pub async fn timeline(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_timeline(socket, state))
}

/// Run one timeline session over `socket`.
async fn handle_timeline(socket: WebSocket, state: Arc<AppState>) {
    debug!("Timeline client connected");

    let (mut sink, stream) = socket.split();
    let inbound = stream
        .take_while(|frame| future::ready(!matches!(frame, Ok(Frame::Close(_)) | Err(_))))
        .filter_map(|frame| future::ready(decode(frame)));
    let inbound = std::pin::pin!(inbound);

    // The writer owns the socket sink for the whole session and hands it
    // back so a close frame can follow the last pushed message.
    let (tx, mut rx) = mpsc::channel::<Message>(WRITER_BUFFER);
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.next().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize timeline message: {e}");
                    continue;
                }
            };
            if sink.send(Frame::Text(json.into())).await.is_err() {
                debug!("Timeline client disconnected (send failed)");
                break;
            }
        }
        sink
    });

    let result = state.service.run_timeline(inbound, tx).await;

    let Ok(mut sink) = writer.await else {
        return;
    };
    if let Err(e) = result {
        debug!(error = %e, "Timeline session ended with error");
        let frame = CloseFrame {
            code: close_code_for(&e),
            reason: close_reason(&e.to_string()).into(),
        };
        let _ = sink.send(Frame::Close(Some(frame))).await;
    }
}

/// Map a socket frame to a timeline item; `None` skips the frame.
fn decode(frame: Result<Frame, axum::Error>) -> Option<Result<Message, serde_json::Error>> {
    match frame {
        Ok(Frame::Text(text)) => Some(serde_json::from_str(text.as_str())),
        _ => None,
    }
}

fn close_code_for(error: &TimelineError) -> u16 {
    match error.kind() {
        ErrorKind::Invalid => close_code::INVALID,
        ErrorKind::Internal => close_code::ERROR,
        ErrorKind::Cancelled => close_code::NORMAL,
        ErrorKind::NotFound | ErrorKind::AlreadyExists => close_code::POLICY,
    }
}

/// Truncate `reason` to fit a close frame without splitting a character.
fn close_reason(reason: &str) -> String {
    if reason.len() <= MAX_CLOSE_REASON {
        return reason.to_owned();
    }
    let end = reason
        .char_indices()
        .map(|(i, c)| i.saturating_add(c.len_utf8()))
        .take_while(|&end| end <= MAX_CLOSE_REASON)
        .last()
        .unwrap_or(0);
    reason.get(..end).unwrap_or_default().to_owned()
}

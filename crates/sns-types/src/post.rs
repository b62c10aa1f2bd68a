//! The immutable post value distributed by the fanout engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages::Message;

/// A single post, fixed at the moment the server receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Username of the session the post arrived on.
    pub author: String,
    /// Body with line breaks removed.
    pub body: String,
    /// Seconds-resolution timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Post {
    /// Build a post, stripping line breaks from the body and dropping
    /// sub-second precision from the timestamp.
    pub fn new(author: impl Into<String>, body: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            body: strip_line_breaks(body),
            timestamp: truncate_to_seconds(timestamp),
        }
    }

    /// Build a post from an inbound timeline frame.
    ///
    /// The author is always the bound session user, never the frame's
    /// `username` field. A missing or out-of-range client timestamp is
    /// replaced by `received_at`.
    pub fn from_message(author: &str, message: &Message, received_at: DateTime<Utc>) -> Self {
        let timestamp = message
            .timestamp
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(received_at);
        Self::new(author, &message.msg, timestamp)
    }

    /// The frame pushed to followers for this post.
    pub fn to_message(&self) -> Message {
        Message {
            username: self.author.clone(),
            msg: self.body.clone(),
            timestamp: Some(self.timestamp.timestamp()),
        }
    }
}

/// Remove every `\r` and `\n` from `text`.
pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.timestamp(), 0).unwrap_or(ts)
}

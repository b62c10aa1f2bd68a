//! Line codec for log records.
//!
//! A record is one line: `username,message,timestamp`, with the timestamp
//! rendered as `YYYY-MM-DD HH:MM:SS` in UTC. Line breaks and the delimiter
//! are removed from every field before encoding, so each record always
//! splits back into exactly three fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use sns_types::{Message, Post};

/// Field separator within a record line.
pub const DELIMITER: char = ',';

/// `strftime` pattern of the timestamp field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One decoded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Author of the post.
    pub username: String,
    /// Post body.
    pub message: String,
    /// Post time, seconds resolution.
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// Record for a post, with every field sanitized for the line format.
    pub fn from_post(post: &Post) -> Self {
        Self {
            username: sanitize(&post.author),
            message: sanitize(&post.body),
            timestamp: post.timestamp,
        }
    }

    /// Encode as a single line, without the trailing newline.
    pub fn encode(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            sanitize(&self.username),
            sanitize(&self.message),
            self.timestamp.format(TIMESTAMP_FORMAT),
        )
    }

    /// Decode one line. Returns `None` for anything that is not exactly
    /// three fields with a parsable timestamp.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        let [username, message, timestamp] = fields.as_slice() else {
            return None;
        };
        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .ok()?
            .and_utc();
        Some(Self {
            username: (*username).to_owned(),
            message: (*message).to_owned(),
            timestamp,
        })
    }

    /// The timeline frame that replays this record to a client.
    pub fn to_message(&self) -> Message {
        Message {
            username: self.username.clone(),
            msg: self.message.clone(),
            timestamp: Some(self.timestamp.timestamp()),
        }
    }
}

fn sanitize(field: &str) -> String {
    field
        .chars()
        .filter(|&c| c != DELIMITER && c != '\r' && c != '\n')
        .collect()
}

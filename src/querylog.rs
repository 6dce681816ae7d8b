//! Query log entries as written by the resolver, one JSON object per line

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

/// Splits a log blob into entries on `\n`
///
/// A final entry without a terminating newline is kept, an empty blob gives
/// no entries. Nothing is trimmed or validated here.
pub fn split_entries(log: &str) -> Vec<&str> {
    let mut entries = log.split('\n').collect::<Vec<_>>();
    if entries.last() == Some(&"") {
        entries.pop();
    }
    entries
}

/// One logged DNS transaction
///
/// Only the fields this crate needs are read, anything else in the object is
/// ignored. All three are required.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    /// Host name the client asked for
    #[serde(rename = "QH")]
    pub host: String,
    #[serde(rename = "QT")]
    pub query_type: String,
    /// The full response message, base64 encoded
    #[serde(rename = "Answer")]
    pub answer: String,
}

impl LogEntry {
    pub fn from_json(raw: &str) -> Result<LogEntry, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn answer_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.answer)
    }
}

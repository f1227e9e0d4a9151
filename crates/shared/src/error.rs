use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error text reported by the server next to `success: false`.
///
/// Validation failures arrive as a map of field name to messages, everything else as a
/// plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Text(String),
    Fields(BTreeMap<String, Vec<String>>),
    Other(serde_json::Value),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Text(text) => f.write_str(text),
            ServerMessage::Fields(fields) => {
                let joined = fields
                    .values()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("; ");
                f.write_str(&joined)
            }
            ServerMessage::Other(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("server rejected request: {message}")]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<Option<&ServerMessage>> for Rejection {
    fn from(value: Option<&ServerMessage>) -> Self {
        match value {
            Some(message) => Self::new(message.to_string()),
            None => Self::new("no reason given"),
        }
    }
}

//! Errors produced while decoding a completion stream.

use std::fmt;
use std::io;

use serde::de::DeserializeOwned;

/// Error payload the server attached to a data frame after `event: error`.
#[derive(Debug, Clone)]
pub struct ServerError {
    /// Message extracted by the stream's error handler.
    pub message: String,
    /// The decoded frame as raw JSON, for callers that want more detail.
    pub payload: serde_json::Value,
}

impl ServerError {
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream transport error: {0}")]
    Transport(#[source] io::Error),

    #[error("stream read deadline exceeded")]
    Timeout,

    #[error("failed to decode stream message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unhandled {event} event with line: {line}")]
    Protocol { event: &'static str, line: String },

    #[error("unhandled {event} event at end of stream")]
    UnexpectedEof { event: &'static str },

    #[error("{0}")]
    Server(ServerError),

    #[error("stream already closed")]
    Closed,
}

impl StreamError {
    pub(crate) fn from_io(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::TimedOut {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }

    pub(crate) fn protocol(event: &'static str, line: &[u8]) -> Self {
        Self::Protocol {
            event,
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }

    /// Whether the error came from the server rather than from decoding.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server(_))
    }

    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server(err) => Some(err),
            _ => None,
        }
    }
}

//! Line classification for the completion event stream.

pub const START_EVENT_PREFIX: &[u8] = b"event: start";
pub const ADD_EVENT_PREFIX: &[u8] = b"event: add";
pub const FINISH_EVENT_PREFIX: &[u8] = b"event: stop";
pub const ERROR_EVENT_PREFIX: &[u8] = b"event: error";
pub const DATA_PREFIX: &[u8] = b"data: ";

/// What a single reassembled line means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `event: start`, advisory.
    Start,
    /// `event: add`, advisory.
    Add,
    /// `event: stop`: the producer is done, trailing data may still follow.
    Finish,
    /// `event: error`: the next data line carries an error payload.
    Error,
    /// `data: ` line; holds the payload with the prefix stripped.
    Data(&'a [u8]),
    /// Anything else, including blank separator lines.
    Other,
}

impl LineKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Add => "add",
            Self::Finish => "finish",
            Self::Error => "error",
            Self::Data(_) => "data",
            Self::Other => "other",
        }
    }
}

/// Classify a line by its prefix. Event prefixes win over `data: `.
pub fn classify(line: &[u8]) -> LineKind<'_> {
    if line.starts_with(START_EVENT_PREFIX) {
        LineKind::Start
    } else if line.starts_with(ADD_EVENT_PREFIX) {
        LineKind::Add
    } else if line.starts_with(FINISH_EVENT_PREFIX) {
        LineKind::Finish
    } else if line.starts_with(ERROR_EVENT_PREFIX) {
        LineKind::Error
    } else if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
        LineKind::Data(payload)
    } else {
        LineKind::Other
    }
}

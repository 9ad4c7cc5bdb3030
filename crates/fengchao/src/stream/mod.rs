//! Decoder for the completion service's event stream.
//!
//! The service answers streaming requests with a line-oriented body:
//!
//! ```text
//! event: start
//! data: {"choices":[...],"status":200}
//!
//! event: add
//! data: {"choices":[...],"status":200}
//!
//! event: stop
//! data: {"choices":[...],"status":200}
//! ```
//!
//! `event:` lines only annotate what follows; each `data: ` line is one JSON
//! frame. A frame after `event: error` is an error report.
//!
//! Layering, bottom up:
//! - [`LineSource`] produces lines, split into fragments when they exceed the
//!   buffer.
//! - [`classify`] names a reassembled line.
//! - [`DecoderState`] is the pure per-frame state machine.
//! - [`EventStream`] adds I/O, deadlines and typed decoding (pull mode).
//! - [`FrameStream`] runs an `EventStream` on a task (push mode).

pub mod classifier;
pub mod decoder;
pub mod error;
pub mod line_source;
pub mod sequence;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{classify, LineKind};
pub use decoder::{ErrorHandler, EventStream};
pub use error::{ServerError, StreamError};
pub use line_source::{
    body_reader, response_lines, BufferedLineSource, LineSource, RawLine, DEFAULT_LINE_CAPACITY,
};
pub use sequence::FrameStream;
pub use state::{DecoderState, Step};

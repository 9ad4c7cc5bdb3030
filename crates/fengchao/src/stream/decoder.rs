//! Pull-mode decoder: one typed frame per [`EventStream::next`] call.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use super::error::{ServerError, StreamError};
use super::line_source::LineSource;
use super::sequence::FrameStream;
use super::state::{DecoderState, Step};

/// Extracts a human-readable message from a frame that followed
/// `event: error`. `None` means the payload carried nothing useful.
pub type ErrorHandler<T> = fn(&T) -> Option<String>;

const UNHANDLED_ERROR_MESSAGE: &str = "unhandled error event";

/// Typed decoder over a [`LineSource`].
///
/// Owns the source; [`close`](Self::close) or dropping the decoder releases
/// it. Not safe to drive from two tasks at once (`next` takes `&mut self`).
pub struct EventStream<T> {
    source: Option<Box<dyn LineSource>>,
    state: DecoderState,
    handler: ErrorHandler<T>,
    deadline: Option<Instant>,
    id: String,
    _frame: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> EventStream<T> {
    pub fn new(source: impl LineSource + 'static, handler: ErrorHandler<T>) -> Self {
        let id = fengchao_common::new_correlation_id();
        debug!(stream = %id, "event stream opened");
        Self {
            source: Some(Box::new(source)),
            state: DecoderState::new(),
            handler,
            deadline: None,
            id,
            _frame: PhantomData,
        }
    }

    /// Bound every subsequent read by an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Read until the next frame.
    ///
    /// `Ok(None)` is clean termination: the body ended with no error frame
    /// owed. A frame that followed `event: error` comes back as
    /// [`StreamError::Server`].
    pub async fn next(&mut self) -> Result<Option<T>, StreamError> {
        loop {
            let source = self.source.as_mut().ok_or(StreamError::Closed)?;
            let read = match self.deadline {
                Some(deadline) => timeout_at(deadline, source.read_line())
                    .await
                    .map_err(|_| StreamError::Timeout)?,
                None => source.read_line().await,
            };

            let step = match read.map_err(StreamError::from_io)? {
                Some(line) => self.state.step(line),
                None => self.state.end_of_stream(),
            };

            match step {
                Step::Continue => continue,
                Step::End => {
                    debug!(stream = %self.id, "event stream finished");
                    return Ok(None);
                }
                Step::Frame { payload, errored } => {
                    return self.decode(&payload, errored).map(Some);
                }
                Step::Violation(err) => {
                    warn!(stream = %self.id, error = %err, "event stream protocol violation");
                    return Err(err);
                }
            }
        }
    }

    fn decode(&self, payload: &[u8], errored: bool) -> Result<T, StreamError> {
        let frame: T = serde_json::from_slice(payload).map_err(StreamError::Decode)?;
        if !errored {
            return Ok(frame);
        }

        let message = (self.handler)(&frame).unwrap_or_else(|| UNHANDLED_ERROR_MESSAGE.to_string());
        warn!(stream = %self.id, %message, "server sent error frame");
        let payload = serde_json::from_slice(payload).unwrap_or(serde_json::Value::Null);
        Err(StreamError::Server(ServerError { message, payload }))
    }

    /// Release the underlying source. Later reads fail with
    /// [`StreamError::Closed`]; closing twice is a no-op.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            debug!(stream = %self.id, "event stream closed");
        }
    }
}

impl<T: DeserializeOwned + Send + 'static> EventStream<T> {
    /// Switch to push mode. A background task drives the decoder and the
    /// source is released when the task ends or the returned stream drops.
    pub fn into_stream(self) -> FrameStream<T> {
        FrameStream::spawn(self)
    }
}

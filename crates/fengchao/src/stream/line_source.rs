//! Bounded line reading over an async byte source.
//!
//! Lines longer than the buffer capacity are handed out in fragments marked
//! as continuations; the decoder stitches them back together.

use std::io;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::io::StreamReader;

/// Default line buffer size in bytes.
pub const DEFAULT_LINE_CAPACITY: usize = 4096;

const MIN_LINE_CAPACITY: usize = 16;

/// One unit of line input, with the terminator already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub bytes: Vec<u8>,
    /// The line did not fit in the buffer and more bytes of it follow.
    pub continuation: bool,
}

impl RawLine {
    pub fn complete(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            continuation: false,
        }
    }

    pub fn fragment(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            continuation: true,
        }
    }
}

/// Source of lines for the decoder.
///
/// Returns `Ok(None)` once the peer closed the body. Dropping the source
/// releases the underlying connection.
#[async_trait]
pub trait LineSource: Send {
    async fn read_line(&mut self) -> io::Result<Option<RawLine>>;
}

/// [`LineSource`] over any `AsyncRead`, with a fixed line capacity.
pub struct BufferedLineSource<R> {
    reader: BufReader<R>,
    capacity: usize,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> BufferedLineSource<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_LINE_CAPACITY, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        let capacity = capacity.max(MIN_LINE_CAPACITY);
        Self {
            reader: BufReader::with_capacity(capacity, inner),
            capacity,
            pending: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> LineSource for BufferedLineSource<R> {
    async fn read_line(&mut self) -> io::Result<Option<RawLine>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                // Peer closed; an unterminated tail is still a line.
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(RawLine::complete(std::mem::take(&mut self.pending))));
            }

            let room = self.capacity - self.pending.len();
            if let Some(pos) = available.iter().position(|&b| b == b'\n') {
                if pos <= room {
                    self.pending.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    let mut line = std::mem::take(&mut self.pending);
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    return Ok(Some(RawLine::complete(line)));
                }
            }

            let take = available.len().min(room);
            self.pending.extend_from_slice(&available[..take]);
            self.reader.consume(take);
            if self.pending.len() >= self.capacity {
                return Ok(Some(RawLine::fragment(std::mem::take(&mut self.pending))));
            }
        }
    }
}

/// Bridge a streaming HTTP body into an `AsyncRead`.
///
/// Body timeouts surface as `io::ErrorKind::TimedOut` so the decoder can
/// report them as deadline expiry.
pub fn body_reader(response: reqwest::Response) -> impl AsyncRead + Send + Unpin {
    let byte_stream = response.bytes_stream().map(|result| {
        result.map_err(|e| {
            if e.is_timeout() {
                io::Error::new(io::ErrorKind::TimedOut, e)
            } else {
                io::Error::other(e)
            }
        })
    });
    StreamReader::new(byte_stream)
}

/// Line source reading a streaming HTTP response body.
pub fn response_lines(
    response: reqwest::Response,
    capacity: usize,
) -> BufferedLineSource<impl AsyncRead + Send + Unpin> {
    BufferedLineSource::with_capacity(capacity, body_reader(response))
}

//! Push-mode adapter: exposes an [`EventStream`] as a `futures` stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::decoder::EventStream;
use super::error::StreamError;

/// Frames in arrival order. An error is always the last item.
///
/// Dropping the stream early stops the worker and releases the source.
pub struct FrameStream<T> {
    rx: mpsc::Receiver<Result<T, StreamError>>,
    worker: JoinHandle<()>,
}

impl<T: DeserializeOwned + Send + 'static> FrameStream<T> {
    pub(crate) fn spawn(mut decoder: EventStream<T>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let worker = tokio::spawn(async move {
            loop {
                let item = match decoder.next().await {
                    Ok(Some(frame)) => Ok(frame),
                    Ok(None) => break,
                    Err(err) => Err(err),
                };
                let last = item.is_err();
                if tx.send(item).await.is_err() {
                    debug!(stream = %decoder.id(), "frame consumer went away");
                    break;
                }
                if last {
                    break;
                }
            }
            decoder.close();
        });
        Self { rx, worker }
    }
}

impl<T> Stream for FrameStream<T> {
    type Item = Result<T, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> Drop for FrameStream<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

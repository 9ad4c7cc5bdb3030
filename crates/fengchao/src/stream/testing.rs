//! Scripted line sources for decoder tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::line_source::{LineSource, RawLine};

pub(crate) enum Scripted {
    Line(RawLine),
    Fail(io::ErrorKind),
    Stall(Duration),
}

/// Replays a fixed script, then reports EOF forever. Counts how many times
/// it was released.
pub(crate) struct ScriptedSource {
    script: VecDeque<Scripted>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub(crate) fn new(script: Vec<Scripted>) -> (Self, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let source = Self {
            script: script.into(),
            closes: Arc::clone(&closes),
        };
        (source, closes)
    }

    pub(crate) fn lines(lines: &[&str]) -> (Self, Arc<AtomicUsize>) {
        Self::new(
            lines
                .iter()
                .map(|l| Scripted::Line(RawLine::complete(l.as_bytes().to_vec())))
                .collect(),
        )
    }
}

#[async_trait]
impl LineSource for ScriptedSource {
    async fn read_line(&mut self) -> io::Result<Option<RawLine>> {
        match self.script.pop_front() {
            Some(Scripted::Line(line)) => Ok(Some(line)),
            Some(Scripted::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Some(Scripted::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl Drop for ScriptedSource {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Wait (bounded) until the source has been released at least once.
pub(crate) async fn wait_for_close(closes: &AtomicUsize) {
    for _ in 0..200 {
        if closes.load(Ordering::SeqCst) > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

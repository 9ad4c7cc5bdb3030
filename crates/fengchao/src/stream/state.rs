//! Per-frame decoder state machine.
//!
//! Pure: feeds on [`RawLine`]s and reports what the caller should do next.
//! Flags are scoped to a single frame and reset whenever a frame is emitted
//! or a violation is reported.

use super::classifier::{classify, LineKind};
use super::error::StreamError;
use super::line_source::RawLine;

/// Outcome of feeding one line (or end of input) to the state machine.
#[derive(Debug)]
pub enum Step {
    /// Nothing to report yet; read the next line.
    Continue,
    /// A `data: ` payload is ready. `errored` means it followed `event: error`.
    Frame { payload: Vec<u8>, errored: bool },
    /// The input broke the framing rules.
    Violation(StreamError),
    /// Input is exhausted and nothing is owed to the caller.
    End,
}

#[derive(Debug, Default)]
pub struct DecoderState {
    ending: bool,
    errored: bool,
    carry: Vec<u8>,
}

impl DecoderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ending(&self) -> bool {
        self.ending
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    pub fn carry_len(&self) -> usize {
        self.carry.len()
    }

    pub fn step(&mut self, line: RawLine) -> Step {
        if line.continuation {
            self.carry.extend_from_slice(&line.bytes);
            return Step::Continue;
        }

        let line = if self.carry.is_empty() {
            line.bytes
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.extend_from_slice(&line.bytes);
            joined
        };

        match classify(&line) {
            LineKind::Start | LineKind::Add => Step::Continue,
            LineKind::Finish => {
                self.ending = true;
                Step::Continue
            }
            LineKind::Error => {
                self.errored = true;
                Step::Continue
            }
            LineKind::Data(payload) => {
                let errored = self.errored;
                self.reset_flags();
                Step::Frame {
                    payload: payload.to_vec(),
                    errored,
                }
            }
            LineKind::Other => {
                if self.errored {
                    self.reset_flags();
                    Step::Violation(StreamError::protocol("error", &line))
                } else if self.ending {
                    self.reset_flags();
                    Step::Violation(StreamError::protocol("finish", &line))
                } else {
                    Step::Continue
                }
            }
        }
    }

    /// Handle end of input: flush any carried fragment, then check that no
    /// error frame is still owed.
    pub fn end_of_stream(&mut self) -> Step {
        if !self.carry.is_empty() {
            let tail = std::mem::take(&mut self.carry);
            let step = self.step(RawLine::complete(tail));
            if !matches!(step, Step::Continue) {
                return step;
            }
        }
        if self.errored {
            self.reset_flags();
            return Step::Violation(StreamError::UnexpectedEof { event: "error" });
        }
        self.ending = false;
        Step::End
    }

    fn reset_flags(&mut self) {
        self.ending = false;
        self.errored = false;
    }
}

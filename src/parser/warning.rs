use std::fmt;

use serde::Serialize;

/// Non-fatal signal raised by one of the pipeline stages.
///
/// `index` always refers to the track block's position on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    DroppedTrack { index: usize },
    MissingTimestamp { index: usize },
    MalformedTimestamp { index: usize, text: String },
    Estimated { index: usize, start_ms: u64 },
    SkippedTrack { index: usize },
    OrderCorrected { index: usize, from: u64, to: u64 },
    DurationIgnored { duration_ms: u64, last_start_ms: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DroppedTrack { index } => {
                write!(f, "track #{} has no title, dropped", index + 1)
            }
            Warning::MissingTimestamp { index } => {
                write!(f, "track #{} has no timestamp", index + 1)
            }
            Warning::MalformedTimestamp { index, text } => {
                write!(f, "track #{} has unreadable timestamp {:?}", index + 1, text)
            }
            Warning::Estimated { index, start_ms } => {
                write!(f, "track #{} start estimated at {}ms", index + 1, start_ms)
            }
            Warning::SkippedTrack { index } => {
                write!(f, "track #{} skipped (no usable timestamp)", index + 1)
            }
            Warning::OrderCorrected { index, from, to } => write!(
                f,
                "track #{} starts at {}ms, not after the previous track; moved to {}ms",
                index + 1,
                from,
                to
            ),
            Warning::DurationIgnored { duration_ms, last_start_ms } => write!(
                f,
                "duration {}ms is not past the last chapter start ({}ms), END omitted",
                duration_ms, last_start_ms
            ),
        }
    }
}

/// A stage result together with the warnings accumulated so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Outcome { value, warnings }
    }

    /// Feed the value into the next stage, carrying the warnings along.
    pub fn and_then<U, E>(
        self,
        f: impl FnOnce(T) -> Result<Outcome<U>, E>,
    ) -> Result<Outcome<U>, E> {
        let mut warnings = self.warnings;
        let next = f(self.value)?;
        warnings.extend(next.warnings);
        Ok(Outcome {
            value: next.value,
            warnings,
        })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

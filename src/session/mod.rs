pub mod engine;
pub mod metrics;
pub mod result;
pub mod timer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::{InputOutcome, SessionEngine, SessionState};
pub use result::TestResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("test duration must be at least one second")]
    ZeroDuration,
}

/// Receives each completed result exactly once.
pub trait ResultSink {
    fn submit(&mut self, result: TestResult);
}

/// Configured length of a test in whole seconds. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TestDuration(u32);

impl TestDuration {
    pub const PRESETS: [u32; 4] = [30, 60, 120, 180];

    pub fn new(secs: u32) -> Result<Self, SessionError> {
        if secs == 0 {
            return Err(SessionError::ZeroDuration);
        }
        Ok(Self(secs))
    }

    pub fn secs(self) -> u32 {
        self.0
    }

    /// Next preset after this duration, wrapping. Non-preset values snap to the
    /// first preset above them.
    pub fn next_preset(self) -> Self {
        let next = Self::PRESETS
            .iter()
            .copied()
            .find(|&p| p > self.0)
            .unwrap_or(Self::PRESETS[0]);
        Self(next)
    }

    pub fn prev_preset(self) -> Self {
        let prev = Self::PRESETS
            .iter()
            .rev()
            .copied()
            .find(|&p| p < self.0)
            .unwrap_or(Self::PRESETS[Self::PRESETS.len() - 1]);
        Self(prev)
    }

    pub fn label(self) -> String {
        if self.0 % 60 == 0 {
            format!("{}m", self.0 / 60)
        } else if self.0 > 60 {
            format!("{}m{}s", self.0 / 60, self.0 % 60)
        } else {
            format!("{}s", self.0)
        }
    }
}

impl Default for TestDuration {
    fn default() -> Self {
        Self(60)
    }
}

impl TryFrom<u32> for TestDuration {
    type Error = SessionError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}

impl From<TestDuration> for u32 {
    fn from(duration: TestDuration) -> Self {
        duration.0
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generator::Difficulty;
use crate::session::metrics;

/// Outcome of one completed test. Built once when the session completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub total_keystrokes: usize,
    pub correct_keystrokes: usize,
    /// Seconds actually elapsed, not the configured duration.
    pub duration_secs: u32,
    pub difficulty: Difficulty,
    pub completed_at: DateTime<Utc>,
}

impl TestResult {
    pub fn from_counts(
        total_keystrokes: usize,
        correct_keystrokes: usize,
        configured_secs: u32,
        remaining_secs: u32,
        difficulty: Difficulty,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let elapsed = metrics::elapsed_minutes(configured_secs, remaining_secs);
        Self {
            wpm: metrics::wpm(correct_keystrokes, elapsed),
            accuracy: metrics::accuracy(correct_keystrokes, total_keystrokes),
            total_keystrokes,
            correct_keystrokes,
            duration_secs: configured_secs.saturating_sub(remaining_secs),
            difficulty,
            completed_at,
        }
    }

    pub fn cpm(&self) -> u32 {
        self.wpm * metrics::CHARS_PER_WORD as u32
    }

    pub fn error_rate(&self) -> u32 {
        100 - self.accuracy.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_full_minute() {
        let result = TestResult::from_counts(110, 100, 60, 0, Difficulty::Easy, Utc::now());
        assert_eq!(result.wpm, 20);
        assert_eq!(result.accuracy, 91);
        assert_eq!(result.duration_secs, 60);
        assert_eq!(result.cpm(), 100);
        assert_eq!(result.error_rate(), 9);
    }

    #[test]
    fn test_early_finish_records_elapsed_time() {
        let result = TestResult::from_counts(50, 50, 120, 90, Difficulty::Hard, Utc::now());
        assert_eq!(result.duration_secs, 30);
        assert_eq!(result.wpm, 20);
        assert_eq!(result.accuracy, 100);
    }

    #[test]
    fn test_empty_result() {
        let result = TestResult::from_counts(0, 0, 30, 0, Difficulty::Medium, Utc::now());
        assert_eq!(result.wpm, 0);
        assert_eq!(result.accuracy, 0);
        assert_eq!(result.error_rate(), 100);
    }

    #[test]
    fn test_json_field_names() {
        let result = TestResult::from_counts(10, 10, 60, 30, Difficulty::Easy, Utc::now());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["total_keystrokes"], 10);
        assert!(json.get("completed_at").is_some());
    }
}

/// Characters per word for WPM purposes.
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveStats {
    pub wpm: u32,
    pub accuracy: u32,
}

impl LiveStats {
    pub fn compute(correct: usize, total: usize, configured_secs: u32, remaining_secs: u32) -> Self {
        Self {
            wpm: wpm(correct, elapsed_minutes(configured_secs, remaining_secs)),
            accuracy: accuracy(correct, total),
        }
    }
}

pub fn elapsed_minutes(configured_secs: u32, remaining_secs: u32) -> f64 {
    configured_secs.saturating_sub(remaining_secs) as f64 / 60.0
}

pub fn wpm(correct: usize, elapsed_minutes: f64) -> u32 {
    if elapsed_minutes <= 0.0 {
        return 0;
    }
    (correct as f64 / CHARS_PER_WORD / elapsed_minutes).round() as u32
}

/// Percentage of keystrokes that were correct, in [0, 100]. Zero keystrokes
/// reads as 0.
pub fn accuracy(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct.min(total) as f64 / total as f64 * 100.0).round() as u32
}

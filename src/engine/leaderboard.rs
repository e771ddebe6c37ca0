use crate::session::TestResult;
use crate::store::schema::ResultRecord;

/// Highest WPM first, accuracy breaking ties. Equal rows keep insertion order.
pub fn top_results(records: &[ResultRecord], limit: usize) -> Vec<&ResultRecord> {
    let mut ranked: Vec<&ResultRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.result
            .wpm
            .cmp(&a.result.wpm)
            .then(b.result.accuracy.cmp(&a.result.accuracy))
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistorySummary {
    pub total_tests: usize,
    pub avg_wpm: u32,
    pub avg_accuracy: u32,
    pub best_wpm: u32,
    pub best_accuracy: u32,
}

impl HistorySummary {
    pub fn from_records(records: &[ResultRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        let sum_wpm: f64 = records.iter().map(|r| r.result.wpm as f64).sum();
        let sum_acc: f64 = records.iter().map(|r| r.result.accuracy as f64).sum();

        Some(Self {
            total_tests: records.len(),
            avg_wpm: (sum_wpm / n).round() as u32,
            avg_accuracy: (sum_acc / n).round() as u32,
            best_wpm: records.iter().map(|r| r.result.wpm).max().unwrap_or(0),
            best_accuracy: records.iter().map(|r| r.result.accuracy).max().unwrap_or(0),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersonalBest {
    pub wpm: bool,
    pub accuracy: bool,
}

impl PersonalBest {
    /// Flags for `result` against every stored record. The history is
    /// expected to contain `result` already, so a tie counts as a best.
    pub fn check(result: &TestResult, records: &[ResultRecord]) -> Self {
        let best_wpm = records.iter().map(|r| r.result.wpm).max().unwrap_or(0);
        let best_accuracy = records.iter().map(|r| r.result.accuracy).max().unwrap_or(0);
        Self {
            wpm: result.wpm >= best_wpm,
            accuracy: result.accuracy >= best_accuracy,
        }
    }
}

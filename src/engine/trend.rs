use crate::generator::Difficulty;
use crate::store::schema::ResultRecord;

pub const RECENT_WINDOW: usize = 10;

/// Chart points for the most recent results, x counting from 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrendSeries {
    pub wpm: Vec<(f64, f64)>,
    pub accuracy: Vec<(f64, f64)>,
}

impl TrendSeries {
    pub fn recent(records: &[ResultRecord], window: usize) -> Self {
        let start = records.len().saturating_sub(window);
        let recent = &records[start..];

        let mut series = Self::default();
        for (i, record) in recent.iter().enumerate() {
            let x = (i + 1) as f64;
            series.wpm.push((x, record.result.wpm as f64));
            series.accuracy.push((x, record.result.accuracy as f64));
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.wpm.is_empty()
    }

    pub fn max_wpm(&self) -> f64 {
        self.wpm.iter().map(|&(_, y)| y).fold(0.0, f64::max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyStat {
    pub difficulty: Difficulty,
    pub tests: usize,
    pub avg_wpm: u32,
}

/// Average WPM per difficulty, in Easy/Medium/Hard order. Difficulties with
/// no results are left out.
pub fn difficulty_breakdown(records: &[ResultRecord]) -> Vec<DifficultyStat> {
    Difficulty::ALL
        .iter()
        .filter_map(|&difficulty| {
            let wpms: Vec<u32> = records
                .iter()
                .filter(|r| r.result.difficulty == difficulty)
                .map(|r| r.result.wpm)
                .collect();
            if wpms.is_empty() {
                return None;
            }
            let sum: u32 = wpms.iter().sum();
            Some(DifficultyStat {
                difficulty,
                tests: wpms.len(),
                avg_wpm: (sum as f64 / wpms.len() as f64).round() as u32,
            })
        })
        .collect()
}

use crate::session::TestResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformanceGrade {
    Excellent,
    Good,
    Average,
    NeedsPractice,
}

impl PerformanceGrade {
    pub fn for_result(result: &TestResult) -> Self {
        Self::from_scores(result.wpm, result.accuracy)
    }

    pub fn from_scores(wpm: u32, accuracy: u32) -> Self {
        if wpm >= 60 && accuracy >= 95 {
            PerformanceGrade::Excellent
        } else if wpm >= 40 && accuracy >= 90 {
            PerformanceGrade::Good
        } else if wpm >= 25 && accuracy >= 80 {
            PerformanceGrade::Average
        } else {
            PerformanceGrade::NeedsPractice
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceGrade::Excellent => "Excellent",
            PerformanceGrade::Good => "Good",
            PerformanceGrade::Average => "Average",
            PerformanceGrade::NeedsPractice => "Needs Practice",
        }
    }
}

pub fn tips(result: &TestResult) -> Vec<&'static str> {
    let mut tips = Vec::new();
    if result.accuracy < 90 {
        tips.push("Focus on accuracy over speed. Slow down and type carefully.");
    }
    if result.wpm < 40 {
        tips.push("Practice proper finger placement on the home row keys.");
    }
    if PerformanceGrade::for_result(result) == PerformanceGrade::Excellent {
        tips.push("Great job! Try a harder difficulty level to keep improving.");
    }
    tips.push("Take regular breaks to avoid fatigue and keep your accuracy up.");
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Difficulty;
    use chrono::Utc;

    fn result(wpm: u32, accuracy: u32) -> TestResult {
        let mut r = TestResult::from_counts(0, 0, 60, 0, Difficulty::Medium, Utc::now());
        r.wpm = wpm;
        r.accuracy = accuracy;
        r
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(PerformanceGrade::from_scores(60, 95), PerformanceGrade::Excellent);
        assert_eq!(PerformanceGrade::from_scores(59, 99), PerformanceGrade::Good);
        assert_eq!(PerformanceGrade::from_scores(80, 94), PerformanceGrade::Good);
        assert_eq!(PerformanceGrade::from_scores(40, 89), PerformanceGrade::Average);
        assert_eq!(PerformanceGrade::from_scores(25, 80), PerformanceGrade::Average);
        assert_eq!(PerformanceGrade::from_scores(24, 100), PerformanceGrade::NeedsPractice);
        assert_eq!(PerformanceGrade::from_scores(100, 79), PerformanceGrade::NeedsPractice);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PerformanceGrade::NeedsPractice.label(), "Needs Practice");
        assert_eq!(PerformanceGrade::Excellent.label(), "Excellent");
    }

    #[test]
    fn test_slow_inaccurate_tips() {
        let tips = tips(&result(20, 70));
        assert_eq!(tips.len(), 3);
        assert!(tips[0].contains("accuracy"));
        assert!(tips[1].contains("finger placement"));
        assert!(tips[2].contains("breaks"));
    }

    #[test]
    fn test_excellent_suggests_harder_level() {
        let tips = tips(&result(75, 98));
        assert_eq!(tips.len(), 2);
        assert!(tips[0].contains("harder difficulty"));
    }

    #[test]
    fn test_breaks_always_suggested() {
        for (wpm, acc) in [(10, 50), (45, 92), (90, 100)] {
            assert!(tips(&result(wpm, acc)).iter().any(|t| t.contains("breaks")));
        }
    }
}

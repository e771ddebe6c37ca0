pub mod chart;
pub mod dashboard;
pub mod leaderboard;
pub mod live_stats;
pub mod progress_bar;
pub mod typing_area;

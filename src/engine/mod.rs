pub mod grade;
pub mod leaderboard;
pub mod trend;

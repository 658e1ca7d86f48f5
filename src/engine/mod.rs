pub mod checker;
pub mod leaderboard;
pub mod scoring;
pub mod stats;
pub mod streak;

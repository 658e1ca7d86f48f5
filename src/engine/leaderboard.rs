use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::generator::problem::Difficulty;
use crate::session::result::SessionResult;

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub accuracy: f64,
    pub average_time: f64,
    pub correct: usize,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

/// Best complete sessions at one difficulty: accuracy first, then speed,
/// then the more recent run.
pub fn leaderboard(
    history: &[SessionResult],
    difficulty: Difficulty,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut runs: Vec<&SessionResult> = history
        .iter()
        .filter(|r| r.difficulty == difficulty && !r.partial && r.total_problems > 0)
        .collect();

    runs.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.average_time_secs
                    .partial_cmp(&b.average_time_secs)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });

    runs.into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| LeaderboardEntry {
            rank: i + 1,
            accuracy: r.accuracy,
            average_time: r.average_time_secs,
            correct: r.correct_answers,
            total: r.total_problems,
            timestamp: r.timestamp,
        })
        .collect()
}

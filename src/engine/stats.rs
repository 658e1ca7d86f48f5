use crate::engine::{scoring, streak};
use crate::generator::problem::Difficulty;
use crate::session::result::SessionResult;
use crate::store::schema::ProfileData;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DifficultyStats {
    pub sessions: usize,
    pub problems: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub average_time: f64,
}

/// Aggregates shown on the profile tab.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileStats {
    pub sessions: usize,
    pub total_problems: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub average_time: f64,
    pub best_time: Option<f64>,
    pub by_difficulty: Vec<(Difficulty, DifficultyStats)>,
}

impl ProfileStats {
    pub fn from_history(history: &[SessionResult]) -> Self {
        let (total_problems, correct_answers, avg) = totals(history.iter());
        let best_time = history
            .iter()
            .filter_map(|r| r.best_time_secs)
            .reduce(f64::min);

        let by_difficulty = Difficulty::ALL
            .into_iter()
            .map(|d| {
                let sessions: Vec<&SessionResult> =
                    history.iter().filter(|r| r.difficulty == d).collect();
                let (problems, correct, average_time) = totals(sessions.iter().copied());
                let stats = DifficultyStats {
                    sessions: sessions.len(),
                    problems,
                    correct,
                    accuracy: percent(correct, problems),
                    average_time,
                };
                (d, stats)
            })
            .collect();

        Self {
            sessions: history.len(),
            total_problems,
            correct_answers,
            accuracy: percent(correct_answers, total_problems),
            average_time: avg,
            best_time,
            by_difficulty,
        }
    }
}

/// Replay score, session count and streak from history, oldest first.
pub fn profile_from_history(history: &[SessionResult]) -> ProfileData {
    let mut profile = ProfileData::default();
    for result in history {
        profile.total_score += scoring::compute_score(result);
        profile.total_sessions += 1;
        streak::record_practice(&mut profile, result.timestamp.date_naive());
    }
    profile
}

/// Newest first.
pub fn recent_sessions(history: &[SessionResult], limit: usize) -> Vec<&SessionResult> {
    history.iter().rev().take(limit).collect()
}

/// Problem and solve counts, plus mean answer time weighted by solves.
fn totals<'a>(sessions: impl Iterator<Item = &'a SessionResult>) -> (usize, usize, f64) {
    let mut problems = 0;
    let mut correct = 0;
    let mut weighted_time = 0.0;
    for r in sessions {
        problems += r.total_problems;
        correct += r.correct_answers;
        weighted_time += r.average_time_secs * r.correct_answers as f64;
    }
    let avg = if correct > 0 {
        weighted_time / correct as f64
    } else {
        0.0
    };
    (problems, correct, avg)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(difficulty: Difficulty, total: usize, correct: usize, avg: f64) -> SessionResult {
        SessionResult {
            difficulty,
            operation_mode: Default::default(),
            total_problems: total,
            correct_answers: correct,
            skipped: total - correct,
            total_attempts: correct as u32,
            total_time_secs: avg * total as f64,
            average_time_secs: avg,
            best_time_secs: (correct > 0).then_some(avg / 2.0),
            accuracy: correct as f64 / total as f64 * 100.0,
            score: 0.0,
            timestamp: Utc::now(),
            problems: Vec::new(),
            partial: false,
        }
    }

    #[test]
    fn test_profile_from_history() {
        let mut history = vec![
            session(Difficulty::Easy, 5, 5, 2.0),
            session(Difficulty::Hard, 5, 3, 6.0),
            session(Difficulty::Medium, 5, 4, 3.0),
        ];
        let today = Utc::now();
        history[0].timestamp = today - chrono::Duration::days(2);
        history[1].timestamp = today - chrono::Duration::days(1);
        history[2].timestamp = today;

        let profile = profile_from_history(&history);
        assert_eq!(profile.total_sessions, 3);
        assert_eq!(profile.streak_days, 3);
        assert_eq!(profile.best_streak, 3);
        let expected: f64 = history.iter().map(scoring::compute_score).sum();
        assert!((profile.total_score - expected).abs() < 1e-9);

        let empty = profile_from_history(&[]);
        assert_eq!(empty.total_sessions, 0);
        assert_eq!(empty.streak_days, 0);
        assert!(empty.last_practice_date.is_none());
    }

    #[test]
    fn test_empty_history() {
        let stats = ProfileStats::from_history(&[]);
        assert_eq!(stats.sessions, 0);
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.best_time, None);
        assert_eq!(stats.by_difficulty.len(), 3);
    }

    #[test]
    fn test_totals_and_weighted_time() {
        let history = vec![
            session(Difficulty::Easy, 10, 8, 2.0),
            session(Difficulty::Hard, 10, 2, 7.0),
        ];
        let stats = ProfileStats::from_history(&history);
        assert_eq!(stats.total_problems, 20);
        assert_eq!(stats.correct_answers, 10);
        assert_eq!(stats.accuracy, 50.0);
        assert!((stats.average_time - 3.0).abs() < 1e-9);
        assert_eq!(stats.best_time, Some(1.0));

        let (d, hard) = &stats.by_difficulty[2];
        assert_eq!(*d, Difficulty::Hard);
        assert_eq!(hard.sessions, 1);
        assert_eq!(hard.accuracy, 20.0);
        assert_eq!(stats.by_difficulty[1].1, DifficultyStats::default());
    }

    #[test]
    fn test_recent_sessions_newest_first() {
        let history = vec![
            session(Difficulty::Easy, 5, 1, 2.0),
            session(Difficulty::Easy, 5, 2, 2.0),
            session(Difficulty::Easy, 5, 3, 2.0),
        ];
        let recent = recent_sessions(&history, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].correct_answers, 3);
        assert_eq!(recent[1].correct_answers, 2);
    }
}

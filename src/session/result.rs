use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::scoring;
use crate::generator::problem::{Difficulty, Operation, OperationMode};
use crate::session::practice::PracticeState;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub problem: String,
    pub answer: f64,
    pub difficulty: Difficulty,
    pub operation: Operation,
    pub attempts: u32,
    pub solved: bool,
    #[serde(default)]
    pub skipped: bool,
    pub time_secs: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResult {
    pub difficulty: Difficulty,
    #[serde(default)]
    pub operation_mode: OperationMode,
    pub total_problems: usize,
    pub correct_answers: usize,
    #[serde(default)]
    pub skipped: usize,
    pub total_attempts: u32,
    pub total_time_secs: f64,
    pub average_time_secs: f64,
    #[serde(default)]
    pub best_time_secs: Option<f64>,
    pub accuracy: f64,
    #[serde(default)]
    pub score: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub problems: Vec<ProblemRecord>,
    #[serde(default)]
    pub partial: bool,
}

impl SessionResult {
    /// Summarize a session. A partial result only counts the problems the
    /// user got to.
    pub fn from_practice(practice: &PracticeState, partial: bool) -> Self {
        let problems: Vec<ProblemRecord> = practice
            .problems
            .iter()
            .filter(|slot| !partial || slot.is_resolved())
            .map(|slot| ProblemRecord {
                problem: slot.problem.problem().to_string(),
                answer: slot.problem.answer(),
                difficulty: slot.problem.difficulty(),
                operation: slot.problem.operation(),
                attempts: slot.attempts,
                solved: slot.solved,
                skipped: slot.skipped,
                time_secs: slot.time_secs,
            })
            .collect();

        let total_problems = problems.len();
        let correct_answers = practice.correct_count();
        let accuracy = if total_problems > 0 {
            (correct_answers as f64 / total_problems as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        let mut result = Self {
            difficulty: practice.difficulty,
            operation_mode: practice.mode,
            total_problems,
            correct_answers,
            skipped: practice.skipped_count(),
            total_attempts: practice.attempt_count(),
            total_time_secs: practice.elapsed_secs(),
            average_time_secs: practice.average_time(),
            best_time_secs: practice.best_time(),
            accuracy,
            score: 0.0,
            timestamp: Utc::now(),
            problems,
            partial,
        };
        result.score = scoring::compute_score(&result);
        result
    }

    pub fn incorrect_attempts(&self) -> u32 {
        self.total_attempts
            .saturating_sub(self.correct_answers as u32)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::generator::arithmetic::ProblemGenerator;

    fn answer_current(practice: &mut PracticeState, now: Instant) {
        let answer = practice.current_problem().unwrap().answer();
        for ch in crate::generator::problem::format_answer(answer).chars() {
            practice.type_char(ch);
        }
        practice.submit(now);
        practice.submit(now);
    }

    #[test]
    fn test_complete_session_summary() {
        let t0 = Instant::now();
        let mut generator = ProblemGenerator::seeded(11);
        let mut practice =
            PracticeState::new(&mut generator, Difficulty::Medium, OperationMode::Mixed, 4, t0);

        answer_current(&mut practice, t0 + Duration::from_secs(2));
        // Medium answers are never negative.
        practice.type_char('-');
        practice.type_char('1');
        practice.submit(t0 + Duration::from_secs(3));
        practice.skip(t0 + Duration::from_secs(4));
        answer_current(&mut practice, t0 + Duration::from_secs(6));
        answer_current(&mut practice, t0 + Duration::from_secs(10));
        assert!(practice.is_complete());

        let result = SessionResult::from_practice(&practice, false);
        assert_eq!(result.total_problems, 4);
        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.accuracy, 75.0);
        assert_eq!(result.difficulty, Difficulty::Medium);
        assert_eq!(result.operation_mode, OperationMode::Mixed);
        assert_eq!(result.problems.len(), 4);
        assert!(result.problems[1].skipped);
        assert_eq!(result.best_time_secs, Some(2.0));
        assert!(result.score > 0.0);
        assert!(!result.partial);
    }

    #[test]
    fn test_partial_session_only_counts_reached_problems() {
        let t0 = Instant::now();
        let mut generator = ProblemGenerator::seeded(12);
        let mut practice =
            PracticeState::new(&mut generator, Difficulty::Easy, OperationMode::Addition, 10, t0);
        answer_current(&mut practice, t0 + Duration::from_secs(1));
        answer_current(&mut practice, t0 + Duration::from_secs(2));

        let result = SessionResult::from_practice(&practice, true);
        assert!(result.partial);
        assert_eq!(result.total_problems, 2);
        assert_eq!(result.accuracy, 100.0);
    }

    #[test]
    fn test_old_records_load_with_defaults() {
        let json = r#"{
            "difficulty": "hard",
            "total_problems": 5,
            "correct_answers": 4,
            "total_attempts": 6,
            "total_time_secs": 40.0,
            "average_time_secs": 7.5,
            "accuracy": 80.0,
            "timestamp": "2026-01-02T10:00:00Z"
        }"#;
        let result: SessionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.operation_mode, OperationMode::Mixed);
        assert!(result.problems.is_empty());
        assert!(!result.partial);
        assert_eq!(result.incorrect_attempts(), 2);
    }
}

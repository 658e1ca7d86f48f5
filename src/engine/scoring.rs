use crate::generator::problem::Difficulty;
use crate::session::result::SessionResult;

pub fn difficulty_weight(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 2.0,
        Difficulty::Hard => 3.0,
    }
}

/// Points for one session: weighted solves, damped by slow answers and wrong attempts.
pub fn compute_score(result: &SessionResult) -> f64 {
    let solved = result.correct_answers as f64;
    let weight = difficulty_weight(result.difficulty);
    let speed = 50.0 / (result.average_time_secs.max(1.0) + 4.0);
    let errors = result.incorrect_attempts() as f64;
    solved * weight * speed / (errors + 1.0)
}

pub fn level_from_score(total_score: f64) -> u32 {
    let level = (total_score / 100.0).sqrt() as u32;
    level.max(1)
}

pub fn score_to_next_level(total_score: f64) -> f64 {
    let current_level = level_from_score(total_score);
    let next_level_score = ((current_level + 1) as f64).powi(2) * 100.0;
    next_level_score - total_score
}

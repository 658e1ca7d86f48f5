use crate::generator::problem::Difficulty;

/// Largest distance from the rounded answer still accepted on hard problems.
pub const HARD_TOLERANCE: f64 = 0.01;

/// Hard problems may carry a rounded fractional answer, so they compare
/// within [`HARD_TOLERANCE`]. Easy and medium answers are always whole
/// numbers and must match exactly.
pub fn check_answer(user_answer: f64, correct_answer: f64, difficulty: Difficulty) -> bool {
    match difficulty {
        Difficulty::Hard => (user_answer - correct_answer).abs() < HARD_TOLERANCE,
        Difficulty::Easy | Difficulty::Medium => user_answer == correct_answer,
    }
}

/// Parse raw answer text. `None` means "no answer yet" and must not be checked.
pub fn parse_answer(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    if digits.chars().filter(|&ch| ch == '.').count() > 1
        || !digits.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

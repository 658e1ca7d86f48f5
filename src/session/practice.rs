use std::time::{Duration, Instant};

use crate::engine::checker::check_answer;
use crate::generator::ProblemSource;
use crate::generator::problem::{Difficulty, MathProblem, OperationMode};
use crate::session::input::AnswerInput;

/// How long a wrong-answer flash stays on screen before the user retries.
pub const INCORRECT_FEEDBACK: Duration = Duration::from_millis(800);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input did not parse as a number; nothing was recorded.
    Empty,
    Correct,
    Incorrect,
    /// Enter on an already-solved problem moved on to the next one.
    Advanced,
    /// Session already complete.
    Ignored,
}

/// One problem of the session and what the user did with it.
#[derive(Clone, Debug)]
pub struct ProblemSlot {
    pub problem: MathProblem,
    pub attempts: u32,
    pub solved: bool,
    pub skipped: bool,
    pub time_secs: Option<f64>,
}

impl ProblemSlot {
    fn new(problem: MathProblem) -> Self {
        Self {
            problem,
            attempts: 0,
            solved: false,
            skipped: false,
            time_secs: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.solved || self.skipped
    }
}

pub struct PracticeState {
    pub difficulty: Difficulty,
    pub mode: OperationMode,
    pub problems: Vec<ProblemSlot>,
    pub current: usize,
    pub input: AnswerInput,
    pub feedback: Option<(Feedback, Instant)>,
    pub started_at: Instant,
    pub problem_started_at: Instant,
    pub finished_at: Option<Instant>,
}

impl PracticeState {
    pub fn new<S: ProblemSource>(
        source: &mut S,
        difficulty: Difficulty,
        mode: OperationMode,
        count: usize,
        now: Instant,
    ) -> Self {
        let problems = (0..count)
            .map(|_| ProblemSlot::new(source.next_problem(difficulty, mode)))
            .collect();
        Self {
            difficulty,
            mode,
            problems,
            current: 0,
            input: AnswerInput::new(),
            feedback: None,
            started_at: now,
            problem_started_at: now,
            finished_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.problems.len()
    }

    pub fn current_problem(&self) -> Option<&MathProblem> {
        self.problems.get(self.current).map(|slot| &slot.problem)
    }

    fn awaiting_advance(&self) -> bool {
        matches!(self.feedback, Some((Feedback::Correct, _)))
    }

    /// Typing is locked while a solved problem waits to auto-advance.
    pub fn type_char(&mut self, ch: char) {
        if self.is_complete() || self.awaiting_advance() {
            return;
        }
        if matches!(self.feedback, Some((Feedback::Incorrect, _))) {
            self.feedback = None;
        }
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        if !self.awaiting_advance() {
            self.input.backspace();
        }
    }

    pub fn submit(&mut self, now: Instant) -> SubmitOutcome {
        if self.is_complete() {
            return SubmitOutcome::Ignored;
        }
        if self.awaiting_advance() {
            self.advance(now);
            return SubmitOutcome::Advanced;
        }
        let Some(value) = self.input.value() else {
            return SubmitOutcome::Empty;
        };

        let elapsed = now.duration_since(self.problem_started_at).as_secs_f64();
        let slot = &mut self.problems[self.current];
        slot.attempts += 1;

        if check_answer(value, slot.problem.answer(), slot.problem.difficulty()) {
            slot.solved = true;
            slot.time_secs = Some(elapsed);
            self.feedback = Some((Feedback::Correct, now));
            SubmitOutcome::Correct
        } else {
            self.input.clear();
            self.feedback = Some((Feedback::Incorrect, now));
            SubmitOutcome::Incorrect
        }
    }

    pub fn skip(&mut self, now: Instant) {
        if self.is_complete() {
            return;
        }
        let slot = &mut self.problems[self.current];
        if !slot.solved {
            slot.skipped = true;
            slot.time_secs = Some(now.duration_since(self.problem_started_at).as_secs_f64());
        }
        self.advance(now);
    }

    /// Expire feedback. Returns true when a solved problem auto-advanced.
    pub fn tick(&mut self, now: Instant, auto_advance: Duration) -> bool {
        match self.feedback {
            Some((Feedback::Correct, since)) if now.duration_since(since) >= auto_advance => {
                self.advance(now);
                true
            }
            Some((Feedback::Incorrect, since))
                if now.duration_since(since) >= INCORRECT_FEEDBACK =>
            {
                self.feedback = None;
                false
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: Instant) {
        self.feedback = None;
        self.input.clear();
        self.current += 1;
        if self.is_complete() {
            self.finished_at = Some(now);
        } else {
            self.problem_started_at = now;
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        match self.finished_at {
            Some(end) => end.duration_since(self.started_at).as_secs_f64(),
            None => self.started_at.elapsed().as_secs_f64(),
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.problems.iter().filter(|s| s.is_resolved()).count()
    }

    pub fn correct_count(&self) -> usize {
        self.problems.iter().filter(|s| s.solved).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.problems.iter().filter(|s| s.skipped).count()
    }

    pub fn attempt_count(&self) -> u32 {
        self.problems.iter().map(|s| s.attempts).sum()
    }

    fn solved_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.problems
            .iter()
            .filter(|s| s.solved)
            .filter_map(|s| s.time_secs)
    }

    /// Mean time over solved problems.
    pub fn average_time(&self) -> f64 {
        let (sum, n) = self
            .solved_times()
            .fold((0.0, 0usize), |(sum, n), t| (sum + t, n + 1));
        if n == 0 { 0.0 } else { sum / n as f64 }
    }

    pub fn best_time(&self) -> Option<f64> {
        self.solved_times().reduce(f64::min)
    }

    pub fn accuracy(&self) -> f64 {
        let resolved = self.resolved_count();
        if resolved == 0 {
            return 100.0;
        }
        self.correct_count() as f64 / resolved as f64 * 100.0
    }

    pub fn progress(&self) -> f64 {
        if self.problems.is_empty() {
            return 0.0;
        }
        self.resolved_count() as f64 / self.problems.len() as f64
    }
}

/// `MM:SS` for the session timer.
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

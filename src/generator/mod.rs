pub mod arithmetic;
pub mod problem;

use crate::generator::problem::{Difficulty, MathProblem, OperationMode};

pub trait ProblemSource {
    fn next_problem(&mut self, difficulty: Difficulty, mode: OperationMode) -> MathProblem;
}

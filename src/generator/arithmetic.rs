use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::generator::ProblemSource;
use crate::generator::problem::{Difficulty, MathProblem, Operation, OperationMode};

/// Inclusive operand bounds for one operand.
type Range = (u32, u32);

/// Draws arithmetic problems from the per-difficulty range table.
///
/// The random source is owned and injected, so a seeded generator replays
/// the same problem sequence.
pub struct ProblemGenerator {
    rng: SmallRng,
}

impl ProblemGenerator {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }

    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Uniform integer in `[min, max]`.
    pub fn rand_int(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..=max)
    }

    /// Uniform pick over the four operations.
    pub fn random_operation(&mut self) -> Operation {
        Operation::ALL[self.rng.gen_range(0..Operation::ALL.len())]
    }

    pub fn generate_for(&mut self, difficulty: Difficulty, mode: OperationMode) -> MathProblem {
        let operation = match mode.pinned() {
            Some(op) => op,
            None => self.random_operation(),
        };
        self.generate(difficulty, operation)
    }

    pub fn generate(&mut self, difficulty: Difficulty, operation: Operation) -> MathProblem {
        match operation {
            Operation::Addition => {
                let range = addition_range(difficulty);
                let a = self.sample(range);
                let b = self.sample(range);
                MathProblem::new(a, b, f64::from(a + b), operation, difficulty)
            }
            Operation::Subtraction => {
                let ((b_min, b_max), a_max) = subtraction_range(difficulty);
                let b = self.rand_int(b_min, b_max);
                let a = self.rand_int(b, a_max);
                MathProblem::new(a, b, f64::from(a - b), operation, difficulty)
            }
            Operation::Multiplication => {
                let range = multiplication_range(difficulty);
                let a = self.sample(range);
                let b = self.sample(range);
                MathProblem::new(a, b, f64::from(a * b), operation, difficulty)
            }
            Operation::Division => self.division(difficulty),
        }
    }

    fn division(&mut self, difficulty: Difficulty) -> MathProblem {
        let (divisor, quotient) = division_range(difficulty);
        let b = self.sample(divisor);
        let k = self.sample(quotient);
        let mut a = b * k;
        let mut answer = f64::from(k);

        // Hard division adds a remainder half the time; divisor is at least 2 there.
        if difficulty == Difficulty::Hard && self.rng.gen_bool(0.5) {
            a += self.rand_int(1, b - 1);
            answer = round_to_hundredths(f64::from(a) / f64::from(b));
        }

        MathProblem::new(a, b, answer, Operation::Division, difficulty)
    }

    fn sample(&mut self, (min, max): Range) -> u32 {
        self.rand_int(min, max)
    }
}

impl ProblemSource for ProblemGenerator {
    fn next_problem(&mut self, difficulty: Difficulty, mode: OperationMode) -> MathProblem {
        self.generate_for(difficulty, mode)
    }
}

fn addition_range(difficulty: Difficulty) -> Range {
    match difficulty {
        Difficulty::Easy => (1, 20),
        Difficulty::Medium => (10, 100),
        Difficulty::Hard => (100, 999),
    }
}

/// Subtrahend bounds plus the upper bound for the minuend, which starts at the subtrahend.
fn subtraction_range(difficulty: Difficulty) -> (Range, u32) {
    match difficulty {
        Difficulty::Easy => ((1, 10), 20),
        Difficulty::Medium => ((10, 50), 100),
        Difficulty::Hard => ((50, 500), 999),
    }
}

fn multiplication_range(difficulty: Difficulty) -> Range {
    match difficulty {
        Difficulty::Easy => (1, 10),
        Difficulty::Medium => (5, 20),
        Difficulty::Hard => (10, 50),
    }
}

/// Divisor bounds and quotient bounds; the dividend is built as their product.
fn division_range(difficulty: Difficulty) -> (Range, Range) {
    match difficulty {
        Difficulty::Easy => ((1, 10), (1, 10)),
        Difficulty::Medium => ((2, 20), (2, 20)),
        Difficulty::Hard => ((2, 30), (5, 20)),
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::checker::check_answer;
    use regex::Regex;

    const SAMPLES: usize = 500;

    fn operands(problem: &MathProblem) -> (Operation, u32, u32) {
        let re = Regex::new(r"^(\d+) (\S+) (\d+) = \?$").unwrap();
        let caps = re
            .captures(problem.problem())
            .unwrap_or_else(|| panic!("malformed problem: {}", problem.problem()));
        let op = Operation::from_symbol(&caps[2]).unwrap();
        (op, caps[1].parse().unwrap(), caps[3].parse().unwrap())
    }

    fn evaluate(op: Operation, a: u32, b: u32) -> f64 {
        let (a, b) = (f64::from(a), f64::from(b));
        match op {
            Operation::Addition => a + b,
            Operation::Subtraction => a - b,
            Operation::Multiplication => a * b,
            Operation::Division => a / b,
        }
    }

    #[test]
    fn test_answer_matches_embedded_operands_for_all_pairs() {
        let mut generator = ProblemGenerator::seeded(7);
        for difficulty in Difficulty::ALL {
            for operation in Operation::ALL {
                for _ in 0..SAMPLES {
                    let p = generator.generate(difficulty, operation);
                    let (op, a, b) = operands(&p);
                    assert_eq!(op, operation);
                    assert_eq!(p.operation(), operation);
                    assert_eq!(p.difficulty(), difficulty);

                    let expected = evaluate(op, a, b);
                    let exact = operation != Operation::Division || a % b == 0;
                    if exact {
                        assert_eq!(p.answer(), expected, "{}", p.problem());
                    } else {
                        assert_eq!(difficulty, Difficulty::Hard, "{}", p.problem());
                        assert!((p.answer() - expected).abs() < 0.01, "{}", p.problem());
                    }
                }
            }
        }
    }

    #[test]
    fn test_easy_addition_operand_ranges() {
        let mut generator = ProblemGenerator::seeded(1);
        for _ in 0..SAMPLES {
            let p = generator.generate(Difficulty::Easy, Operation::Addition);
            let (_, a, b) = operands(&p);
            assert!((1..=20).contains(&a));
            assert!((1..=20).contains(&b));
            assert_eq!(p.answer(), f64::from(a + b));
        }
    }

    #[test]
    fn test_addition_and_multiplication_ranges_per_difficulty() {
        let mut generator = ProblemGenerator::seeded(2);
        let cases = [
            (Operation::Addition, Difficulty::Medium, 10..=100),
            (Operation::Addition, Difficulty::Hard, 100..=999),
            (Operation::Multiplication, Difficulty::Easy, 1..=10),
            (Operation::Multiplication, Difficulty::Medium, 5..=20),
            (Operation::Multiplication, Difficulty::Hard, 10..=50),
        ];
        for (op, difficulty, range) in cases {
            for _ in 0..SAMPLES {
                let (_, a, b) = operands(&generator.generate(difficulty, op));
                assert!(range.contains(&a), "{op:?} {difficulty:?}: {a}");
                assert!(range.contains(&b), "{op:?} {difficulty:?}: {b}");
            }
        }
    }

    #[test]
    fn test_subtraction_never_negative() {
        let mut generator = ProblemGenerator::seeded(3);
        let bounds = [
            (Difficulty::Easy, 1..=10, 20),
            (Difficulty::Medium, 10..=50, 100),
            (Difficulty::Hard, 50..=500, 999),
        ];
        for (difficulty, b_range, a_max) in bounds {
            for _ in 0..SAMPLES {
                let p = generator.generate(difficulty, Operation::Subtraction);
                let (_, a, b) = operands(&p);
                assert!(b_range.contains(&b));
                assert!(a >= b && a <= a_max, "{}", p.problem());
                assert!(p.answer() >= 0.0);
            }
        }
    }

    #[test]
    fn test_easy_and_medium_division_is_exact() {
        let mut generator = ProblemGenerator::seeded(4);
        for _ in 0..SAMPLES {
            let p = generator.generate(Difficulty::Easy, Operation::Division);
            let (_, a, b) = operands(&p);
            assert!((1..=10).contains(&b));
            assert_eq!(a % b, 0);
            assert_eq!(p.answer().fract(), 0.0);
            assert!((1.0..=10.0).contains(&p.answer()));

            let p = generator.generate(Difficulty::Medium, Operation::Division);
            let (_, a, b) = operands(&p);
            assert!((2..=20).contains(&b));
            assert_eq!(a % b, 0);
            assert_eq!(p.answer().fract(), 0.0);
        }
    }

    #[test]
    fn test_hard_division_remainder_rule() {
        let mut generator = ProblemGenerator::seeded(5);
        let mut with_remainder = 0;
        let mut exact = 0;
        for _ in 0..SAMPLES {
            let p = generator.generate(Difficulty::Hard, Operation::Division);
            let (_, a, b) = operands(&p);
            assert!((2..=30).contains(&b));
            let k = a / b;
            assert!((5..=20).contains(&k), "{}", p.problem());

            let cents = p.answer() * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6, "more than 2 decimals: {}", p.answer());
            assert!(check_answer(f64::from(a) / f64::from(b), p.answer(), Difficulty::Hard));

            if a % b == 0 {
                exact += 1;
                assert_eq!(p.answer(), f64::from(k));
            } else {
                with_remainder += 1;
                assert!(a % b < b);
            }
        }
        // Both branches are taken with a fair coin.
        assert!(with_remainder > SAMPLES / 4, "remainders: {with_remainder}");
        assert!(exact > SAMPLES / 4, "exact: {exact}");
    }

    #[test]
    fn test_rand_int_is_inclusive() {
        let mut generator = ProblemGenerator::seeded(6);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..1000 {
            let n = generator.rand_int(3, 5);
            assert!((3..=5).contains(&n));
            seen_min |= n == 3;
            seen_max |= n == 5;
        }
        assert!(seen_min && seen_max);
        assert_eq!(generator.rand_int(9, 9), 9);
    }

    #[test]
    fn test_random_operation_covers_all() {
        let mut generator = ProblemGenerator::seeded(8);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            let op = generator.random_operation();
            let idx = Operation::ALL.iter().position(|&o| o == op).unwrap();
            counts[idx] += 1;
        }
        for count in counts {
            assert!(count > 800, "skewed pick: {counts:?}");
        }
    }

    #[test]
    fn test_pinned_mode_uses_that_operation() {
        let mut generator = ProblemGenerator::seeded(9);
        for _ in 0..50 {
            let p = generator.generate_for(Difficulty::Medium, OperationMode::Multiplication);
            assert_eq!(p.operation(), Operation::Multiplication);
        }
    }

    #[test]
    fn test_same_seed_replays_sequence() {
        let mut first = ProblemGenerator::seeded(42);
        let mut second = ProblemGenerator::seeded(42);
        for _ in 0..20 {
            assert_eq!(
                first.generate_for(Difficulty::Hard, OperationMode::Mixed),
                second.generate_for(Difficulty::Hard, OperationMode::Mixed)
            );
        }
    }

    #[test]
    fn test_repeated_calls_sample_independently() {
        let mut generator = ProblemGenerator::seeded(10);
        let problems: Vec<String> = (0..30)
            .map(|_| generator.generate(Difficulty::Hard, Operation::Addition).problem().to_string())
            .collect();
        let distinct: std::collections::HashSet<&String> = problems.iter().collect();
        assert!(distinct.len() > 20);
    }
}

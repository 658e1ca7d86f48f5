use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    /// Display glyph. Subtraction uses U+2212, not an ASCII hyphen.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "\u{2212}",
            Operation::Multiplication => "\u{00d7}",
            Operation::Division => "\u{00f7}",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

/// Which operation a practice session draws from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    #[default]
    Mixed,
}

impl OperationMode {
    pub const ALL: [OperationMode; 5] = [
        OperationMode::Addition,
        OperationMode::Subtraction,
        OperationMode::Multiplication,
        OperationMode::Division,
        OperationMode::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self.pinned() {
            Some(op) => op.as_str(),
            None => "mixed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationMode::Addition => "Addition",
            OperationMode::Subtraction => "Subtraction",
            OperationMode::Multiplication => "Multiplication",
            OperationMode::Division => "Division",
            OperationMode::Mixed => "Mixed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// The fixed operation, or `None` for mixed sessions.
    pub fn pinned(self) -> Option<Operation> {
        match self {
            OperationMode::Addition => Some(Operation::Addition),
            OperationMode::Subtraction => Some(Operation::Subtraction),
            OperationMode::Multiplication => Some(Operation::Multiplication),
            OperationMode::Division => Some(Operation::Division),
            OperationMode::Mixed => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl From<Operation> for OperationMode {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Addition => OperationMode::Addition,
            Operation::Subtraction => OperationMode::Subtraction,
            Operation::Multiplication => OperationMode::Multiplication,
            Operation::Division => OperationMode::Division,
        }
    }
}

/// A generated problem paired with its correct answer. Never mutated once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MathProblem {
    problem: String,
    answer: f64,
    operation: Operation,
    difficulty: Difficulty,
}

impl MathProblem {
    pub fn new(a: u32, b: u32, answer: f64, operation: Operation, difficulty: Difficulty) -> Self {
        Self {
            problem: format!("{a} {} {b} = ?", operation.symbol()),
            answer,
            operation,
            difficulty,
        }
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn answer(&self) -> f64 {
        self.answer
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl fmt::Display for MathProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.problem)
    }
}

/// Integers print bare; fractional answers print with at most two decimals.
pub fn format_answer(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

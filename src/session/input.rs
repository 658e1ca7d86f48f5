use crate::engine::checker::parse_answer;

const MAX_LEN: usize = 12;

/// Line buffer for the answer being typed.
#[derive(Clone, Debug, Default)]
pub struct AnswerInput {
    text: String,
}

impl AnswerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts digits, a single '.', and '-' only as the first character.
    /// Returns whether the character was taken.
    pub fn push(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= MAX_LEN {
            return false;
        }
        let accepted = match ch {
            '0'..='9' => true,
            '.' => !self.text.contains('.'),
            '-' => self.text.is_empty(),
            _ => false,
        };
        if accepted {
            self.text.push(ch);
        }
        accepted
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn value(&self) -> Option<f64> {
        parse_answer(&self.text)
    }
}

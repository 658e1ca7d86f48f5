use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::generator::problem::{Difficulty, Operation, format_answer};
use crate::session::practice::{Feedback, PracticeState};
use crate::ui::theme::Theme;

/// Current problem, the answer being typed, and feedback on the last submit.
pub struct ProblemCard<'a> {
    practice: &'a PracticeState,
    theme: &'a Theme,
}

impl<'a> ProblemCard<'a> {
    pub fn new(practice: &'a PracticeState, theme: &'a Theme) -> Self {
        Self { practice, theme }
    }
}

impl Widget for ProblemCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let feedback = self.practice.feedback.map(|(kind, _)| kind);

        let border = match feedback {
            Some(Feedback::Correct) => colors.success(),
            Some(Feedback::Incorrect) => colors.error(),
            None => colors.border(),
        };
        let title = format!(
            " Problem {} of {} ",
            (self.practice.current + 1).min(self.practice.problems.len()),
            self.practice.problems.len()
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(problem) = self.practice.current_problem() else {
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let badge = format!(" {} ", problem.difficulty().label());
        Paragraph::new(Line::from(Span::styled(
            badge,
            Style::default().fg(colors.bg()).bg(colors.accent()),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        Paragraph::new(Line::from(Span::styled(
            problem.problem(),
            Style::default()
                .fg(colors.problem())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[3], buf);

        let typed = self.practice.input.as_str();
        let field = if typed.is_empty() && feedback.is_none() {
            Span::styled("  your answer  ", Style::default().fg(colors.muted()).bg(colors.input_bg()))
        } else {
            let cursor = if feedback == Some(Feedback::Correct) { "" } else { "_" };
            let text_color = match feedback {
                Some(Feedback::Correct) => colors.success(),
                _ => colors.fg(),
            };
            Span::styled(
                format!("  {typed}{cursor}  "),
                Style::default().fg(text_color).bg(colors.input_bg()),
            )
        };
        Paragraph::new(Line::from(field))
            .alignment(Alignment::Center)
            .render(layout[5], buf);

        let message = match feedback {
            Some(Feedback::Correct) => Span::styled(
                "\u{2713} Correct!",
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            ),
            Some(Feedback::Incorrect) => Span::styled(
                format!(
                    "\u{2717} Not quite. Correct answer: {}",
                    format_answer(problem.answer())
                ),
                Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
            ),
            None if problem.difficulty() == Difficulty::Hard
                && problem.operation() == Operation::Division => Span::styled(
                "Round to two decimal places",
                Style::default().fg(colors.muted()),
            ),
            None => Span::raw(""),
        };
        Paragraph::new(Line::from(message))
            .alignment(Alignment::Center)
            .render(layout[6], buf);
    }
}

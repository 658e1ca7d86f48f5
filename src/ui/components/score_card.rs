use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::practice::format_clock;
use crate::session::result::SessionResult;
use crate::ui::theme::Theme;

pub struct ScoreCard<'a> {
    pub result: &'a SessionResult,
    pub theme: &'a Theme,
    pub streak_days: u32,
}

impl<'a> ScoreCard<'a> {
    pub fn new(result: &'a SessionResult, theme: &'a Theme, streak_days: u32) -> Self {
        Self {
            result,
            theme,
            streak_days,
        }
    }
}

impl Widget for ScoreCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Practice Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let mut title_spans = vec![Span::styled(
            format!(
                "{} \u{00b7} {}",
                self.result.difficulty.label(),
                self.result.operation_mode.label()
            ),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )];
        if self.result.partial {
            title_spans.push(Span::styled(
                "  (ended early)",
                Style::default().fg(colors.muted()),
            ));
        }
        Paragraph::new(Line::from(title_spans))
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let acc_color = colors.for_accuracy(self.result.accuracy);
        let acc_text = format!("{:.0}%", self.result.accuracy);
        let acc_detail = format!(
            "  ({}/{} correct)",
            self.result.correct_answers, self.result.total_problems
        );
        let acc_line = Line::from(vec![
            Span::styled("  Accuracy:   ", Style::default().fg(colors.fg())),
            Span::styled(
                &*acc_text,
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(&*acc_detail, Style::default().fg(colors.muted())),
        ]);
        Paragraph::new(acc_line).render(layout[1], buf);

        let avg_text = format!("{:.1}s", self.result.average_time_secs);
        let best_text = match self.result.best_time_secs {
            Some(best) => format!("  (best {best:.1}s)"),
            None => String::new(),
        };
        let avg_line = Line::from(vec![
            Span::styled("  Avg. time:  ", Style::default().fg(colors.fg())),
            Span::styled(
                &*avg_text,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&*best_text, Style::default().fg(colors.muted())),
        ]);
        Paragraph::new(avg_line).render(layout[2], buf);

        let time_line = Line::from(vec![
            Span::styled("  Total time: ", Style::default().fg(colors.fg())),
            Span::styled(
                format_clock(self.result.total_time_secs),
                Style::default().fg(colors.fg()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[3], buf);

        let wrong = self.result.incorrect_attempts();
        let misses_line = Line::from(vec![
            Span::styled("  Misses:     ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{wrong} wrong, {} skipped", self.result.skipped),
                Style::default().fg(if wrong == 0 && self.result.skipped == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]);
        Paragraph::new(misses_line).render(layout[4], buf);

        let streak = if self.streak_days == 1 {
            "1 day".to_string()
        } else {
            format!("{} days", self.streak_days)
        };
        let score_line = Line::from(vec![
            Span::styled("  Score:      ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("+{:.0}", self.result.score),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  (streak {streak})"),
                Style::default().fg(colors.muted()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[5], buf);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(
                "  [r] Practice again  ",
                Style::default().fg(colors.accent()),
            ),
            Span::styled("[s] Stats  ", Style::default().fg(colors.accent())),
            Span::styled("[q/Esc] Menu", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[7], buf);
    }
}

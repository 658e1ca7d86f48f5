use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::practice::{PracticeState, format_clock};
use crate::session::result::SessionResult;
use crate::ui::theme::{Theme, ThemeColors};

pub struct StatsSidebar<'a> {
    practice: &'a PracticeState,
    history: &'a [SessionResult],
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(practice: &'a PracticeState, history: &'a [SessionResult], theme: &'a Theme) -> Self {
        Self {
            practice,
            history,
            theme,
        }
    }
}

/// Format a delta value with arrow indicator
fn format_delta(delta: f64, suffix: &str) -> String {
    if delta > 0.0 {
        format!("\u{2191}+{delta:.1}{suffix}")
    } else if delta < 0.0 {
        format!("\u{2193}{delta:.1}{suffix}")
    } else {
        format!("={suffix}")
    }
}

/// Positive is good unless `lower_is_better` (times).
fn delta_color(colors: &ThemeColors, delta: f64, lower_is_better: bool) -> Color {
    let delta = if lower_is_better { -delta } else { delta };
    if delta > 0.0 {
        colors.success()
    } else if delta < 0.0 {
        colors.error()
    } else {
        colors.muted()
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let last = self.history.last();

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(if last.is_some() { 10 } else { 0 }),
            ])
            .split(area);

        // Current session
        {
            let practice = self.practice;
            let accuracy = practice.accuracy();
            let avg = practice.average_time();

            let lines = vec![
                Line::from(vec![
                    Span::styled("Solved: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        format!("{}/{}", practice.correct_count(), practice.problems.len()),
                        Style::default().fg(colors.success()),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Skipped: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        practice.skipped_count().to_string(),
                        Style::default().fg(colors.muted()),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Accuracy: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        format!("{accuracy:.0}%"),
                        Style::default().fg(colors.for_accuracy(accuracy)),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Avg. time: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        if practice.correct_count() > 0 {
                            format!("{avg:.1}s")
                        } else {
                            "-".to_string()
                        },
                        Style::default().fg(colors.accent()),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Attempts: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        practice.attempt_count().to_string(),
                        Style::default().fg(colors.fg()),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Time: ", Style::default().fg(colors.fg())),
                    Span::styled(
                        format_clock(practice.elapsed_secs()),
                        Style::default().fg(colors.fg()),
                    ),
                ]),
            ];

            let block = Block::bordered()
                .title(" Session ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            Paragraph::new(lines).block(block).render(sections[0], buf);
        }

        // Last session compared with the average of everything before it
        if let Some(last) = last {
            let prior = &self.history[..self.history.len() - 1];
            let (acc_delta, time_delta) = if prior.is_empty() {
                (0.0, 0.0)
            } else {
                let n = prior.len() as f64;
                let avg_acc = prior.iter().map(|r| r.accuracy).sum::<f64>() / n;
                let avg_time = prior.iter().map(|r| r.average_time_secs).sum::<f64>() / n;
                (last.accuracy - avg_acc, last.average_time_secs - avg_time)
            };

            let mut lines = vec![Line::from(vec![
                Span::styled("Accuracy: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{:.0}%", last.accuracy),
                    Style::default().fg(colors.for_accuracy(last.accuracy)),
                ),
            ])];
            if !prior.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("  vs avg: ", Style::default().fg(colors.muted())),
                    Span::styled(
                        format_delta(acc_delta, "%"),
                        Style::default().fg(delta_color(colors, acc_delta, false)),
                    ),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Avg. time: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{:.1}s", last.average_time_secs),
                    Style::default().fg(colors.accent()),
                ),
            ]));
            if !prior.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("  vs avg: ", Style::default().fg(colors.muted())),
                    Span::styled(
                        format_delta(time_delta, "s"),
                        Style::default().fg(delta_color(colors, time_delta, true)),
                    ),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Difficulty: ", Style::default().fg(colors.fg())),
                Span::styled(last.difficulty.label(), Style::default().fg(colors.fg())),
            ]));

            let block = Block::bordered()
                .title(" Last Session ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            Paragraph::new(lines).block(block).render(sections[1], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(2.5, "%"), "\u{2191}+2.5%");
        assert_eq!(format_delta(-1.25, "s"), "\u{2193}-1.2s");
        assert_eq!(format_delta(0.0, "s"), "=s");
    }

    #[test]
    fn test_slower_time_is_bad() {
        let colors = ThemeColors::default();
        assert_eq!(delta_color(&colors, 1.0, true), colors.error());
        assert_eq!(delta_color(&colors, -1.0, true), colors.success());
        assert_eq!(delta_color(&colors, 3.0, false), colors.success());
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::engine::leaderboard::leaderboard;
use crate::engine::scoring::{level_from_score, score_to_next_level};
use crate::engine::stats::{ProfileStats, recent_sessions};
use crate::generator::problem::Difficulty;
use crate::session::result::SessionResult;
use crate::store::schema::ProfileData;
use crate::ui::theme::Theme;

/// Rows in the history and leaderboard tables.
pub const HISTORY_ROWS: usize = 20;
pub const LEADERBOARD_ROWS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsTab {
    #[default]
    Profile,
    History,
    Leaderboard,
}

impl StatsTab {
    pub const ALL: [StatsTab; 3] = [StatsTab::Profile, StatsTab::History, StatsTab::Leaderboard];

    pub fn label(self) -> &'static str {
        match self {
            StatsTab::Profile => "Profile",
            StatsTab::History => "History",
            StatsTab::Leaderboard => "Leaderboard",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct StatsDashboard<'a> {
    pub history: &'a [SessionResult],
    pub profile: &'a ProfileData,
    pub active_tab: StatsTab,
    pub leaderboard_difficulty: Difficulty,
    pub theme: &'a Theme,
    pub history_selected: usize,
    pub history_confirm_delete: bool,
}

impl<'a> StatsDashboard<'a> {
    pub fn new(
        history: &'a [SessionResult],
        profile: &'a ProfileData,
        active_tab: StatsTab,
        leaderboard_difficulty: Difficulty,
        theme: &'a Theme,
        history_selected: usize,
        history_confirm_delete: bool,
    ) -> Self {
        Self {
            history,
            profile,
            active_tab,
            leaderboard_difficulty,
            theme,
            history_selected,
            history_confirm_delete,
        }
    }
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            let msg = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No sessions yet. Finish a practice round to see your stats.",
                    Style::default().fg(colors.muted()),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "  [ESC] Back",
                    Style::default().fg(colors.accent()),
                )),
            ]);
            msg.render(inner, buf);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(10),
                Constraint::Length(2),
            ])
            .split(inner);

        let tab_spans: Vec<Span> = StatsTab::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, &tab)| {
                let style = if tab == self.active_tab {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.muted())
                };
                vec![
                    Span::styled(format!(" [{}] {} ", i + 1, tab.label()), style),
                    Span::raw("  "),
                ]
            })
            .collect();
        Paragraph::new(Line::from(tab_spans)).render(layout[0], buf);

        match self.active_tab {
            StatsTab::Profile => self.render_profile_tab(layout[1], buf),
            StatsTab::History => self.render_history_tab(layout[1], buf),
            StatsTab::Leaderboard => self.render_leaderboard_tab(layout[1], buf),
        }

        let footer_text = match self.active_tab {
            StatsTab::Profile => "  [ESC] Back  [Tab] Next tab  [1-3] Switch tab",
            StatsTab::History => {
                "  [ESC] Back  [Tab] Next tab  [1-3] Switch tab  [j/k] Navigate  [x] Delete"
            }
            StatsTab::Leaderboard => {
                "  [ESC] Back  [Tab] Next tab  [1-3] Switch tab  [h/l] Difficulty"
            }
        };
        Paragraph::new(Line::from(Span::styled(
            footer_text,
            Style::default().fg(colors.accent()),
        )))
        .render(layout[2], buf);

        if self.history_confirm_delete && self.active_tab == StatsTab::History {
            let dialog_width = 34u16;
            let dialog_height = 5u16;
            let dialog_x = area.x + area.width.saturating_sub(dialog_width) / 2;
            let dialog_y = area.y + area.height.saturating_sub(dialog_height) / 2;
            let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, dialog_height);

            let idx = self.history.len().saturating_sub(self.history_selected);
            let dialog_text = format!("Delete session #{idx}? (y/n)");

            Clear.render(dialog_area, buf);
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {dialog_text}  "),
                    Style::default().fg(colors.fg()),
                )),
            ])
            .style(Style::default().bg(colors.bg()))
            .block(
                Block::bordered()
                    .title(" Confirm ")
                    .border_style(Style::default().fg(colors.error()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(dialog_area, buf);
        }
    }
}

impl StatsDashboard<'_> {
    fn render_profile_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stats = ProfileStats::from_history(self.history);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Min(5),
            ])
            .split(area);

        let summary_block = Block::bordered()
            .title(Line::from(Span::styled(
                " Summary ",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let summary_inner = summary_block.inner(layout[0]);
        summary_block.render(layout[0], buf);

        let total_time: f64 = self.history.iter().map(|r| r.total_time_secs).sum();
        let best = stats
            .best_time
            .map(|t| format!("{t:.1}s"))
            .unwrap_or_else(|| "-".to_string());
        let summary = vec![
            Line::from(vec![
                Span::styled("  Sessions: ", Style::default().fg(colors.fg())),
                Span::styled(
                    stats.sessions.to_string(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("    Solved: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{}/{}", stats.correct_answers, stats.total_problems),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled("    Total time: ", Style::default().fg(colors.fg())),
                Span::styled(format_duration(total_time), Style::default().fg(colors.muted())),
            ]),
            Line::from(vec![
                Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{:.1}%", stats.accuracy),
                    Style::default().fg(colors.for_accuracy(stats.accuracy)),
                ),
                Span::styled("    Avg. time: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{:.1}s", stats.average_time),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled("    Fastest: ", Style::default().fg(colors.fg())),
                Span::styled(
                    best,
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Streak: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{} days", self.profile.streak_days),
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("    Best streak: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{} days", self.profile.best_streak),
                    Style::default().fg(colors.muted()),
                ),
            ]),
        ];
        Paragraph::new(summary).render(summary_inner, buf);

        // Level progress
        let level = level_from_score(self.profile.total_score);
        let remaining = score_to_next_level(self.profile.total_score);
        let floor = (level as f64).powi(2) * 100.0;
        let ceiling = ((level + 1) as f64).powi(2) * 100.0;
        let ratio = ((self.profile.total_score - floor) / (ceiling - floor)).clamp(0.0, 1.0);
        render_text_bar(
            &format!(
                "  Level {level}  ({:.0} pts, {remaining:.0} to next)",
                self.profile.total_score
            ),
            ratio,
            colors.accent(),
            colors.bar_empty(),
            layout[1],
            buf,
        );

        // Per-difficulty breakdown
        let bars = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(layout[2]);
        for (i, (difficulty, d)) in stats.by_difficulty.iter().enumerate() {
            let Some(&cell) = bars.get(i) else { break };
            let label = if d.sessions == 0 {
                format!("  {}: no sessions", difficulty.label())
            } else {
                format!(
                    "  {}: {:.0}% \u{00b7} {:.1}s \u{00b7} {} runs",
                    difficulty.label(),
                    d.accuracy,
                    d.average_time,
                    d.sessions
                )
            };
            let fill = if d.sessions == 0 {
                colors.muted()
            } else {
                colors.for_accuracy(d.accuracy)
            };
            render_text_bar(&label, d.accuracy / 100.0, fill, colors.bar_empty(), cell, buf);
        }
    }

    fn render_history_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let table_block = Block::bordered()
            .title(Line::from(Span::styled(
                " Recent Sessions ",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let table_inner = table_block.inner(area);
        table_block.render(area, buf);

        let header = Line::from(vec![Span::styled(
            "    #  Difficulty  Mode             Solved   Acc%    Avg     Date         Score",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )]);

        let mut lines = vec![
            header,
            Line::from(Span::styled(
                "  \u{2500}".to_string() + &"\u{2500}".repeat(76),
                Style::default().fg(colors.border()),
            )),
        ];

        let total = self.history.len();
        for (i, result) in recent_sessions(self.history, HISTORY_ROWS).iter().enumerate() {
            let idx = total - i;
            let solved = format!("{}/{}", result.correct_answers, result.total_problems);
            let marker = if result.partial { "*" } else { " " };
            let row = format!(
                " {marker}{idx:>3}  {difficulty:<10}  {mode:<15}  {solved:>6}  {acc:>5.0}%  {avg:>5.1}s  {date}  {score:>6.0}",
                difficulty = result.difficulty.label(),
                mode = result.operation_mode.label(),
                acc = result.accuracy,
                avg = result.average_time_secs,
                date = result.timestamp.format("%m/%d %H:%M"),
                score = result.score,
            );

            let acc_color = colors.for_accuracy(result.accuracy);
            let style = if i == self.history_selected {
                Style::default().fg(acc_color).bg(colors.input_bg())
            } else if result.partial {
                Style::default().fg(colors.muted())
            } else {
                Style::default().fg(acc_color)
            };
            lines.push(Line::from(Span::styled(row, style)));
        }

        Paragraph::new(lines).render(table_inner, buf);
    }

    fn render_leaderboard_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = format!(" Best {} Sessions ", self.leaderboard_difficulty.label());
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        let difficulty_spans: Vec<Span> = Difficulty::ALL
            .iter()
            .map(|&d| {
                let style = if d == self.leaderboard_difficulty {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.muted())
                };
                Span::styled(format!(" {} ", d.label()), style)
            })
            .collect();

        let mut lines = vec![
            Line::from(difficulty_spans),
            Line::from(""),
            Line::from(Span::styled(
                "  Rank   Acc%    Avg    Solved   Date",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        let entries = leaderboard(self.history, self.leaderboard_difficulty, LEADERBOARD_ROWS);
        if entries.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No complete sessions at this difficulty yet.",
                Style::default().fg(colors.muted()),
            )));
        }
        for entry in &entries {
            let row = format!(
                "  {rank:>4}  {acc:>5.0}%  {avg:>5.1}s  {solved:>6}   {date}",
                rank = entry.rank,
                acc = entry.accuracy,
                avg = entry.average_time,
                solved = format!("{}/{}", entry.correct, entry.total),
                date = entry.timestamp.format("%Y-%m-%d %H:%M"),
            );
            lines.push(Line::from(Span::styled(row, rank_style(entry.rank, self.theme))));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

fn rank_style(rank: usize, theme: &Theme) -> Style {
    let colors = &theme.colors;
    match rank {
        1 => Style::default()
            .fg(colors.warning())
            .add_modifier(Modifier::BOLD),
        2 | 3 => Style::default().fg(colors.accent()),
        _ => Style::default().fg(colors.fg()),
    }
}

fn render_text_bar(
    label: &str,
    ratio: f64,
    fill_color: Color,
    empty_color: Color,
    area: Rect,
    buf: &mut Buffer,
) {
    if area.height < 2 || area.width < 10 {
        return;
    }

    buf.set_string(area.x, area.y, label, Style::default().fg(fill_color));

    let bar_width = (area.width as usize).saturating_sub(4);
    let filled = (ratio.clamp(0.0, 1.0) * bar_width as f64) as usize;
    let bar_y = area.y + 1;

    for i in 0..bar_width {
        let x = area.x + 2 + i as u16;
        if x >= area.x + area.width {
            break;
        }
        let (ch, color) = if i < filled {
            ('\u{2588}', fill_color)
        } else {
            ('\u{2591}', empty_color)
        };
        buf.set_string(x, bar_y, ch.to_string(), Style::default().fg(color));
    }
}

fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let s = total % 60;
    if hours > 0 {
        format!("{hours}h {mins}m {s}s")
    } else if mins > 0 {
        format!("{mins}m {s}s")
    } else {
        format!("{s}s")
    }
}

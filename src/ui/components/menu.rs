use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Practice,
    Stats,
    Settings,
    Quit,
}

pub struct MenuItem {
    pub key: char,
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub subtitle: String,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: vec![
                MenuItem {
                    key: '1',
                    label: "Practice",
                    description: "Solve a round of problems against the clock",
                    action: MenuAction::Practice,
                },
                MenuItem {
                    key: 's',
                    label: "Statistics",
                    description: "Profile, session history and leaderboard",
                    action: MenuAction::Stats,
                },
                MenuItem {
                    key: 'c',
                    label: "Settings",
                    description: "Difficulty, operation, problem count and theme",
                    action: MenuAction::Settings,
                },
                MenuItem {
                    key: 'q',
                    label: "Quit",
                    description: "Leave mathdr",
                    action: MenuAction::Quit,
                },
            ],
            selected: 0,
            subtitle: String::new(),
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> MenuAction {
        self.items[self.selected].action
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items.iter().find(|item| item.key == key).map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "mathdr",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Terminal Arithmetic Trainer",
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                self.subtitle.as_str(),
                Style::default().fg(colors.muted()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);
            let desc_text = format!("     {}", item.description);

            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.muted()))),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let theme = Theme::default();
        let mut menu = Menu::new(&theme);
        menu.prev();
        assert_eq!(menu.selected_action(), MenuAction::Quit);
        menu.next();
        assert_eq!(menu.selected_action(), MenuAction::Practice);
    }

    #[test]
    fn test_hotkeys() {
        let theme = Theme::default();
        let menu = Menu::new(&theme);
        assert_eq!(menu.action_for_key('s'), Some(MenuAction::Stats));
        assert_eq!(menu.action_for_key('x'), None);
    }
}

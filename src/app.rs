use std::time::{Duration, Instant};

use crate::config::{Config, MAX_AUTO_ADVANCE_MS, MAX_PROBLEM_COUNT, MIN_PROBLEM_COUNT};
use crate::engine::scoring;
use crate::engine::stats;
use crate::engine::streak;
use crate::generator::arithmetic::ProblemGenerator;
use crate::generator::problem::Difficulty;
use crate::session::practice::{PracticeState, SubmitOutcome};
use crate::session::result::SessionResult;
use crate::store::json_store::JsonStore;
use crate::store::schema::{MAX_HISTORY, ProfileData, SessionHistoryData};
use crate::ui::components::menu::Menu;
use crate::ui::components::stats_dashboard::{HISTORY_ROWS, StatsTab};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Practice,
    PracticeComplete,
    Stats,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    Difficulty,
    Operation,
    ProblemCount,
    AutoAdvance,
    ShowTimer,
    Theme,
}

impl SettingsField {
    pub const ALL: [SettingsField; 6] = [
        SettingsField::Difficulty,
        SettingsField::Operation,
        SettingsField::ProblemCount,
        SettingsField::AutoAdvance,
        SettingsField::ShowTimer,
        SettingsField::Theme,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Difficulty => "Difficulty",
            SettingsField::Operation => "Operation",
            SettingsField::ProblemCount => "Problems per Session",
            SettingsField::AutoAdvance => "Auto-advance Delay",
            SettingsField::ShowTimer => "Show Timer",
            SettingsField::Theme => "Theme",
        }
    }
}

const AUTO_ADVANCE_STEP_MS: u64 = 100;

pub struct App {
    pub screen: AppScreen,
    pub practice: Option<PracticeState>,
    pub last_result: Option<SessionResult>,
    pub history: Vec<SessionResult>,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub profile: ProfileData,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    pub settings_selected: usize,
    pub stats_tab: StatsTab,
    pub leaderboard_difficulty: Difficulty,
    pub history_selected: usize,
    pub history_confirm_delete: bool,
    generator: ProblemGenerator,
}

impl App {
    pub fn new() -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            tracing::warn!("failed to load config, using defaults: {e:#}");
            Config::default()
        });
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!("data directory unavailable, progress will not be saved: {e}");
                None
            }
        };
        Self::with_parts(config, store, ProblemGenerator::from_entropy())
    }

    /// Build an app around an explicit config, store and problem source.
    pub fn with_parts(
        mut config: Config,
        store: Option<JsonStore>,
        generator: ProblemGenerator,
    ) -> Self {
        config.validate(&Theme::available_themes());
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);

        if let Some(ref s) = store
            && s.check_interrupted_import()
        {
            tracing::warn!("recovered from an interrupted import");
        }

        let mut rebuilt = false;
        let (profile, history) = match store.as_ref().map(|s| (s, s.load_profile())) {
            Some((s, Some(pd))) if !pd.needs_reset() => (pd, s.load_history().sessions),
            Some((_, Some(_))) => {
                tracing::warn!("profile schema changed, starting fresh");
                (ProfileData::default(), Vec::new())
            }
            Some((s, None)) => {
                let history = s.load_history().sessions;
                tracing::warn!(
                    "profile unreadable, rebuilding from {} sessions of history",
                    history.len()
                );
                rebuilt = true;
                (stats::profile_from_history(&history), history)
            }
            None => (ProfileData::default(), Vec::new()),
        };

        let mut app = Self {
            screen: AppScreen::Menu,
            practice: None,
            last_result: None,
            history,
            menu,
            theme,
            config,
            profile,
            store,
            should_quit: false,
            settings_selected: 0,
            stats_tab: StatsTab::default(),
            leaderboard_difficulty: Difficulty::default(),
            history_selected: 0,
            history_confirm_delete: false,
            generator,
        };
        if rebuilt {
            app.save_data();
        }
        app.refresh_menu_subtitle();
        app
    }

    fn auto_advance(&self) -> Duration {
        Duration::from_millis(self.config.auto_advance_ms)
    }

    pub fn start_practice(&mut self, now: Instant) {
        let difficulty = self.config.difficulty;
        let mode = self.config.operation;
        tracing::info!(
            difficulty = difficulty.as_str(),
            operation = mode.as_str(),
            count = self.config.problem_count,
            "starting practice session"
        );
        self.practice = Some(PracticeState::new(
            &mut self.generator,
            difficulty,
            mode,
            self.config.problem_count,
            now,
        ));
        self.screen = AppScreen::Practice;
    }

    pub fn type_char(&mut self, ch: char) {
        if let Some(ref mut practice) = self.practice {
            practice.type_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(ref mut practice) = self.practice {
            practice.backspace();
        }
    }

    pub fn submit(&mut self, now: Instant) -> Option<SubmitOutcome> {
        let outcome = self.practice.as_mut().map(|p| p.submit(now));
        self.finish_if_complete();
        outcome
    }

    pub fn skip(&mut self, now: Instant) {
        if let Some(ref mut practice) = self.practice {
            practice.skip(now);
        }
        self.finish_if_complete();
    }

    /// Drive feedback timers and auto-advance.
    pub fn tick(&mut self, now: Instant) {
        if self.screen != AppScreen::Practice {
            return;
        }
        let delay = self.auto_advance();
        if let Some(ref mut practice) = self.practice {
            practice.tick(now, delay);
        }
        self.finish_if_complete();
    }

    fn finish_if_complete(&mut self) {
        let complete = self.practice.as_ref().is_some_and(|p| p.is_complete());
        if complete && self.screen == AppScreen::Practice {
            self.finish_practice(false);
        }
    }

    /// Esc during practice: keep what was answered, drop the rest.
    pub fn end_practice(&mut self) {
        let has_progress = self
            .practice
            .as_ref()
            .is_some_and(|p| p.resolved_count() > 0);
        if has_progress {
            self.finish_practice(true);
        } else {
            self.go_to_menu();
        }
    }

    fn finish_practice(&mut self, partial: bool) {
        let Some(ref practice) = self.practice else {
            return;
        };
        let result = SessionResult::from_practice(practice, partial);
        tracing::info!(
            correct = result.correct_answers,
            total = result.total_problems,
            accuracy = result.accuracy,
            score = result.score,
            partial,
            "practice session finished"
        );

        self.profile.total_score += result.score;
        self.profile.total_sessions += 1;
        streak::record_practice(&mut self.profile, result.timestamp.date_naive());

        self.history.push(result.clone());
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }

        self.last_result = Some(result);
        self.screen = AppScreen::PracticeComplete;
        self.save_data();
        self.refresh_menu_subtitle();
    }

    fn save_data(&self) {
        let Some(ref store) = self.store else {
            return;
        };
        if let Err(e) = store.save_profile(&self.profile) {
            tracing::error!("failed to save profile: {e}");
        }
        if let Err(e) = store.save_history(&SessionHistoryData::new(self.history.clone())) {
            tracing::error!("failed to save session history: {e}");
        }
    }

    pub fn retry_practice(&mut self, now: Instant) {
        self.start_practice(now);
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
        self.practice = None;
    }

    pub fn go_to_stats(&mut self) {
        self.stats_tab = StatsTab::Profile;
        self.leaderboard_difficulty = self.config.difficulty;
        self.history_selected = 0;
        self.history_confirm_delete = false;
        self.screen = AppScreen::Stats;
    }

    pub fn history_select_next(&mut self) {
        if !self.history.is_empty() {
            let max_visible = self.history.len().min(HISTORY_ROWS) - 1;
            self.history_selected = (self.history_selected + 1).min(max_visible);
        }
    }

    pub fn history_select_prev(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    pub fn request_delete(&mut self) {
        if !self.history.is_empty() {
            self.history_confirm_delete = true;
        }
    }

    pub fn delete_session(&mut self) {
        self.history_confirm_delete = false;
        if self.history.is_empty() {
            return;
        }
        // History tab lists newest first
        let actual_idx = self.history.len() - 1 - self.history_selected;
        let removed = self.history.remove(actual_idx);
        tracing::info!(timestamp = %removed.timestamp, "deleted session");
        self.rebuild_from_history();
        self.save_data();
        self.refresh_menu_subtitle();

        if !self.history.is_empty() {
            let max_visible = self.history.len().min(HISTORY_ROWS) - 1;
            self.history_selected = self.history_selected.min(max_visible);
        } else {
            self.history_selected = 0;
        }
    }

    /// Replay remaining history oldest to newest to recompute profile totals.
    pub fn rebuild_from_history(&mut self) {
        self.profile = stats::profile_from_history(&self.history);
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn leave_settings(&mut self) {
        if let Err(e) = self.config.save() {
            tracing::error!("failed to save config: {e:#}");
        }
        self.refresh_menu_subtitle();
        self.go_to_menu();
    }

    pub fn settings_field(&self) -> SettingsField {
        SettingsField::ALL[self.settings_selected.min(SettingsField::ALL.len() - 1)]
    }

    pub fn settings_select_next(&mut self) {
        if self.settings_selected + 1 < SettingsField::ALL.len() {
            self.settings_selected += 1;
        }
    }

    pub fn settings_select_prev(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::Difficulty => self.config.difficulty.label().to_string(),
            SettingsField::Operation => self.config.operation.label().to_string(),
            SettingsField::ProblemCount => self.config.problem_count.to_string(),
            SettingsField::AutoAdvance => format!("{} ms", self.config.auto_advance_ms),
            SettingsField::ShowTimer => {
                if self.config.show_timer { "on" } else { "off" }.to_string()
            }
            SettingsField::Theme => self.config.theme.clone(),
        }
    }

    pub fn settings_cycle_forward(&mut self) {
        match self.settings_field() {
            SettingsField::Difficulty => self.config.difficulty = self.config.difficulty.next(),
            SettingsField::Operation => self.config.operation = self.config.operation.next(),
            SettingsField::ProblemCount => {
                let step = count_step(self.config.problem_count);
                self.config.problem_count =
                    (self.config.problem_count + step).min(MAX_PROBLEM_COUNT);
            }
            SettingsField::AutoAdvance => {
                self.config.auto_advance_ms =
                    (self.config.auto_advance_ms + AUTO_ADVANCE_STEP_MS).min(MAX_AUTO_ADVANCE_MS);
            }
            SettingsField::ShowTimer => self.config.show_timer = !self.config.show_timer,
            SettingsField::Theme => self.cycle_theme(true),
        }
    }

    pub fn settings_cycle_backward(&mut self) {
        match self.settings_field() {
            SettingsField::Difficulty => self.config.difficulty = self.config.difficulty.prev(),
            SettingsField::Operation => self.config.operation = self.config.operation.prev(),
            SettingsField::ProblemCount => {
                let step = count_step(self.config.problem_count.saturating_sub(1));
                self.config.problem_count = self
                    .config
                    .problem_count
                    .saturating_sub(step)
                    .max(MIN_PROBLEM_COUNT);
            }
            SettingsField::AutoAdvance => {
                self.config.auto_advance_ms =
                    self.config.auto_advance_ms.saturating_sub(AUTO_ADVANCE_STEP_MS);
            }
            SettingsField::ShowTimer => self.config.show_timer = !self.config.show_timer,
            SettingsField::Theme => self.cycle_theme(false),
        }
    }

    fn cycle_theme(&mut self, forward: bool) {
        let themes = Theme::available_themes();
        if themes.is_empty() {
            return;
        }
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) if forward => (idx + 1) % themes.len(),
            Some(idx) => (idx + themes.len() - 1) % themes.len(),
            None => 0,
        };
        let name = themes[next].clone();
        self.set_theme(&name);
    }

    /// Switch to a named theme. Returns false if no such theme exists.
    pub fn set_theme(&mut self, name: &str) -> bool {
        let Some(new_theme) = Theme::load(name) else {
            return false;
        };
        let theme: &'static Theme = Box::leak(Box::new(new_theme));
        self.theme = theme;
        self.menu.theme = theme;
        self.config.theme = name.to_string();
        true
    }

    pub fn refresh_menu_subtitle(&mut self) {
        let level = scoring::level_from_score(self.profile.total_score);
        let streak = if self.profile.streak_days > 0 {
            format!(" \u{00b7} {} day streak", self.profile.streak_days)
        } else {
            String::new()
        };
        self.menu.subtitle = format!(
            "Level {level} \u{00b7} {:.0} pts{streak} \u{00b7} {} {} \u{00d7} {}",
            self.profile.total_score,
            self.config.difficulty.label(),
            self.config.operation.label(),
            self.config.problem_count,
        );
    }
}

/// Single steps for short sessions, then fives.
fn count_step(count: usize) -> usize {
    if count < 10 { 1 } else { 5 }
}

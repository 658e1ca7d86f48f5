use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathdr::app::{App, AppScreen, SettingsField};
use mathdr::config::{Config, MAX_PROBLEM_COUNT, MIN_PROBLEM_COUNT};
use mathdr::event::{AppEvent, EventHandler, TICK_RATE};
use mathdr::generator::problem::{Difficulty, OperationMode};
use mathdr::logging;
use mathdr::session::practice::format_clock;
use mathdr::store::json_store::JsonStore;
use mathdr::ui;
use mathdr::ui::components::menu::MenuAction;
use mathdr::ui::components::problem_card::ProblemCard;
use mathdr::ui::components::progress_bar::ProgressBar;
use mathdr::ui::components::score_card::ScoreCard;
use mathdr::ui::components::stats_dashboard::{StatsDashboard, StatsTab};
use mathdr::ui::components::stats_sidebar::StatsSidebar;
use mathdr::ui::layout::AppLayout;
use mathdr::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "mathdr", version, about = "Terminal arithmetic drilling tutor")]
struct Cli {
    #[arg(short, long, value_parser = parse_difficulty, help = "Difficulty (easy, medium, hard)")]
    difficulty: Option<Difficulty>,

    #[arg(
        short,
        long,
        value_parser = parse_operation,
        help = "Operation (addition, subtraction, multiplication, division, mixed)"
    )]
    operation: Option<OperationMode>,

    #[arg(short = 'n', long, help = "Number of problems per session")]
    count: Option<usize>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "PATH", conflicts_with = "import", help = "Write all data to a JSON file and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Replace all data from an export file and exit")]
    import: Option<PathBuf>,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_name(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown difficulty {s:?} (expected easy, medium or hard)"))
}

fn parse_operation(s: &str) -> Result<OperationMode, String> {
    OperationMode::from_name(&s.to_ascii_lowercase()).ok_or_else(|| {
        format!(
            "unknown operation {s:?} (expected addition, subtraction, multiplication, division or mixed)"
        )
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&logging::default_log_path()) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    if let Some(path) = cli.export.as_deref() {
        return export_data(path);
    }
    if let Some(path) = cli.import.as_deref() {
        return import_data(path);
    }

    let mut app = App::new();
    apply_overrides(&mut app, &cli);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("exiting on error: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn export_data(path: &Path) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let store = JsonStore::new()?;
    store
        .export_to_file(&config, path)
        .with_context(|| format!("exporting to {}", path.display()))?;
    println!("Exported mathdr data to {}", path.display());
    Ok(())
}

fn import_data(path: &Path) -> Result<()> {
    let data = JsonStore::read_export(path)
        .with_context(|| format!("reading export file {}", path.display()))?;
    let store = JsonStore::new()?;
    store.import_all(&data).context("importing data")?;

    let mut config = data.config;
    config.validate(&Theme::available_themes());
    config.save().context("saving imported config")?;

    println!(
        "Imported {} sessions from {}",
        data.history.sessions.len(),
        path.display()
    );
    Ok(())
}

/// Command-line flags override the saved config for this run.
fn apply_overrides(app: &mut App, cli: &Cli) {
    if let Some(difficulty) = cli.difficulty {
        app.config.difficulty = difficulty;
    }
    if let Some(operation) = cli.operation {
        app.config.operation = operation;
    }
    if let Some(count) = cli.count {
        app.config.problem_count = count.clamp(MIN_PROBLEM_COUNT, MAX_PROBLEM_COUNT);
    }
    if let Some(ref theme_name) = cli.theme
        && !app.set_theme(theme_name)
    {
        tracing::warn!("unknown theme {theme_name:?}, keeping {}", app.config.theme);
    }
    app.refresh_menu_subtitle();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key, at) => handle_key(app, key, at),
            AppEvent::Tick(now) => app.tick(now),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, at: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key, at),
        AppScreen::Practice => handle_practice_key(app, key, at),
        AppScreen::PracticeComplete => handle_result_key(app, key, at),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn run_menu_action(app: &mut App, action: MenuAction, at: Instant) {
    match action {
        MenuAction::Practice => app.start_practice(at),
        MenuAction::Stats => app.go_to_stats(),
        MenuAction::Settings => app.go_to_settings(),
        MenuAction::Quit => app.should_quit = true,
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let action = app.menu.selected_action();
            run_menu_action(app, action, at);
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                run_menu_action(app, action, at);
            }
        }
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Esc => app.end_practice(),
        KeyCode::Enter => {
            app.submit(at);
        }
        KeyCode::Tab => app.skip(at),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent, at: Instant) {
    // Enter is left unbound: it is the key still being pressed when the
    // last problem advances onto this screen.
    match key.code {
        KeyCode::Char('r') => app.retry_practice(at),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('s') => app.go_to_stats(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.history_confirm_delete {
        match key.code {
            KeyCode::Char('y') => app.delete_session(),
            KeyCode::Char('n') | KeyCode::Esc => app.history_confirm_delete = false,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.go_to_menu();
            return;
        }
        KeyCode::Tab => {
            app.stats_tab = app.stats_tab.next();
            return;
        }
        KeyCode::BackTab => {
            app.stats_tab = app.stats_tab.prev();
            return;
        }
        KeyCode::Char(ch @ '1'..='3') => {
            if let Some(tab) = StatsTab::from_index(ch as usize - '1' as usize) {
                app.stats_tab = tab;
            }
            return;
        }
        _ => {}
    }

    match app.stats_tab {
        StatsTab::History => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.history_select_next(),
            KeyCode::Char('k') | KeyCode::Up => app.history_select_prev(),
            KeyCode::Char('x') | KeyCode::Delete => app.request_delete(),
            _ => {}
        },
        StatsTab::Leaderboard => match key.code {
            KeyCode::Char('l') | KeyCode::Right => {
                app.leaderboard_difficulty = app.leaderboard_difficulty.next();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                app.leaderboard_difficulty = app.leaderboard_difficulty.prev();
            }
            _ => {}
        },
        StatsTab::Profile => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_select_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::PracticeComplete => render_result(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header_info = format!(
        " {} sessions | best streak {} days",
        app.profile.total_sessions, app.profile.best_streak
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " mathdr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " [1] Practice  [s] Stats  [c] Settings  [q] Quit ",
        Style::default().fg(colors.muted()),
    )]));
    frame.render_widget(footer, layout[2]);
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(ref practice) = app.practice else {
        return;
    };
    let app_layout = AppLayout::new(area);
    let tier = app_layout.tier;

    let title = format!(
        " {} \u{00b7} {} ",
        practice.difficulty.label(),
        practice.mode.label()
    );
    let mut header_spans = vec![Span::styled(
        title,
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )];
    // Without a sidebar the header carries the running numbers
    if !tier.show_sidebar() {
        header_spans.push(Span::styled(
            format!(
                "| {}/{} | Acc: {:.0}% ",
                practice.correct_count(),
                practice.problems.len(),
                practice.accuracy()
            ),
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ));
    }
    if app.config.show_timer {
        header_spans.push(Span::styled(
            format!("| {} ", format_clock(practice.elapsed_secs())),
            Style::default()
                .fg(colors.accent())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    let show_progress = tier.show_progress_bar(area.height);
    let mut constraints: Vec<Constraint> = vec![Constraint::Min(9)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    frame.render_widget(ProblemCard::new(practice, app.theme), main_layout[0]);

    if show_progress {
        let progress = ProgressBar::problems(
            practice.resolved_count(),
            practice.problems.len(),
            app.theme,
        );
        frame.render_widget(progress, main_layout[1]);
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = StatsSidebar::new(practice, &app.history, app.theme);
        frame.render_widget(sidebar, sidebar_area);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Enter] Submit  [Tab] Skip  [Backspace] Delete  [ESC] End session ",
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, app_layout.footer);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref result) = app.last_result {
        let centered = ui::layout::centered_rect(60, 70, area);
        let card = ScoreCard::new(result, app.theme, app.profile.streak_days);
        frame.render_widget(card, centered);
    }
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let dashboard = StatsDashboard::new(
        &app.history,
        &app.profile,
        app.stats_tab,
        app.leaderboard_difficulty,
        app.theme,
        app.history_selected,
        app.history_confirm_delete,
    );
    frame.render_widget(dashboard, area);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = SettingsField::ALL;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.muted()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_text = format!("{indicator}{}:", field.label());
        let value_text = format!("  < {} >", app.settings_value(*field));

        let label_style = Style::default()
            .fg(if is_selected {
                colors.accent()
            } else {
                colors.fg()
            })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });

        let value_style = Style::default().fg(if is_selected {
            colors.problem()
        } else {
            colors.muted()
        });

        let lines = vec![
            Line::from(Span::styled(label_text, label_style)),
            Line::from(Span::styled(value_text, value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}

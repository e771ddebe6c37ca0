use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use typedash::app::{App, AppScreen};
use typedash::config::Config;
use typedash::engine::trend::{RECENT_WINDOW, TrendSeries, difficulty_breakdown};
use typedash::event::{AppEvent, EventHandler};
use typedash::feedback;
use typedash::generator::Difficulty;
use typedash::generator::passage::PassageCorpus;
use typedash::logging;
use typedash::session::{SessionState, TestDuration};
use typedash::store::history::ResultHistory;
use typedash::store::json_store::JsonStore;
use typedash::ui;
use typedash::ui::components::chart::{DifficultyBars, TrendChart};
use typedash::ui::components::dashboard::Dashboard;
use typedash::ui::components::leaderboard::Leaderboard;
use typedash::ui::components::live_stats::{LiveStatsPanel, format_clock};
use typedash::ui::components::progress_bar::ProgressBar;
use typedash::ui::components::typing_area::TypingArea;
use typedash::ui::layout::{AppLayout, pack_hint_lines};
use typedash::ui::line_input::InputResult;

#[derive(Parser)]
#[command(name = "typedash", version, about = "Terminal typing speed test")]
struct Cli {
    #[arg(short, long, help = "Display name for this session's results")]
    name: Option<String>,

    #[arg(short, long, help = "Test duration in seconds")]
    duration: Option<u32>,

    #[arg(long, help = "Passage difficulty (easy, medium, hard)")]
    difficulty: Option<Difficulty>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Disable the per-key terminal bell")]
    no_sound: bool,

    #[arg(long, help = "Directory for results and logs")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Write config, profile and results to a JSON file and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Replace config, profile and results with a JSON export and exit")]
    import: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::config_path();
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring unreadable config {}: {e:#}", config_path.display());
            Config::default()
        }
    };
    apply_overrides(&mut config, &cli)?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(JsonStore::default_dir);
    if let Err(e) = logging::init(&data_dir, &config.log_level) {
        eprintln!("Logging disabled: {e:#}");
    }
    let store = JsonStore::with_base_dir(data_dir)?;

    if let Some(path) = &cli.export {
        let data = store.export_to_file(&config, path)?;
        println!(
            "Exported {} results to {}",
            data.history.results.len(),
            path.display()
        );
        return Ok(());
    }
    if let Some(path) = &cli.import {
        let data = JsonStore::read_export(path)?;
        store.import_with_config(&data, &config_path)?;
        println!(
            "Imported {} results from {}",
            data.history.results.len(),
            path.display()
        );
        println!("Restored config to {}", config_path.display());
        return Ok(());
    }

    let mut history = ResultHistory::open(store, config.history_limit);
    if let Some(name) = &cli.name
        && !history.set_user_name(name)
    {
        bail!("--name must not be blank");
    }

    let corpus = PassageCorpus::load()?;
    let feedback = feedback::from_config(config.sound);
    let mut app = App::new(
        config,
        history,
        Box::new(corpus),
        feedback,
        Some(config_path),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(secs) = cli.duration {
        if TestDuration::new(secs).is_err() {
            bail!("--duration must be greater than zero");
        }
        config.duration_secs = secs;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if cli.no_sound {
        config.sound = false;
    }
    config.validate();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                if app.screen == AppScreen::Test {
                    app.paste(&text);
                }
            }
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::NameEntry => handle_name_key(app, key),
        AppScreen::Test => handle_test_key(app, key),
        AppScreen::Results => handle_result_key(app, key),
        AppScreen::Leaderboard | AppScreen::Progress => handle_overlay_key(app, key),
    }
}

fn handle_name_key(app: &mut App, key: KeyEvent) {
    match app.name_input.handle(key) {
        InputResult::Submit => app.submit_name(),
        InputResult::Cancel => app.cancel_name_entry(),
        InputResult::Continue => {}
    }
}

fn handle_test_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('w') | KeyCode::Backspace => app.delete_word(),
            KeyCode::Char('r') => app.reset_test(),
            KeyCode::Char('l') => app.go_to_leaderboard(),
            KeyCode::Char('p') => app.go_to_progress(),
            KeyCode::Char('t') => app.cycle_theme(),
            KeyCode::Char('u') => app.change_user(),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
        return;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return;
    }

    let idle = app.session.state() == SessionState::Idle;
    match key.code {
        KeyCode::Esc => app.toggle_pause(),
        KeyCode::Enter if idle => app.start_test(),
        KeyCode::Tab if idle => app.cycle_duration(true),
        KeyCode::BackTab if idle => app.cycle_duration(false),
        KeyCode::Down if idle => app.cycle_difficulty(true),
        KeyCode::Up if idle => app.cycle_difficulty(false),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') | KeyCode::Enter => app.new_test(),
        KeyCode::Char('r') => app.start_test(),
        KeyCode::Char('l') => app.go_to_leaderboard(),
        KeyCode::Char('p') => app.go_to_progress(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),
        KeyCode::Tab if app.screen == AppScreen::Leaderboard => app.go_to_progress(),
        KeyCode::Tab => app.go_to_leaderboard(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::NameEntry => render_name_entry(frame, app),
        AppScreen::Test => render_test(frame, app),
        AppScreen::Results => render_result(frame, app),
        AppScreen::Leaderboard => render_leaderboard(frame, app),
        AppScreen::Progress => render_progress(frame, app),
    }
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, hints: &[&str], area: Rect) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| {
            Line::from(Span::styled(
                l,
                Style::default().fg(app.theme.colors.text_pending()),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_name_entry(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(50, 30, area);

    let (before, cursor, after) = app.name_input.render_parts();
    let cursor_style = Style::default()
        .fg(colors.text_cursor_fg())
        .bg(colors.text_cursor_bg());
    let input = Line::from(vec![
        Span::styled(" > ", Style::default().fg(colors.accent())),
        Span::styled(before, Style::default().fg(colors.fg())),
        Span::styled(cursor.map_or(" ".to_string(), String::from), cursor_style),
        Span::styled(after, Style::default().fg(colors.fg())),
    ]);

    let mut lines = vec![
        Line::from(Span::styled(
            "Who is typing?",
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        input,
        Line::from(""),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(colors.error()),
        )));
    }
    lines.push(Line::from(Span::styled(
        "[Enter] Continue  [Esc] Cancel",
        Style::default().fg(colors.text_pending()),
    )));

    frame.render_widget(Clear, centered);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::bordered()
                .title(" typedash ")
                .border_style(Style::default().fg(colors.accent()))
                .style(Style::default().bg(colors.bg())),
        ),
        centered,
    );
}

fn render_test(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let session = &app.session;
    let state = session.state();

    let app_layout = AppLayout::new(area);
    let tier = app_layout.tier;

    let state_label = match state {
        SessionState::Idle => "Ready",
        SessionState::Running => "Typing",
        SessionState::Paused => "Paused",
        SessionState::Completed => "Done",
    };
    let header_info = format!(
        " {} | {} | {} | {state_label}",
        app.user_name(),
        session.duration().label(),
        session.difficulty().label(),
    );
    let header_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(app_layout.header);
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " typedash ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, header_rows[0]);

    let stats = || {
        LiveStatsPanel::new(
            session.live_stats(),
            session.remaining_secs(),
            session.total_keystrokes(),
            session.error_positions().len(),
            app.theme,
        )
    };

    // Medium and narrow terminals carry the stats in the header.
    if !tier.show_sidebar() {
        frame.render_widget(stats().compact(true), header_rows[1]);
    }

    let show_progress = tier.show_progress_bar(area.height);
    let mut constraints = vec![Constraint::Min(5)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    let typing = TypingArea::new(session.reference_text(), session.transcript(), app.theme)
        .title(format!("{} passage", session.difficulty().label()))
        .placeholder("Press Enter or start typing to begin.")
        .show_cursor(state == SessionState::Running);
    frame.render_widget(typing, main_layout[0]);

    if show_progress {
        let progress = ProgressBar::new("Time", session.elapsed_ratio(), app.theme)
            .caption(format!("{} left", format_clock(session.remaining_secs())));
        frame.render_widget(progress, main_layout[1]);
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        frame.render_widget(stats(), sidebar_area);
    }

    if state == SessionState::Paused {
        let popup = ui::layout::centered_rect(30, 20, main_layout[0]);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Paused",
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "[Esc] Resume",
                    Style::default().fg(colors.text_pending()),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(colors.warning()))
                    .style(Style::default().bg(colors.bg())),
            ),
            popup,
        );
    }

    let hints: &[&str] = match state {
        SessionState::Idle => &[
            "[Enter] Start",
            "[Tab] Duration",
            "[Up/Down] Difficulty",
            "[^L] Leaderboard",
            "[^P] Progress",
            "[^T] Theme",
            "[^U] User",
            "[^Q] Quit",
        ],
        _ => &[
            "[Esc] Pause/Resume",
            "[^W] Delete word",
            "[^R] Reset",
            "[^Q] Quit",
        ],
    };
    render_footer(frame, app, hints, app_layout.footer);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(result) = app.session.result() {
        let centered = ui::layout::centered_rect(60, 70, area);
        let dashboard = Dashboard::new(result, app.personal_best, app.user_name(), app.theme);
        frame.render_widget(dashboard, centered);
    }
}

fn render_leaderboard(frame: &mut ratatui::Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(frame.area());

    let board = Leaderboard::new(
        app.history.records(),
        app.config.leaderboard_size,
        app.theme,
    );
    frame.render_widget(board, layout[0]);
    render_footer(
        frame,
        app,
        &["[Esc] Back", "[Tab] Progress", "[t] Theme", "[q] Quit"],
        layout[1],
    );
}

fn render_progress(frame: &mut ratatui::Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let records = app.history.records();
    let series = TrendSeries::recent(records, RECENT_WINDOW);
    frame.render_widget(TrendChart::new(&series, app.theme), layout[0]);

    let breakdown = difficulty_breakdown(records);
    frame.render_widget(DifficultyBars::new(&breakdown, app.theme), layout[1]);

    render_footer(
        frame,
        app,
        &["[Esc] Back", "[Tab] Leaderboard", "[t] Theme", "[q] Quit"],
        layout[2],
    );
}

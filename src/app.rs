use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::Config;
use crate::engine::leaderboard::PersonalBest;
use crate::feedback::KeyFeedback;
use crate::generator::ParagraphSource;
use crate::session::{InputOutcome, SessionEngine, SessionState};
use crate::store::history::{ANONYMOUS, ResultHistory};
use crate::ui::line_input::{LineInput, trim_last_word};
use crate::ui::theme::Theme;

pub const MAX_NAME_CHARS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    NameEntry,
    Test,
    Results,
    Leaderboard,
    Progress,
}

pub struct App {
    pub screen: AppScreen,
    pub session: SessionEngine<Box<dyn ParagraphSource>>,
    pub history: ResultHistory,
    pub config: Config,
    pub theme: &'static Theme,
    pub name_input: LineInput,
    pub personal_best: PersonalBest,
    pub status: Option<String>,
    pub should_quit: bool,
    return_screen: AppScreen,
    feedback: Box<dyn KeyFeedback>,
    config_path: Option<PathBuf>,
}

impl App {
    /// `config_path` is where setting changes are saved; `None` keeps them
    /// in memory only.
    pub fn new(
        mut config: Config,
        history: ResultHistory,
        source: Box<dyn ParagraphSource>,
        feedback: Box<dyn KeyFeedback>,
        config_path: Option<PathBuf>,
    ) -> Self {
        config.normalize_theme(&Theme::available_themes());
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let mut session = SessionEngine::new(source);
        session.configure(config.difficulty, config.duration());

        let screen = if history.user_name().is_some() {
            AppScreen::Test
        } else {
            AppScreen::NameEntry
        };

        Self {
            screen,
            session,
            history,
            config,
            theme,
            name_input: LineInput::new("", MAX_NAME_CHARS),
            personal_best: PersonalBest::default(),
            status: None,
            should_quit: false,
            return_screen: AppScreen::Test,
            feedback,
            config_path,
        }
    }

    pub fn user_name(&self) -> &str {
        self.history.user_name().unwrap_or(ANONYMOUS)
    }

    pub fn submit_name(&mut self) {
        if self.history.set_user_name(self.name_input.value()) {
            self.status = None;
            self.screen = AppScreen::Test;
        } else {
            self.status = Some("Please enter a name".to_string());
        }
    }

    pub fn change_user(&mut self) {
        if self.session.state() != SessionState::Idle {
            return;
        }
        self.name_input = LineInput::new(self.history.user_name().unwrap_or(""), MAX_NAME_CHARS);
        self.status = None;
        self.screen = AppScreen::NameEntry;
    }

    /// Leave name entry without a new name. Quits when no name was ever set.
    pub fn cancel_name_entry(&mut self) {
        if self.history.user_name().is_some() {
            self.status = None;
            self.screen = AppScreen::Test;
        } else {
            self.should_quit = true;
        }
    }

    pub fn start_test(&mut self) {
        let difficulty = self.session.difficulty();
        let duration = self.session.duration();
        if self.session.start(difficulty, duration) {
            self.screen = AppScreen::Test;
        }
    }

    /// Back to an idle test screen so settings can be changed.
    pub fn new_test(&mut self) {
        self.session.reset();
        self.screen = AppScreen::Test;
    }

    pub fn reset_test(&mut self) {
        self.session.reset();
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    pub fn cycle_duration(&mut self, forward: bool) {
        if self.session.state() != SessionState::Idle {
            return;
        }
        let current = self.session.duration();
        let duration = if forward {
            current.next_preset()
        } else {
            current.prev_preset()
        };
        self.session.configure(self.session.difficulty(), duration);
        self.config.duration_secs = duration.secs();
        self.save_config();
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        if self.session.state() != SessionState::Idle {
            return;
        }
        let current = self.session.difficulty();
        let difficulty = if forward { current.next() } else { current.prev() };
        self.session.configure(difficulty, self.session.duration());
        self.config.difficulty = difficulty;
        self.save_config();
    }

    pub fn cycle_theme(&mut self) {
        self.config.theme = Theme::next_name(&self.config.theme);
        if let Some(new_theme) = Theme::load(&self.config.theme) {
            self.theme = Box::leak(Box::new(new_theme));
        }
        self.save_config();
    }

    pub fn type_char(&mut self, ch: char) {
        if !self.begin_input() {
            return;
        }
        let mut next = self.session.transcript().to_string();
        next.push(ch);
        self.submit(&next);
    }

    pub fn backspace(&mut self) {
        if !self.begin_input() {
            return;
        }
        let mut next = self.session.transcript().to_string();
        if next.pop().is_some() {
            self.submit(&next);
        }
    }

    pub fn delete_word(&mut self) {
        if !self.begin_input() {
            return;
        }
        let next = trim_last_word(self.session.transcript()).to_string();
        self.submit(&next);
    }

    /// Append pasted text as a single edit. Line breaks become spaces.
    pub fn paste(&mut self, text: &str) {
        if !self.begin_input() {
            return;
        }
        let flattened = text.lines().collect::<Vec<_>>().join(" ");
        let next = format!("{}{}", self.session.transcript(), flattened);
        self.submit(&next);
    }

    /// Auto-start from idle, then sound the cue. False when input cannot apply.
    fn begin_input(&mut self) -> bool {
        if self.screen != AppScreen::Test {
            return false;
        }
        if self.session.state() == SessionState::Idle {
            self.start_test();
        }
        if self.session.state() != SessionState::Running {
            return false;
        }
        self.feedback.key_tick();
        true
    }

    fn submit(&mut self, next: &str) {
        if self.session.submit_input(next) == InputOutcome::Completed {
            self.collect_result();
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.session.advance_clock(now) > 0 {
            self.collect_result();
        }
    }

    fn collect_result(&mut self) {
        if !self.session.deliver(&mut self.history) {
            return;
        }
        self.personal_best = self
            .session
            .result()
            .map(|r| PersonalBest::check(r, self.history.records()))
            .unwrap_or_default();
        self.screen = AppScreen::Results;
    }

    pub fn go_to_leaderboard(&mut self) {
        self.open_overlay(AppScreen::Leaderboard);
    }

    pub fn go_to_progress(&mut self) {
        self.open_overlay(AppScreen::Progress);
    }

    fn open_overlay(&mut self, screen: AppScreen) {
        if matches!(
            self.session.state(),
            SessionState::Running | SessionState::Paused
        ) {
            return;
        }
        if matches!(self.screen, AppScreen::Test | AppScreen::Results) {
            self.return_screen = self.screen;
        }
        self.screen = screen;
    }

    pub fn go_back(&mut self) {
        self.screen = self.return_screen;
    }

    fn save_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        match self.config.save_to(path) {
            Ok(()) => info!(path = %path.display(), "config saved"),
            Err(e) => warn!(error = %e, "failed to save config"),
        }
    }
}

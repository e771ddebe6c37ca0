use std::collections::BTreeSet;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::generator::{Difficulty, ParagraphSource};
use crate::session::metrics::LiveStats;
use crate::session::result::TestResult;
use crate::session::timer::Countdown;
use crate::session::{ResultSink, TestDuration};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// The session is not running.
    Ignored,
    /// Longer than the reference text.
    Rejected,
    /// Same as the current transcript.
    Unchanged,
    Accepted,
    /// Accepted and the transcript now matches the reference.
    Completed,
}

pub struct SessionEngine<S: ParagraphSource> {
    source: S,
    state: SessionState,
    difficulty: Difficulty,
    duration: TestDuration,
    reference: Vec<char>,
    reference_text: String,
    transcript: String,
    remaining_secs: u32,
    total_keystrokes: usize,
    correct_keystrokes: usize,
    error_positions: BTreeSet<usize>,
    countdown: Countdown,
    result: Option<TestResult>,
    outbox: Option<TestResult>,
}

impl<S: ParagraphSource> SessionEngine<S> {
    pub fn new(source: S) -> Self {
        let duration = TestDuration::default();
        Self {
            source,
            state: SessionState::Idle,
            difficulty: Difficulty::default(),
            duration,
            reference: Vec::new(),
            reference_text: String::new(),
            transcript: String::new(),
            remaining_secs: duration.secs(),
            total_keystrokes: 0,
            correct_keystrokes: 0,
            error_positions: BTreeSet::new(),
            countdown: Countdown::default(),
            result: None,
            outbox: None,
        }
    }

    /// Replace the default one-second countdown.
    pub fn with_countdown(mut self, countdown: Countdown) -> Self {
        self.countdown = countdown;
        self
    }

    /// Change the settings shown while idle. Ignored once a test is underway.
    pub fn configure(&mut self, difficulty: Difficulty, duration: TestDuration) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.difficulty = difficulty;
        self.duration = duration;
        self.remaining_secs = duration.secs();
        true
    }

    pub fn start(&mut self, difficulty: Difficulty, duration: TestDuration) -> bool {
        self.start_at(difficulty, duration, Instant::now())
    }

    pub fn start_at(&mut self, difficulty: Difficulty, duration: TestDuration, now: Instant) -> bool {
        match self.state {
            SessionState::Running | SessionState::Paused => {
                debug!(state = ?self.state, "start ignored, test already underway");
                return false;
            }
            SessionState::Completed => self.reset(),
            SessionState::Idle => {}
        }

        self.difficulty = difficulty;
        self.duration = duration;
        self.reference_text = self.source.paragraph(difficulty);
        self.reference = self.reference_text.chars().collect();
        self.clear_progress();
        self.state = SessionState::Running;
        self.countdown.disarm();
        self.countdown.arm(now);

        info!(
            %difficulty,
            duration_secs = duration.secs(),
            chars = self.reference.len(),
            "test started"
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::Paused;
        self.countdown.disarm();
        debug!(remaining = self.remaining_secs, "test paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        self.resume_at(Instant::now())
    }

    pub fn resume_at(&mut self, now: Instant) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.state = SessionState::Running;
        self.countdown.arm(now);
        debug!(remaining = self.remaining_secs, "test resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.toggle_pause_at(Instant::now())
    }

    pub fn toggle_pause_at(&mut self, now: Instant) -> bool {
        match self.state {
            SessionState::Running => self.pause(),
            SessionState::Paused => self.resume_at(now),
            _ => false,
        }
    }

    /// Back to idle from any state. An undelivered result stays queued.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.countdown.disarm();
        self.reference.clear();
        self.reference_text.clear();
        self.clear_progress();
        debug!("test reset");
    }

    fn clear_progress(&mut self) {
        self.transcript.clear();
        self.total_keystrokes = 0;
        self.correct_keystrokes = 0;
        self.error_positions.clear();
        self.remaining_secs = self.duration.secs();
        self.result = None;
    }

    pub fn submit_input(&mut self, value: &str) -> InputOutcome {
        if self.state != SessionState::Running {
            return InputOutcome::Ignored;
        }

        let typed: Vec<char> = value.chars().collect();
        if typed.len() > self.reference.len() {
            debug!(
                len = typed.len(),
                max = self.reference.len(),
                "input longer than reference rejected"
            );
            return InputOutcome::Rejected;
        }
        if value == self.transcript {
            return InputOutcome::Unchanged;
        }

        self.transcript.clear();
        self.transcript.push_str(value);
        self.total_keystrokes += 1;
        self.error_positions = typed
            .iter()
            .zip(&self.reference)
            .enumerate()
            .filter(|(_, (t, r))| t != r)
            .map(|(i, _)| i)
            .collect();
        self.correct_keystrokes =
            (typed.len() - self.error_positions.len()).min(self.total_keystrokes);

        if typed == self.reference {
            self.complete();
            return InputOutcome::Completed;
        }
        InputOutcome::Accepted
    }

    /// One second of countdown. Returns false when not running.
    pub fn tick(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.complete();
        }
        true
    }

    /// Apply every countdown tick due by `now`. Returns how many were applied.
    pub fn advance_clock(&mut self, now: Instant) -> u32 {
        let mut applied = 0;
        while self.state == SessionState::Running && self.countdown.poll(now) {
            self.tick();
            applied += 1;
        }
        applied
    }

    fn complete(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        self.state = SessionState::Completed;
        self.countdown.disarm();

        let result = TestResult::from_counts(
            self.total_keystrokes,
            self.correct_keystrokes,
            self.duration.secs(),
            self.remaining_secs,
            self.difficulty,
            Utc::now(),
        );
        info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            duration_secs = result.duration_secs,
            difficulty = %result.difficulty,
            "test completed"
        );
        self.result = Some(result.clone());
        self.outbox = Some(result);
    }

    /// Hand the pending result to `sink`. Each result is delivered once.
    pub fn deliver<K: ResultSink + ?Sized>(&mut self, sink: &mut K) -> bool {
        match self.outbox.take() {
            Some(result) => {
                sink.submit(result);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn duration(&self) -> TestDuration {
        self.duration
    }

    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn error_positions(&self) -> &BTreeSet<usize> {
        &self.error_positions
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn configured_secs(&self) -> u32 {
        self.duration.secs()
    }

    pub fn total_keystrokes(&self) -> usize {
        self.total_keystrokes
    }

    pub fn correct_keystrokes(&self) -> usize {
        self.correct_keystrokes
    }

    pub fn live_stats(&self) -> LiveStats {
        LiveStats::compute(
            self.correct_keystrokes,
            self.total_keystrokes,
            self.duration.secs(),
            self.remaining_secs,
        )
    }

    /// Fraction of the configured time used, 0.0..=1.0.
    pub fn elapsed_ratio(&self) -> f64 {
        let configured = self.duration.secs();
        configured.saturating_sub(self.remaining_secs) as f64 / configured as f64
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.countdown.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct Fixed(&'static str);

    impl ParagraphSource for Fixed {
        fn paragraph(&mut self, _difficulty: Difficulty) -> String {
            self.0.to_string()
        }
    }

    #[derive(Default)]
    struct Collect(Vec<TestResult>);

    impl ResultSink for Collect {
        fn submit(&mut self, result: TestResult) {
            self.0.push(result);
        }
    }

    fn secs(n: u32) -> TestDuration {
        TestDuration::new(n).unwrap()
    }

    fn running(text: &'static str, duration: u32) -> SessionEngine<Fixed> {
        let mut engine = SessionEngine::new(Fixed(text));
        assert!(engine.start(Difficulty::Easy, secs(duration)));
        engine
    }

    #[test]
    fn test_custom_countdown_interval() {
        let mut engine = SessionEngine::new(Fixed("some words"))
            .with_countdown(Countdown::new(Duration::from_millis(100)));
        let t0 = Instant::now();
        engine.start_at(Difficulty::Easy, secs(30), t0);

        assert_eq!(engine.advance_clock(t0 + Duration::from_millis(99)), 0);
        assert_eq!(engine.advance_clock(t0 + Duration::from_millis(500)), 5);
        assert_eq!(engine.remaining_secs(), 25);

        engine.advance_clock(t0 + Duration::from_secs(3));
        assert_eq!(engine.state(), SessionState::Completed);
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn test_new_is_idle() {
        let engine = SessionEngine::new(Fixed("abc"));
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.remaining_secs(), 60);
        assert!(engine.reference_text().is_empty());
        assert!(!engine.is_timer_armed());
    }

    #[test]
    fn test_input_ignored_when_idle() {
        let mut engine = SessionEngine::new(Fixed("abc"));
        assert_eq!(engine.submit_input("a"), InputOutcome::Ignored);
        assert_eq!(engine.total_keystrokes(), 0);
    }

    #[test]
    fn test_start_draws_and_arms() {
        let engine = running("hello", 30);
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.reference_text(), "hello");
        assert_eq!(engine.remaining_secs(), 30);
        assert!(engine.is_timer_armed());
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut engine = running("hello", 30);
        engine.submit_input("he");
        assert!(!engine.start(Difficulty::Hard, secs(60)));
        assert_eq!(engine.transcript(), "he");
        assert_eq!(engine.difficulty(), Difficulty::Easy);
        assert_eq!(engine.configured_secs(), 30);
    }

    #[test]
    fn test_error_positions_recomputed() {
        let mut engine = running("hello", 30);
        engine.submit_input("hx");
        assert_eq!(engine.error_positions().iter().copied().collect::<Vec<_>>(), vec![1]);
        engine.submit_input("h");
        assert!(engine.error_positions().is_empty());
        engine.submit_input("xexlo");
        assert_eq!(
            engine.error_positions().iter().copied().collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn test_overlong_input_rejected() {
        let mut engine = running("abc", 30);
        engine.submit_input("ab");
        assert_eq!(engine.submit_input("abcd"), InputOutcome::Rejected);
        assert_eq!(engine.transcript(), "ab");
        assert_eq!(engine.total_keystrokes(), 1);
    }

    #[test]
    fn test_unchanged_input_not_counted() {
        let mut engine = running("abc", 30);
        engine.submit_input("a");
        assert_eq!(engine.submit_input("a"), InputOutcome::Unchanged);
        assert_eq!(engine.total_keystrokes(), 1);
    }

    #[test]
    fn test_correct_never_exceeds_total() {
        // A single paste of three correct characters is one edit event.
        let mut engine = running("abcdef", 30);
        engine.submit_input("abc");
        assert_eq!(engine.total_keystrokes(), 1);
        assert_eq!(engine.correct_keystrokes(), 1);
        assert!(engine.live_stats().accuracy <= 100);
    }

    #[test]
    fn test_multibyte_reference() {
        let mut engine = running("café", 30);
        assert_eq!(engine.submit_input("caf"), InputOutcome::Accepted);
        assert_eq!(engine.submit_input("café"), InputOutcome::Completed);
    }

    #[test]
    fn test_exact_match_completes_and_freezes_timer() {
        let mut engine = running("ab", 30);
        engine.tick();
        engine.submit_input("a");
        assert_eq!(engine.submit_input("ab"), InputOutcome::Completed);
        assert_eq!(engine.state(), SessionState::Completed);
        assert_eq!(engine.remaining_secs(), 29);
        assert!(!engine.is_timer_armed());

        assert!(!engine.tick());
        assert_eq!(engine.remaining_secs(), 29);
        assert_eq!(engine.submit_input("a"), InputOutcome::Ignored);

        let result = engine.result().unwrap();
        assert_eq!(result.duration_secs, 1);
        assert_eq!(result.accuracy, 100);
    }

    #[test]
    fn test_timer_expiry_completes() {
        let mut engine = running("a long paragraph", 3);
        engine.submit_input("a l");
        for _ in 0..3 {
            assert!(engine.tick());
        }
        assert_eq!(engine.state(), SessionState::Completed);
        assert_eq!(engine.remaining_secs(), 0);
        assert!(!engine.tick());
        assert_eq!(engine.result().unwrap().duration_secs, 3);
    }

    #[test]
    fn test_pause_freezes_clock_and_input() {
        let t0 = Instant::now();
        let mut engine = SessionEngine::new(Fixed("abcdef"));
        engine.start_at(Difficulty::Medium, secs(10), t0);
        engine.submit_input("ab");

        assert!(engine.pause());
        assert_eq!(engine.submit_input("abc"), InputOutcome::Ignored);
        assert_eq!(engine.advance_clock(t0 + Duration::from_secs(5)), 0);
        assert!(!engine.tick());
        assert_eq!(engine.remaining_secs(), 10);
        assert_eq!(engine.transcript(), "ab");
    }

    #[test]
    fn test_resume_arms_fresh_second() {
        let t0 = Instant::now();
        let mut engine = SessionEngine::new(Fixed("abcdef"));
        engine.start_at(Difficulty::Medium, secs(10), t0);
        engine.pause();

        let t1 = t0 + Duration::from_millis(5_700);
        engine.resume_at(t1);
        assert_eq!(engine.advance_clock(t1 + Duration::from_millis(999)), 0);
        assert_eq!(engine.advance_clock(t1 + Duration::from_secs(1)), 1);
        assert_eq!(engine.remaining_secs(), 9);
    }

    #[test]
    fn test_double_toggle_keeps_state() {
        let mut engine = running("abcdef", 30);
        engine.submit_input("abc");
        engine.tick();
        engine.toggle_pause();
        engine.toggle_pause();
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.remaining_secs(), 29);
        assert_eq!(engine.transcript(), "abc");
        assert_eq!(engine.total_keystrokes(), 1);
    }

    #[test]
    fn test_advance_clock_stops_at_completion() {
        let t0 = Instant::now();
        let mut engine = SessionEngine::new(Fixed("abc"));
        engine.start_at(Difficulty::Easy, secs(2), t0);
        let applied = engine.advance_clock(t0 + Duration::from_secs(10));
        assert_eq!(applied, 2);
        assert_eq!(engine.state(), SessionState::Completed);
        assert!(!engine.is_timer_armed());
    }

    #[test]
    fn test_reset_from_completed() {
        let mut engine = running("ab", 30);
        engine.submit_input("ab");
        engine.reset();
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.total_keystrokes(), 0);
        assert_eq!(engine.correct_keystrokes(), 0);
        assert!(engine.transcript().is_empty());
        assert!(engine.reference_text().is_empty());
        assert!(engine.result().is_none());
        assert_eq!(engine.remaining_secs(), 30);
    }

    #[test]
    fn test_start_from_completed_resets() {
        let mut engine = running("ab", 30);
        engine.submit_input("ab");
        assert!(engine.start(Difficulty::Hard, secs(60)));
        assert_eq!(engine.state(), SessionState::Running);
        assert!(engine.transcript().is_empty());
        assert!(engine.result().is_none());
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn test_result_delivered_once() {
        let mut engine = running("ab", 30);
        let mut sink = Collect::default();
        assert!(!engine.deliver(&mut sink));

        engine.submit_input("ab");
        assert!(engine.deliver(&mut sink));
        assert!(!engine.deliver(&mut sink));
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn test_reset_keeps_undelivered_result() {
        let mut engine = running("ab", 30);
        engine.submit_input("ab");
        engine.reset();
        let mut sink = Collect::default();
        assert!(engine.deliver(&mut sink));
        assert_eq!(sink.0[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_configure_only_when_idle() {
        let mut engine = SessionEngine::new(Fixed("abc"));
        assert!(engine.configure(Difficulty::Hard, secs(120)));
        assert_eq!(engine.remaining_secs(), 120);
        engine.start(Difficulty::Hard, secs(120));
        assert!(!engine.configure(Difficulty::Easy, secs(30)));
        assert_eq!(engine.configured_secs(), 120);
    }

    #[test]
    fn test_elapsed_ratio() {
        let mut engine = running("abc", 4);
        assert_eq!(engine.elapsed_ratio(), 0.0);
        engine.tick();
        assert!((engine.elapsed_ratio() - 0.25).abs() < f64::EPSILON);
    }
}

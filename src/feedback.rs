use std::io::{self, Write};

/// Per-keystroke cue. Implementations must not block or panic.
pub trait KeyFeedback {
    fn key_tick(&mut self);
}

/// Rings the terminal bell on stdout. Write errors are ignored.
pub struct TerminalBell<W: Write = io::Stdout> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for TerminalBell<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> KeyFeedback for TerminalBell<W> {
    fn key_tick(&mut self) {
        let _ = self.out.write_all(b"\x07");
        let _ = self.out.flush();
    }
}

pub struct Silent;

impl KeyFeedback for Silent {
    fn key_tick(&mut self) {}
}

pub fn from_config(sound: bool) -> Box<dyn KeyFeedback> {
    if sound {
        Box::new(TerminalBell::new())
    } else {
        Box::new(Silent)
    }
}

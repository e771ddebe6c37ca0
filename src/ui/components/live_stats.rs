use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::metrics::LiveStats;
use crate::ui::theme::Theme;

/// Running figures for the test in progress.
pub struct LiveStatsPanel<'a> {
    stats: LiveStats,
    remaining_secs: u32,
    total_keystrokes: usize,
    errors: usize,
    compact: bool,
    theme: &'a Theme,
}

impl<'a> LiveStatsPanel<'a> {
    pub fn new(
        stats: LiveStats,
        remaining_secs: u32,
        total_keystrokes: usize,
        errors: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            stats,
            remaining_secs,
            total_keystrokes,
            errors,
            compact: false,
            theme,
        }
    }

    /// Single-line rendering for narrow terminals.
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl Widget for LiveStatsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let label = |s: &'static str| Span::styled(s, Style::default().fg(colors.fg()));
        let wpm = Span::styled(
            self.stats.wpm.to_string(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        );
        let acc = Span::styled(
            format!("{}%", self.stats.accuracy),
            Style::default().fg(colors.accuracy_color(self.stats.accuracy)),
        );
        let time_color = if self.remaining_secs <= 10 {
            colors.warning()
        } else {
            colors.fg()
        };
        let time = Span::styled(
            format_clock(self.remaining_secs),
            Style::default().fg(time_color).add_modifier(Modifier::BOLD),
        );

        let block = Block::bordered()
            .title(" Live ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let lines = if self.compact {
            vec![Line::from(vec![
                label("WPM "),
                wpm,
                label("  Acc "),
                acc,
                label("  Time "),
                time,
                label("  Keys "),
                Span::styled(
                    self.total_keystrokes.to_string(),
                    Style::default().fg(colors.fg()),
                ),
            ])]
        } else {
            vec![
                Line::from(vec![label("WPM:      "), wpm]),
                Line::from(""),
                Line::from(vec![label("Accuracy: "), acc]),
                Line::from(""),
                Line::from(vec![label("Time:     "), time]),
                Line::from(""),
                Line::from(vec![
                    label("Keys:     "),
                    Span::styled(
                        self.total_keystrokes.to_string(),
                        Style::default().fg(colors.fg()),
                    ),
                ]),
                Line::from(vec![
                    label("Errors:   "),
                    Span::styled(
                        self.errors.to_string(),
                        Style::default().fg(if self.errors == 0 {
                            colors.success()
                        } else {
                            colors.error()
                        }),
                    ),
                ]),
            ]
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

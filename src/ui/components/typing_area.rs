use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharState {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

/// Reference text with the transcript diffed over it character by character.
pub struct TypingArea<'a> {
    reference: &'a str,
    transcript: &'a str,
    title: String,
    placeholder: Option<&'a str>,
    show_cursor: bool,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(reference: &'a str, transcript: &'a str, theme: &'a Theme) -> Self {
        Self {
            reference,
            transcript,
            title: String::new(),
            placeholder: None,
            show_cursor: true,
            theme,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Shown instead of the text when there is no reference yet.
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = Some(text);
        self
    }

    pub fn show_cursor(mut self, show: bool) -> Self {
        self.show_cursor = show;
        self
    }
}

fn classify(reference: &str, transcript: &str, show_cursor: bool) -> Vec<(char, CharState)> {
    let typed: Vec<char> = transcript.chars().collect();
    reference
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let state = match typed.get(i) {
                Some(&t) if t == ch => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None if show_cursor && i == typed.len() => CharState::Cursor,
                None => CharState::Pending,
            };
            (ch, state)
        })
        .collect()
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let mut block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        if !self.title.is_empty() {
            block = block.title(format!(" {} ", self.title));
        }

        if self.reference.is_empty() {
            let hint = self.placeholder.unwrap_or_default();
            Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(colors.text_pending()),
            )))
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
            return;
        }

        let spans: Vec<Span> = classify(self.reference, self.transcript, self.show_cursor)
            .into_iter()
            .map(|(ch, state)| {
                let style = match state {
                    CharState::Correct => Style::default().fg(colors.text_correct()),
                    CharState::Incorrect => Style::default()
                        .fg(colors.text_incorrect())
                        .bg(colors.text_incorrect_bg())
                        .add_modifier(Modifier::UNDERLINED),
                    CharState::Cursor => Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg()),
                    CharState::Pending => Style::default().fg(colors.text_pending()),
                };
                Span::styled(ch.to_string(), style)
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

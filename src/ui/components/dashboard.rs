use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::grade::{self, PerformanceGrade};
use crate::engine::leaderboard::PersonalBest;
use crate::session::TestResult;
use crate::ui::theme::Theme;

/// Result card for a finished test.
pub struct Dashboard<'a> {
    pub result: &'a TestResult,
    pub personal_best: PersonalBest,
    pub user_name: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        result: &'a TestResult,
        personal_best: PersonalBest,
        user_name: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            result,
            personal_best,
            user_name,
            theme,
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;
        let grade = PerformanceGrade::for_result(result);

        let block = Block::bordered()
            .title(" Test Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(6),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let grade_color = match grade {
            PerformanceGrade::Excellent => colors.success(),
            PerformanceGrade::Good => colors.accent(),
            PerformanceGrade::Average => colors.warning(),
            PerformanceGrade::NeedsPractice => colors.error(),
        };
        Paragraph::new(Line::from(vec![
            Span::styled(
                grade.label(),
                Style::default().fg(grade_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}, {} difficulty", self.user_name, result.difficulty.label()),
                Style::default().fg(colors.text_pending()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let best = Span::styled(
            "  \u{2605} personal best",
            Style::default()
                .fg(colors.warning())
                .add_modifier(Modifier::BOLD),
        );
        let label = |s: &'static str| Span::styled(s, Style::default().fg(colors.fg()));

        let mut speed = vec![
            label("  Speed:      "),
            Span::styled(
                format!("{} WPM", result.wpm),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} CPM)", result.cpm()),
                Style::default().fg(colors.text_pending()),
            ),
        ];
        if self.personal_best.wpm {
            speed.push(best.clone());
        }

        let mut accuracy = vec![
            label("  Accuracy:   "),
            Span::styled(
                format!("{}%", result.accuracy),
                Style::default()
                    .fg(colors.accuracy_color(result.accuracy))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}% error rate)", result.error_rate()),
                Style::default().fg(colors.text_pending()),
            ),
        ];
        if self.personal_best.accuracy {
            accuracy.push(best);
        }

        let figures = vec![
            Line::from(speed),
            Line::from(accuracy),
            Line::from(vec![
                label("  Time:       "),
                Span::styled(
                    format!("{}s", result.duration_secs),
                    Style::default().fg(colors.fg()),
                ),
            ]),
            Line::from(vec![
                label("  Keystrokes: "),
                Span::styled(
                    format!(
                        "{} total, {} correct",
                        result.total_keystrokes, result.correct_keystrokes
                    ),
                    Style::default().fg(colors.fg()),
                ),
            ]),
        ];
        Paragraph::new(figures).render(layout[1], buf);

        let mut tip_lines = vec![Line::from(Span::styled(
            "  Tips",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];
        for tip in grade::tips(result) {
            tip_lines.push(Line::from(Span::styled(
                format!("  \u{2022} {tip}"),
                Style::default().fg(colors.fg()),
            )));
        }
        Paragraph::new(tip_lines)
            .wrap(Wrap { trim: false })
            .render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [n/Enter] New test  [l] Leaderboard  [p] Progress  [t] Theme  [q] Quit",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[3], buf);
    }
}

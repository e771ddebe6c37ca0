use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Cell, Paragraph, Row, Table, Widget};

use crate::engine::leaderboard::{HistorySummary, top_results};
use crate::store::schema::ResultRecord;
use crate::ui::theme::Theme;

pub struct Leaderboard<'a> {
    records: &'a [ResultRecord],
    size: usize,
    theme: &'a Theme,
}

impl<'a> Leaderboard<'a> {
    pub fn new(records: &'a [ResultRecord], size: usize, theme: &'a Theme) -> Self {
        Self {
            records,
            size,
            theme,
        }
    }

    fn render_summary(&self, summary: &HistorySummary, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let cards = [
            ("Tests", summary.total_tests.to_string(), colors.fg()),
            ("Avg WPM", summary.avg_wpm.to_string(), colors.accent()),
            ("Best WPM", summary.best_wpm.to_string(), colors.success()),
            (
                "Avg Accuracy",
                format!("{}%", summary.avg_accuracy),
                colors.accuracy_color(summary.avg_accuracy),
            ),
            (
                "Best Accuracy",
                format!("{}%", summary.best_accuracy),
                colors.accuracy_color(summary.best_accuracy),
            ),
        ];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, cards.len() as u32); 5])
            .split(area);

        for ((title, value, color), column) in cards.into_iter().zip(columns.iter()) {
            let block = Block::bordered()
                .title(format!(" {title} "))
                .border_style(Style::default().fg(colors.border()));
            Paragraph::new(Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(block)
            .render(*column, buf);
        }
    }
}

impl Widget for Leaderboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Leaderboard ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(summary) = HistorySummary::from_records(self.records) else {
            Paragraph::new(Line::from(Span::styled(
                "No tests completed yet. Finish a test to get on the board!",
                Style::default().fg(colors.text_pending()),
            )))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(inner);

        self.render_summary(&summary, layout[0], buf);

        let header = Row::new(["#", "Name", "WPM", "Accuracy", "Difficulty", "Time", "Date"])
            .style(
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            );

        let rows: Vec<Row> = top_results(self.records, self.size)
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let r = &record.result;
                let rank_style = if i == 0 {
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)).style(rank_style),
                    Cell::from(record.user_name.clone()),
                    Cell::from(r.wpm.to_string()).style(Style::default().fg(colors.accent())),
                    Cell::from(format!("{}%", r.accuracy))
                        .style(Style::default().fg(colors.accuracy_color(r.accuracy))),
                    Cell::from(r.difficulty.label()),
                    Cell::from(format!("{}s", r.duration_secs)),
                    Cell::from(r.completed_at.format("%Y-%m-%d").to_string()),
                ])
                .style(Style::default().fg(colors.fg()))
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(6),
            Constraint::Length(10),
        ];
        Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Difficulty;
    use crate::session::TestResult;
    use chrono::Utc;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn rec(name: &str, correct: usize) -> ResultRecord {
        ResultRecord {
            user_name: name.to_string(),
            result: TestResult::from_counts(correct, correct, 60, 0, Difficulty::Easy, Utc::now()),
        }
    }

    #[test]
    fn test_empty_state_message() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        Leaderboard::new(&[], 10, &theme).render(area, &mut buf);
        let all: String = (0..10).map(|y| row_text(&buf, y)).collect();
        assert!(all.contains("No tests completed yet"));
    }

    #[test]
    fn test_fastest_listed_first() {
        let theme = Theme::default();
        let records = vec![rec("slow", 100), rec("fast", 300)];
        let area = Rect::new(0, 0, 90, 12);
        let mut buf = Buffer::empty(area);
        Leaderboard::new(&records, 10, &theme).render(area, &mut buf);

        // border, 3-line summary, table header, then first row
        let first = row_text(&buf, 5);
        let second = row_text(&buf, 6);
        assert!(first.contains("fast"), "{first}");
        assert!(second.contains("slow"), "{second}");
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph, Widget,
};

use crate::engine::trend::{DifficultyStat, TrendSeries};
use crate::ui::theme::Theme;

/// WPM and accuracy over the most recent tests.
pub struct TrendChart<'a> {
    pub series: &'a TrendSeries,
    pub theme: &'a Theme,
}

impl<'a> TrendChart<'a> {
    pub fn new(series: &'a TrendSeries, theme: &'a Theme) -> Self {
        Self { series, theme }
    }
}

fn empty_panel(title: &str, message: &str, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let colors = &theme.colors;
    Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(colors.text_pending()),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(colors.border())),
    )
    .render(area, buf);
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = "WPM & Accuracy (recent tests)";

        if self.series.is_empty() {
            empty_panel(title, "Complete a test to see your progress.", self.theme, area, buf);
            return;
        }

        let max_x = self
            .series
            .wpm
            .last()
            .map(|(x, _)| *x)
            .unwrap_or(1.0)
            .max(2.0);
        let max_y = (self.series.max_wpm() * 1.1).max(100.0).ceil();

        let datasets = vec![
            Dataset::default()
                .name("WPM")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.chart_wpm()))
                .data(&self.series.wpm),
            Dataset::default()
                .name("Accuracy %")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.chart_accuracy()))
                .data(&self.series.accuracy),
        ];

        let axis_style = Style::default().fg(colors.text_pending());
        Chart::new(datasets)
            .block(
                Block::bordered()
                    .title(format!(" {title} "))
                    .border_style(Style::default().fg(colors.border())),
            )
            .x_axis(
                Axis::default()
                    .title("Test #")
                    .style(axis_style)
                    .bounds([1.0, max_x])
                    .labels(["1".to_string(), format!("{max_x:.0}")]),
            )
            .y_axis(
                Axis::default()
                    .style(axis_style)
                    .bounds([0.0, max_y])
                    .labels(["0".to_string(), format!("{:.0}", max_y / 2.0), format!("{max_y:.0}")]),
            )
            .render(area, buf);
    }
}

/// Average WPM per difficulty.
pub struct DifficultyBars<'a> {
    pub stats: &'a [DifficultyStat],
    pub theme: &'a Theme,
}

impl<'a> DifficultyBars<'a> {
    pub fn new(stats: &'a [DifficultyStat], theme: &'a Theme) -> Self {
        Self { stats, theme }
    }
}

impl Widget for DifficultyBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = "Avg WPM by Difficulty";

        if self.stats.is_empty() {
            empty_panel(title, "No results yet.", self.theme, area, buf);
            return;
        }

        let bars: Vec<Bar> = self
            .stats
            .iter()
            .map(|s| {
                Bar::default()
                    .value(s.avg_wpm as u64)
                    .label(Line::from(format!("{} ({})", s.difficulty.label(), s.tests)))
                    .style(Style::default().fg(colors.bar_filled()))
                    .value_style(
                        Style::default()
                            .fg(colors.bg())
                            .bg(colors.bar_filled())
                            .add_modifier(Modifier::BOLD),
                    )
            })
            .collect();

        BarChart::default()
            .block(
                Block::bordered()
                    .title(format!(" {title} "))
                    .border_style(Style::default().fg(colors.border())),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(12)
            .bar_gap(3)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Difficulty;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .flat_map(|y| (area.x..area.x + area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_trend_chart_empty_state() {
        let theme = Theme::default();
        let series = TrendSeries::default();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        TrendChart::new(&series, &theme).render(area, &mut buf);
        assert!(text(&buf).contains("Complete a test"));
    }

    #[test]
    fn test_trend_chart_renders_title() {
        let theme = Theme::default();
        let series = TrendSeries {
            wpm: vec![(1.0, 40.0), (2.0, 55.0)],
            accuracy: vec![(1.0, 90.0), (2.0, 96.0)],
        };
        let area = Rect::new(0, 0, 60, 16);
        let mut buf = Buffer::empty(area);
        TrendChart::new(&series, &theme).render(area, &mut buf);
        assert!(text(&buf).contains("WPM"));
    }

    #[test]
    fn test_difficulty_bars_labels() {
        let theme = Theme::default();
        let stats = vec![DifficultyStat {
            difficulty: Difficulty::Hard,
            tests: 3,
            avg_wpm: 42,
        }];
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        DifficultyBars::new(&stats, &theme).render(area, &mut buf);
        let rendered = text(&buf);
        assert!(rendered.contains("Hard (3)"));
        assert!(rendered.contains("42"));
    }
}

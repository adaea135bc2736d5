//! Durations tab - bar chart of contest length for the current page.

use ratatui::{
    layout::{Direction, Rect},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use contestboard_core::pipeline::duration_chart;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pipeline.view();

    let block = Block::default()
        .title(format!(" Duration in hours - {} ", view.pagination_label()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if view.items.is_empty() {
        let message = if view.loading { "Loading..." } else { "Nothing to chart" };
        frame.render_widget(
            Paragraph::new(Span::styled(message, styles::muted_style())).block(block),
            area,
        );
        return;
    }

    let bars: Vec<Bar> = duration_chart(&view.items)
        .into_iter()
        .map(|bar| {
            Bar::default()
                .value(bar.hours)
                .label(Line::from(bar.label))
                .text_value(format!("{}h", bar.hours))
                .style(styles::bar_style())
                .value_style(styles::selected_style())
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

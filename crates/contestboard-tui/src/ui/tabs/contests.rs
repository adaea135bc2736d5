//! Contests tab - the paged contest table with a detail panel.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use contestboard_core::models::{phase_options, selection_label, type_options, Contest};
use contestboard_core::utils::{format_duration, format_start_time};

use crate::app::{App, AppState, Focus};
use crate::ui::styles;

const EMPTY_LOADING: &str = "Loading...";
const EMPTY_NO_MATCHES: &str = "No contests found with the given filters.";

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search and filters
            Constraint::Min(5),    // Table
            Constraint::Length(1), // Pagination
        ])
        .split(chunks[0]);

    render_filter_bar(frame, app, left[0]);
    render_contest_table(frame, app, left[1]);
    render_pagination(frame, app, left[2]);
    render_contest_detail(frame, app, chunks[1]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let criteria = app.pipeline.criteria();
    let searching = app.state == AppState::Searching;

    let search_text = app.pipeline.search_input();
    let cursor = if searching { "▌" } else { "" };
    let search_span = if search_text.is_empty() && !searching {
        Span::styled("[/] search", styles::muted_style())
    } else {
        Span::styled(format!("/{}{}", search_text, cursor), styles::search_style())
    };

    let favorites = if criteria.show_favorites_only {
        Span::styled("★ only", styles::favorite_style())
    } else {
        Span::styled("all", styles::muted_style())
    };

    let line = Line::from(vec![
        Span::raw(" "),
        search_span,
        Span::styled("  [t]ype: ", styles::muted_style()),
        Span::raw(selection_label(&type_options(), &criteria.contest_type)),
        Span::styled("  [p]hase: ", styles::muted_style()),
        Span::raw(selection_label(&phase_options(), &criteria.phase)),
        Span::styled("  [s]ort: ", styles::muted_style()),
        Span::raw(criteria.sort_key.label()),
        Span::styled("  [f]avorites: ", styles::muted_style()),
        favorites,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_contest_table(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);
    let view = app.pipeline.view();

    let block = Block::default()
        .title(format!(" Contests ({}) ", view.total_matches))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if view.items.is_empty() {
        let message = if view.loading { EMPTY_LOADING } else { EMPTY_NO_MATCHES };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([
        Cell::from(" "),
        Cell::from("Name"),
        Cell::from("Type"),
        Cell::from("Phase"),
        Cell::from("Start"),
        Cell::from("Duration"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = view
        .items
        .iter()
        .map(|contest| {
            let star = if app.pipeline.is_favorite(contest.id) {
                Span::styled("★", styles::favorite_style())
            } else {
                Span::raw(" ")
            };

            Row::new(vec![
                Cell::from(star),
                Cell::from(contest.name.as_str()),
                Cell::from(contest.contest_type.as_str()),
                Cell::from(Span::styled(
                    contest.phase.label(),
                    styles::phase_style(&contest.phase),
                )),
                Cell::from(format_start_time(contest.start_time_seconds, &Local)),
                Cell::from(format_duration(contest.duration_seconds)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(19),
        Constraint::Length(19),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pipeline.view();
    let label = view.pagination_label();
    if label.is_empty() {
        return;
    }

    let line = Line::from(vec![
        Span::styled(format!(" {} ", label), styles::muted_style()),
        Span::styled(
            format!(
                " page {}/{}  [←/→] page  [+/-] size {}",
                view.page.current_page, view.total_pages, view.page.page_size
            ),
            styles::muted_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_contest_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_contest() {
        Some(contest) => detail_lines(contest, app.pipeline.is_favorite(contest.id)),
        None => vec![Line::from(Span::styled(
            "No contest selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn detail_lines(contest: &Contest, favorite: bool) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(contest.name.clone(), styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID:       ", styles::muted_style()),
            Span::raw(contest.id.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Type:     ", styles::muted_style()),
            Span::raw(contest.contest_type.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Phase:    ", styles::muted_style()),
            Span::styled(
                contest.phase.label().to_string(),
                styles::phase_style(&contest.phase),
            ),
        ]),
        Line::from(vec![
            Span::styled("Start:    ", styles::muted_style()),
            Span::raw(format_start_time(contest.start_time_seconds, &Local)),
        ]),
        Line::from(vec![
            Span::styled("Duration: ", styles::muted_style()),
            Span::raw(format_duration(contest.duration_seconds)),
        ]),
    ];

    if contest.frozen {
        lines.push(Line::from(Span::styled(
            "Standings frozen",
            styles::highlight_style(),
        )));
    }

    lines.push(Line::from(""));
    if favorite {
        lines.push(Line::from(Span::styled(
            "★ Favorite  [space] to remove",
            styles::favorite_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "[space] add to favorites",
            styles::muted_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "View on Codeforces:",
        styles::muted_style(),
    )));
    lines.push(Line::from(Span::styled(contest.url(), styles::highlight_style())));

    lines
}

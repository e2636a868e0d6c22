use infinity_loader::{InfinityModel, LoaderState, ScrollableOption};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, Row};
use crate::keys;
use crate::theme::ResolvedTheme;
use crate::views::common::render_error;
use crate::views::spinner::spinner_frame;
use crate::views::status_bar::StatusBar;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(0),    // Feed rows
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    render_rows(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let scrollable = match &app.config.scrollable {
        ScrollableOption::Selector(selector) => selector.as_str(),
        _ => "viewport",
    };
    let direction = if app.config.reverse { "reverse" } else { "forward" };

    let line = Line::from(vec![
        Span::styled(" Infinity ", theme.active_tab_style()),
        Span::styled(format!(" {scrollable} · {direction} "), theme.dim_style()),
        Span::styled(
            state_label(app.loader_state()),
            Style::default().fg(theme.primary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_rows(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    if let Some(err) = &app.error {
        render_error(frame, err, theme, area);
        return;
    }

    let lines: Vec<Line> = app
        .visible_rows()
        .into_iter()
        .map(|row| row_to_line(row, theme))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn row_to_line<'a>(row: Row<'a>, theme: &ResolvedTheme) -> Line<'a> {
    match row {
        Row::Entry(entry) => Line::from(vec![
            Span::styled(
                format!("{:>4}. ", entry.id),
                Style::default().fg(theme.entry_id),
            ),
            Span::styled(entry.title.as_str(), Style::default().fg(theme.foreground)),
        ]),
        Row::Loader { text, complete } => {
            Line::from(Span::styled(text, theme.loader_style(complete))).centered()
        }
        Row::Blank => Line::default(),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let label = app.loader.to_string();
    let help = keys::hints()
        .iter()
        .map(|(key, action)| format!("{key} {action}"))
        .collect::<Vec<_>>()
        .join("  ");
    let loading = app
        .debug
        .running_tasks
        .first()
        .filter(|_| app.fetch.in_flight)
        .map(|task| format!("{} {}", spinner_frame(task.started_at), task.description));
    let total = app.feed().map_or(0, |feed| feed.len());

    let bar = StatusBar::new(&app.theme)
        .label(&label)
        .loading(loading.as_deref())
        .help(&help);
    let bar = if total > 0 {
        bar.position((app.scroll_top() + 1).min(total), total)
    } else {
        bar
    };
    bar.render(frame, area);
}

fn state_label(state: Option<LoaderState>) -> &'static str {
    match state {
        Some(LoaderState::Uninitialized) => "waiting",
        Some(LoaderState::Active) => "watching",
        Some(LoaderState::Destroying) => "tearing down",
        Some(LoaderState::Destroyed) => "destroyed",
        None => "unmounted",
    }
}

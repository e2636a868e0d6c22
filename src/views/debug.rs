use infinity_loader::InfinityModel;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .title(" Debug ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.foreground_dim));

    let mut lines = Vec::new();

    // Loader summary
    if let (Some(loader), Some(feed)) = (app.host.loader(app.loader), app.feed()) {
        let scrollable = loader
            .scrollable()
            .map_or_else(|| "unresolved".to_string(), |s| s.target.to_string());
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", loader.guid()),
                Style::default().fg(theme.primary),
            ),
            Span::styled(
                format!("{:?} on {scrollable} ", loader.state()),
                Style::default().fg(theme.foreground),
            ),
            Span::styled(
                format!("[{}]", loader.class_names(feed).join(" ")),
                Style::default().fg(theme.foreground_dim),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "rows {}  pages {}  loads {}  ignored {}  listeners {}",
                feed.len(),
                feed.pages_loaded(),
                app.fetch.dispatched,
                app.fetch.ignored,
                app.host.events().len(),
            ),
            Style::default().fg(theme.foreground_dim),
        )));
    }

    // Running tasks
    for task in &app.debug.running_tasks {
        let elapsed = task.started_at.elapsed();
        lines.push(Line::from(vec![
            Span::styled(
                format!("  [{}] ", task.id),
                Style::default().fg(theme.foreground_dim),
            ),
            Span::styled(&task.description, Style::default().fg(theme.foreground)),
            Span::styled(
                format!(" ({:.1?})", elapsed),
                Style::default().fg(theme.spinner),
            ),
        ]));
    }

    // Recent log entries (newest first, limit to fit area)
    let available_lines = area.height.saturating_sub(2) as usize;
    let log_lines = available_lines.saturating_sub(lines.len());

    for entry in app.debug.log.iter().rev().take(log_lines) {
        lines.push(Line::from(vec![Span::styled(
            format!("  {}", entry.message),
            Style::default().fg(theme.foreground_dim),
        )]));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Message;
    use crate::views::tests::{load_pages, render_to_string, test_app};
    use infinity_loader::LoaderConfig;

    #[test]
    fn test_debug_pane_shows_loader_summary() {
        let mut app = test_app(LoaderConfig::default(), 24);
        app.update(Message::ToggleDebug);
        load_pages(&mut app, 2);
        app.debug.log("Remounted loader infinity1");

        let output = render_to_string(80, 24, |frame| {
            crate::views::render(&app, frame);
        });

        assert!(output.contains("Debug"));
        assert!(output.contains("infinity1 Uninitialized on unresolved"));
        assert!(output.contains("[infinity-loader reached-infinity]"));
        assert!(output.contains("rows 5  pages 1"));
        assert!(output.contains("Remounted loader"));
    }
}

pub mod common;
pub mod debug;
pub mod feed;
pub mod spinner;
pub mod status_bar;


use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::app::{App, DEBUG_PANE_ROWS};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Split area for debug pane if visible
    let (main_area, debug_area) = if app.debug.visible {
        let chunks = Layout::vertical([
            Constraint::Min(0),                  // Feed
            Constraint::Length(DEBUG_PANE_ROWS), // Debug pane
        ])
        .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    feed::render(frame, app, main_area);

    if let Some(debug_area) = debug_area {
        debug::render(frame, app, debug_area);
    }
}

use crate::app::{App, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use super::{
    render_delete_confirmation, render_form, render_header, render_help_screen, render_profile,
    render_status_bar, render_story_list,
};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    match app.view {
        View::Profile => render_profile(frame, app, chunks[1]),
        _ => render_story_list(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    // Overlays (drawn last)
    if app.form.is_some() {
        render_form(frame, app, size);
    }
    if app.pending_delete.is_some() {
        render_delete_confirmation(frame, app, size);
    }
    if app.help_open {
        render_help_screen(frame, app, size);
    }
}

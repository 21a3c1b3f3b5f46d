use crate::app::{App, FormKind, View};
use crate::config::Action;
use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            if let CEvent::Key(key) = event::read()? {
                return Ok(Event::Key(key));
            }
        }
        Ok(Event::Tick)
    }
}

/// Handle a key press. Failures are shown in the status bar.
pub async fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if let Err(err) = dispatch_key(key, app).await {
        app.report(err);
    }
}

async fn dispatch_key(key: KeyEvent, app: &mut App) -> Result<()> {
    // Delete confirmation takes precedence
    if app.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete().await?,
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return Ok(());
    }

    if app.help_open {
        if let KeyCode::Esc = key.code {
            app.close_help();
        } else if app.config.keymap.action_for(&key) == Some(Action::Help) {
            app.close_help();
        }
        return Ok(());
    }

    if app.form.is_some() {
        return handle_form_input(key, app).await;
    }

    let Some(action) = app.config.keymap.action_for(&key) else {
        return Ok(());
    };

    match action {
        Action::Quit => app.quit(),
        Action::Help => app.open_help(),
        Action::Login => app.open_form(FormKind::Login)?,
        Action::Signup => app.open_form(FormKind::Signup)?,
        Action::Submit => app.open_form(FormKind::Submit)?,
        Action::Logout => app.logout().await?,
        Action::AllStories | Action::Refresh => app.set_view(View::AllStories).await?,
        Action::Favorites => app.set_view(View::Favorites).await?,
        Action::MyStories => app.set_view(View::MyStories).await?,
        Action::Profile => app.set_view(View::Profile).await?,
        Action::ToggleFavorite => app.toggle_favorite_selected().await?,
        Action::Delete => app.initiate_delete(),
        Action::Open => app.open_selected()?,
        Action::Up => app.move_cursor_up(),
        Action::Down => app.move_cursor_down(),
    }
    Ok(())
}

/// Keys go to the open form; only Enter, Esc and field navigation are special.
async fn handle_form_input(key: KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form().await?,
        KeyCode::Tab | KeyCode::Down => app.form_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form_prev_field(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => {
            // Allow AltGr combinations (CONTROL+ALT) for special characters
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(KeyModifiers::ALT)
            {
                app.form_input(c);
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_handler_creation() {
        let handler = EventHandler::new(250);
        assert_eq!(handler.tick_rate, Duration::from_millis(250));
    }
}

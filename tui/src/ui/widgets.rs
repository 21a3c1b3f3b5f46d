use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use snooze_core::models::StoryRecord;
use unicode_width::UnicodeWidthChar;

/// Render the header with the current view, the user and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Hack or Snooze | {} ", app.view.title());

    let user = match &app.session {
        Some(session) => format!(" {} ", session.username()),
        None => " not logged in ".to_string(),
    };

    let key_hints = if app.form.is_some() {
        " [Enter:Send] [Tab:Next field] [Esc:Cancel] "
    } else if app.is_logged_in() {
        " [1:All] [2:Favorites] [3:Mine] [4:Profile] [s:Submit] [f:Fav] [d:Delete] [Ctrl+L:Logout] [h:Help] [q:Quit] "
    } else {
        " [l:Login] [c:Create account] [r:Refresh] [Enter:Open] [h:Help] [q:Quit] "
    };

    let header_spans = vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("|"),
        Span::styled(user, Style::default().fg(Color::Yellow)),
        Span::raw("|"),
        Span::styled(key_hints, Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

/// Render the stories of the current view
pub fn render_story_list(frame: &mut Frame, app: &App, area: Rect) {
    let stories = app.visible_stories();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", app.view.title(), stories.len()));

    if stories.is_empty() {
        let message = match app.view {
            View::Favorites => "No favorites added!",
            View::MyStories => "No stories added by user yet!",
            _ => "No stories to show. Press 'r' to refresh.",
        };
        let empty = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(40).max(10);
    let items: Vec<ListItem> = stories
        .iter()
        .map(|story| ListItem::new(story_line(app, story, title_width)))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut state);
}

fn story_line(app: &App, story: &StoryRecord, title_width: usize) -> Line<'static> {
    let mut spans = Vec::new();

    if let Some(session) = &app.session {
        let star = if session.is_favorite(story.id()) { "★ " } else { "☆ " };
        spans.push(Span::styled(star, Style::default().fg(Color::Yellow)));
    }

    spans.push(Span::styled(
        truncate(story.title(), title_width),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(
        format!(" by {}", story.author()),
        Style::default().fg(Color::Gray),
    ));
    spans.push(Span::styled(
        format!(" ({})", story.hostname()),
        Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
        format!(" posted by {}", story.posted_by()),
        Style::default().fg(Color::DarkGray),
    ));

    Line::from(spans)
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`
fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        used += w;
        out.push(c);
    }
    out
}

/// Render the logged-in user's profile
pub fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.session {
        Some(session) => vec![
            Line::from(""),
            Line::from(format!("Name: {}", session.name())),
            Line::from(format!("Username: {}", session.username())),
            Line::from(format!("Account Created: {}", session.created_date())),
            Line::from(""),
            Line::from(format!(
                "{} stories submitted, {} favorites",
                session.own_stories().len(),
                session.favorites().len()
            )),
        ],
        None => vec![Line::from("Not logged in")],
    };

    let profile = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" User Profile "))
        .style(Style::default().fg(Color::White));

    frame.render_widget(profile, area);
}

/// Render the status bar: the last message, or a story count
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.status {
        Some(status) if status.is_error => (
            format!(" {} ", status.text),
            Style::default().bg(Color::Red).fg(Color::White),
        ),
        Some(status) => (
            format!(" {} ", status.text),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        None => (
            format!(" {} stories | [h:Help] ", app.stories.len()),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
    };

    let status_bar = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

/// Render the open login / signup / submit form
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let popup_width = 60.min(area.width);
    let popup_height = (form.fields.len() as u16 * 2 + 3).min(area.height);
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let shown = if field.secret {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let focused = i == form.focus;
        let value = if focused { format!("{}▊", shown) } else { shown };
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>9}: ", field.label), label_style),
            Span::raw(value),
        ]));
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} (Enter:Send | Esc:Cancel) ", form.title()))
            .style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

pub fn render_delete_confirmation(frame: &mut Frame, app: &App, area: Rect) {
    let popup_width = 60.min(area.width);
    let popup_height = 5;

    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let title = app
        .selected_story()
        .map(|s| s.title().to_string())
        .unwrap_or_else(|| "this story".to_string());
    let text = format!("Delete \"{}\"? (y/n)", title);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title("Confirm Deletion")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area); // This clears the area behind the popup
    frame.render_widget(paragraph, popup_area);
}

/// Render the help screen overlay
pub fn render_help_screen(frame: &mut Frame, app: &App, size: Rect) {
    let keymap = &app.config.keymap;
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let entry = |key: &str, what: &str| Line::from(format!("{:<12} {}", key, what));

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("Browsing", heading)),
        entry(&format!("{}/{}", keymap.cursor_up, keymap.cursor_down), "Move selection"),
        entry(&keymap.open, "Open story in browser"),
        entry(&keymap.all_stories, "All stories (re-fetch)"),
        entry(&keymap.refresh, "Refresh stories"),
        Line::from(""),
        Line::from(Span::styled("Account", heading)),
        entry(&keymap.login, "Log in"),
        entry(&keymap.signup, "Create account"),
        entry(&keymap.logout, "Log out"),
        entry(&keymap.profile, "Profile"),
        Line::from(""),
        Line::from(Span::styled("Stories", heading)),
        entry(&keymap.submit, "Submit a story"),
        entry(&keymap.favorites, "Favorites"),
        entry(&keymap.my_stories, "My stories"),
        entry(&keymap.toggle_favorite, "Toggle favorite"),
        entry(&keymap.delete, "Delete (My stories only)"),
        Line::from(""),
        entry(&keymap.help, "Show this help"),
        entry(&keymap.quit, "Quit application"),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'h' or 'Esc' to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup_width = 60.min(size.width);
    let popup_height = (help_text.len() as u16 + 2).min(size.height);
    let x = (size.width.saturating_sub(popup_width)) / 2;
    let y = (size.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help - Keyboard Shortcuts ")
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

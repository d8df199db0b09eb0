mod browse;
mod form;
mod results;
mod view;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, ModeKind, Selection};
use super::event::AppEvent;
use super::scheduler::Operation;

pub use results::apply_completion;

/// Route one event from the queue. Every event is handled to completion
/// before the next one is read.
pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(w, h) => app.resize(w, h),
        AppEvent::Completed(completion) => apply_completion(app, completion),
        AppEvent::InputFailed(e) => {
            tracing::error!(error = %e, "input lost, shutting down");
            app.input_failure = Some(e);
            app.should_quit = true;
        }
    }
}

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    app.status = None;

    let key = normalize_key(key);
    match app.mode.kind() {
        ModeKind::Browsing => browse::handle_browse(app, key),
        ModeKind::Adding => form::handle_adding(app, key),
        ModeKind::Viewing => view::handle_viewing(app, key),
        ModeKind::Editing => form::handle_editing(app, key),
    }
}

/// Bracketed paste goes to the focused field in Adding/Editing, or to the
/// filter query while it is being typed
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(session) = app.mode.session_mut() {
        if !session.is_pending() {
            session.error = None;
            session.form.insert_str(text);
        }
        return;
    }
    if app.mode.kind() == ModeKind::Browsing
        && app.list.filter_state() == super::list::FilterState::Editing
    {
        for c in text.chars().filter(|c| !c.is_control()) {
            app.list.push_filter_char(c);
        }
    }
}

/// Schedule ending the selected activity if it is still running
pub(super) fn end_activity(app: &mut App, selection: Selection) {
    let Some(record) = app.resolve(&selection) else {
        return;
    };
    if !record.is_open() {
        app.status = Some(format!("{} has already ended", record.id));
        return;
    }
    tracing::debug!(id = %selection.id, "ending activity");
    app.schedule(Operation::Finish { id: selection.id });
}

/// Normalize Shift+letter to the uppercase char so `G` matches either way
/// terminals report it
pub(super) fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

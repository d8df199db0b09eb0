use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, EditOrigin, FormSession, Mode};
use crate::tui::list::FilterState;
use crate::tui::scheduler::Operation;

pub(super) fn handle_browse(app: &mut App, key: KeyEvent) {
    if app.list.filter_state() == FilterState::Editing {
        handle_filter_input(app, key);
        return;
    }

    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => app.should_quit = true,

        (_, KeyCode::Char('a')) => {
            app.mode = Mode::Adding(FormSession::new());
        }
        (_, KeyCode::Char('s')) => {
            app.mode = Mode::Adding(FormSession::for_start());
        }
        (_, KeyCode::Char('x')) => {
            if let Some(selection) = app.list_selection() {
                super::end_activity(app, selection);
            }
        }
        (_, KeyCode::Enter | KeyCode::Char('v')) => open_selected(app),
        (_, KeyCode::Char('e')) => edit_selected(app),
        (_, KeyCode::Char('r')) => {
            app.schedule(Operation::Fetch);
            app.status = Some("Refreshing\u{2026}".into());
        }

        // Filter
        (_, KeyCode::Char('/')) => app.list.start_filter(),
        (_, KeyCode::Esc) => {
            if app.list.filter_state() == FilterState::Applied {
                app.list.clear_filter();
            }
        }

        // Navigation
        (_, KeyCode::Down | KeyCode::Char('j')) => app.list.move_down(),
        (_, KeyCode::Up | KeyCode::Char('k')) => app.list.move_up(),
        (_, KeyCode::PageDown | KeyCode::Right | KeyCode::Char('l')) => app.list.next_page(),
        (_, KeyCode::PageUp | KeyCode::Left | KeyCode::Char('h')) => app.list.prev_page(),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => app.list.next_page(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.list.prev_page(),
        (_, KeyCode::Home | KeyCode::Char('g')) => app.list.first(),
        (_, KeyCode::End | KeyCode::Char('G')) => app.list.last(),

        _ => {}
    }
}

fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.list.accept_filter(),
        KeyCode::Esc => app.list.clear_filter(),
        KeyCode::Backspace => {
            if app.list.filter().is_empty() {
                app.list.clear_filter();
            } else {
                app.list.pop_filter_char();
            }
        }
        KeyCode::Down => app.list.move_down(),
        KeyCode::Up => app.list.move_up(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.list.push_filter_char(c);
        }
        _ => {}
    }
}

/// Browsing → Viewing when the cursor is on a record
fn open_selected(app: &mut App) {
    let Some(selection) = app.list_selection() else {
        return;
    };
    let Some(index) = app.resolve_index(&selection) else {
        return;
    };
    app.viewport.show_record(&app.records[index]);
    app.mode = Mode::Viewing(selection);
}

/// Browsing → Editing when the cursor is on a record
fn edit_selected(app: &mut App) {
    let Some(selection) = app.list_selection() else {
        return;
    };
    let Some(record) = app.resolve(&selection) else {
        return;
    };
    let session = FormSession::for_record(record);
    app.mode = Mode::Editing {
        selection,
        origin: EditOrigin::Browsing,
        session,
    };
}

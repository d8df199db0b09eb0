use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, EditOrigin, FormSession, Mode};

pub(super) fn handle_viewing(app: &mut App, key: KeyEvent) {
    let Mode::Viewing(selection) = app.mode else {
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc | KeyCode::Char('q')) => {
            app.viewport.clear();
            app.mode = Mode::Browsing;
        }
        (_, KeyCode::Char('e')) => {
            let Some(record) = app.resolve(&selection) else {
                return;
            };
            let session = FormSession::for_record(record);
            app.mode = Mode::Editing {
                selection,
                origin: EditOrigin::Viewing,
                session,
            };
        }
        (_, KeyCode::Char('x')) => super::end_activity(app, selection),

        (_, KeyCode::Down | KeyCode::Char('j')) => app.viewport.scroll_down(1),
        (_, KeyCode::Up | KeyCode::Char('k')) => app.viewport.scroll_up(1),
        (_, KeyCode::PageDown | KeyCode::Char(' ')) => app.viewport.page_down(),
        (_, KeyCode::PageUp) => app.viewport.page_up(),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => app.viewport.page_down(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.viewport.page_up(),
        (_, KeyCode::Home | KeyCode::Char('g')) => app.viewport.top(),
        (_, KeyCode::End | KeyCode::Char('G')) => app.viewport.bottom(),

        _ => {}
    }
}

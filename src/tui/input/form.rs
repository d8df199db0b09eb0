use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, EditOrigin, FormSession, Mode};
use crate::tui::scheduler::Operation;

/// Structural outcome of a key routed to a form session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    /// Handled inside the form
    Stay,
    Cancel,
    /// Advance on the last field
    Commit,
}

pub(super) fn handle_adding(app: &mut App, key: KeyEvent) {
    let Mode::Adding(session) = &mut app.mode else {
        return;
    };
    let draft = match route_form_key(session, key) {
        FormAction::Stay => return,
        FormAction::Cancel => {
            app.mode = Mode::Browsing;
            return;
        }
        FormAction::Commit => match session.form.draft() {
            Ok(draft) => draft,
            Err(e) => {
                tracing::debug!(error = %e, "add form rejected");
                session.error = Some(e.to_string());
                return;
            }
        },
    };

    let ticket = app.issue_ticket();
    let Mode::Adding(session) = &mut app.mode else {
        return;
    };
    session.pending = Some(ticket);
    let op = if session.open {
        Operation::Start { draft, ticket }
    } else {
        Operation::Insert { draft, ticket }
    };
    app.schedule(op);
}

pub(super) fn handle_editing(app: &mut App, key: KeyEvent) {
    let Mode::Editing {
        selection,
        origin,
        session,
    } = &mut app.mode
    else {
        return;
    };
    let (selection, origin) = (*selection, *origin);

    let draft = match route_form_key(session, key) {
        FormAction::Stay => return,
        FormAction::Cancel => {
            match origin {
                EditOrigin::Viewing => match app.resolve_index(&selection) {
                    Some(index) => {
                        app.viewport.show_record(&app.records[index]);
                        app.mode = Mode::Viewing(selection);
                    }
                    None => app.mode = Mode::Browsing,
                },
                EditOrigin::Browsing => app.mode = Mode::Browsing,
            }
            return;
        }
        FormAction::Commit => match session.form.draft() {
            Ok(draft) => draft,
            Err(e) => {
                tracing::debug!(id = %selection.id, error = %e, "edit form rejected");
                session.error = Some(e.to_string());
                return;
            }
        },
    };

    let ticket = app.issue_ticket();
    if let Some(session) = app.mode.session_mut() {
        session.pending = Some(ticket);
    }
    app.schedule(Operation::Update {
        id: selection.id,
        draft,
        ticket,
    });
}

/// Apply a key to a form session. Navigation and cancel always work; field
/// input and commit are ignored while the session has an operation pending.
fn route_form_key(session: &mut FormSession, key: KeyEvent) -> FormAction {
    session.error = None;
    let form = &mut session.form;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::BackTab => form.focus_prev(),
        KeyCode::Up => form.focus_prev(),
        KeyCode::Down => form.focus_next(),
        KeyCode::Enter | KeyCode::Tab => {
            if session.pending.is_some() {
                return FormAction::Stay;
            }
            if form.is_last_focused() {
                return FormAction::Commit;
            }
            form.focus_next();
        }
        _ if session.is_pending() => {}
        _ => edit_field(session, key.code, ctrl, alt),
    }
    FormAction::Stay
}

/// Forward a non-structural key to the focused field
fn edit_field(session: &mut FormSession, code: KeyCode, ctrl: bool, alt: bool) {
    let form = &mut session.form;
    match code {
        KeyCode::Char('a') if ctrl => form.move_home(),
        KeyCode::Char('e') if ctrl => form.move_end(),
        KeyCode::Char('u') if ctrl => form.kill_to_start(),
        KeyCode::Char('w') if ctrl => form.delete_word_back(),
        KeyCode::Char('b') if alt => form.word_left(),
        KeyCode::Char('f') if alt => form.word_right(),
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(c) => form.insert_char(c),
        KeyCode::Backspace if alt || ctrl => form.delete_word_back(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Delete => form.delete(),
        KeyCode::Left if alt || ctrl => form.word_left(),
        KeyCode::Right if alt || ctrl => form.word_right(),
        KeyCode::Left => form.move_left(),
        KeyCode::Right => form.move_right(),
        KeyCode::Home => form.move_home(),
        KeyCode::End => form.move_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UiConfig;
    use crate::tui::scheduler::Ticket;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn session_with(values: &[&str]) -> FormSession {
        let mut s = FormSession::new();
        for (i, v) in values.iter().enumerate() {
            s.form.set_value(i, v);
        }
        s
    }

    #[test]
    fn test_advance_moves_focus_until_last() {
        let mut s = FormSession::new();
        for expected in 1..5 {
            assert_eq!(route_form_key(&mut s, key(KeyCode::Enter)), FormAction::Stay);
            assert_eq!(s.form.focus_index(), expected);
        }
        assert_eq!(route_form_key(&mut s, key(KeyCode::Tab)), FormAction::Commit);
    }

    #[test]
    fn test_back_tab_and_arrows_move_focus() {
        let mut s = FormSession::new();
        route_form_key(&mut s, key(KeyCode::Down));
        route_form_key(&mut s, key(KeyCode::Down));
        assert_eq!(s.form.focus_index(), 2);
        route_form_key(&mut s, key(KeyCode::BackTab));
        route_form_key(&mut s, key(KeyCode::Up));
        route_form_key(&mut s, key(KeyCode::Up));
        assert_eq!(s.form.focus_index(), 0);
    }

    #[test]
    fn test_pending_blocks_input_and_commit_but_not_cancel() {
        let mut s = session_with(&["x", "", "", "", "1"]);
        s.form.focus(4);
        s.pending = Some(Ticket(1));
        assert_eq!(route_form_key(&mut s, key(KeyCode::Char('9'))), FormAction::Stay);
        assert_eq!(s.form.value(4), Some("1"));
        assert_eq!(route_form_key(&mut s, key(KeyCode::Enter)), FormAction::Stay);
        assert_eq!(route_form_key(&mut s, key(KeyCode::Esc)), FormAction::Cancel);
    }

    #[test]
    fn test_any_key_clears_validation_error() {
        let mut s = FormSession::new();
        s.error = Some("bad".into());
        route_form_key(&mut s, key(KeyCode::Char('x')));
        assert!(s.error.is_none());
    }

    #[test]
    fn test_control_keys_edit_without_inserting() {
        let mut s = session_with(&["hello world"]);
        route_form_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        assert_eq!(s.form.value(0), Some("hello "));
        route_form_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
        );
        assert_eq!(s.form.value(0), Some("hello "));
        route_form_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        assert_eq!(s.form.value(0), Some(""));
    }

    #[test]
    fn test_structural_letters_are_field_input() {
        // 'q', 'a', 'e' are commands in Browsing, plain text in a form
        let mut s = FormSession::new();
        for c in "qae/".chars() {
            route_form_key(&mut s, key(KeyCode::Char(c)));
        }
        assert_eq!(s.form.value(0), Some("qae/"));
    }

    #[test]
    fn test_each_commit_gets_a_fresh_ticket() {
        let mut app = App::new(&UiConfig::default());
        app.mode = Mode::Adding(session_with(&["A", "", "", "", "60"]));
        if let Some(s) = app.mode.session_mut() {
            s.form.focus(4);
        }
        handle_adding(&mut app, key(KeyCode::Enter));
        let Mode::Adding(first) = &app.mode else {
            panic!("left Adding");
        };
        assert_eq!(first.pending, Some(Ticket(1)));

        app.mode = Mode::Adding(session_with(&["B", "", "", "", "60"]));
        if let Some(s) = app.mode.session_mut() {
            s.form.focus(4);
        }
        handle_adding(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode.session().and_then(|s| s.pending), Some(Ticket(2)));
        assert!(matches!(
            app.commands.as_slice(),
            [
                Operation::Insert { ticket: Ticket(1), .. },
                Operation::Insert { ticket: Ticket(2), .. }
            ]
        ));
    }

    #[test]
    fn test_start_session_commits_as_start() {
        let mut app = App::new(&UiConfig::default());
        let mut session = FormSession::for_start();
        session.form.set_value(0, "Deep work");
        session.form.focus(4);
        app.mode = Mode::Adding(session);
        handle_adding(&mut app, key(KeyCode::Enter));
        assert!(matches!(
            app.commands.as_slice(),
            [Operation::Start { draft, ticket: Ticket(1) }] if draft.name == "Deep work"
        ));
    }
}

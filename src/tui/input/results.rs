use crate::model::{Record, format_duration};
use crate::store::StoreError;
use crate::tui::app::{App, Mode};
use crate::tui::scheduler::{Completion, Operation, Ticket};

/// Fold an operation result into controller state.
///
/// Fetch results only change the mode when the record being viewed is gone.
/// Insert and update results move back to Browsing only when the form
/// session holding their ticket still owns the screen; a result for a
/// session the user already left just refreshes data.
pub fn apply_completion(app: &mut App, completion: Completion) {
    app.in_flight = app.in_flight.saturating_sub(1);

    match completion {
        Completion::Fetched(Ok(records)) => apply_fetch(app, records),
        Completion::Fetched(Err(e)) => record_failure(app, "fetch", &e),

        Completion::Inserted {
            ticket,
            result: Ok(record),
        } => {
            if let Mode::Adding(session) = &app.mode
                && session.awaits(ticket)
            {
                app.mode = Mode::Browsing;
            }
            let verb = if record.is_open() { "Started" } else { "Added" };
            tracing::info!(id = %record.id, open = record.is_open(), "activity added");
            app.error = None;
            app.status = Some(format!("{verb} {} {}", record.id, record.name));
            app.schedule(Operation::Fetch);
        }
        Completion::Inserted {
            ticket,
            result: Err(e),
        } => {
            if let Mode::Adding(session) = &mut app.mode
                && session.awaits(ticket)
            {
                session.pending = None;
                session.error = Some(e.to_string());
            }
            record_failure(app, "insert", &e);
        }

        Completion::Updated {
            id,
            ticket,
            result: Ok(record),
        } => {
            if owns_update(&app.mode, ticket) {
                app.viewport.clear();
                app.mode = Mode::Browsing;
            }
            tracing::info!(id = %id, "activity updated");
            app.error = None;
            app.status = Some(format!("Saved {} {}", record.id, record.name));
            app.schedule(Operation::Fetch);
        }
        Completion::Updated {
            id,
            ticket,
            result: Err(e),
        } => {
            if owns_update(&app.mode, ticket)
                && let Some(session) = app.mode.session_mut()
            {
                session.pending = None;
                session.error = Some(e.to_string());
            }
            tracing::debug!(id = %id, "update rejected");
            record_failure(app, "update", &e);
        }

        Completion::Finished { id, result: Ok(record) } => {
            tracing::info!(id = %id, duration_secs = record.duration_secs, "activity ended");
            app.error = None;
            app.status = Some(format!(
                "Ended {} {} ({})",
                record.id,
                record.name,
                format_duration(record.duration_secs)
            ));
            app.schedule(Operation::Fetch);
        }
        Completion::Finished { id, result: Err(e) } => {
            tracing::debug!(id = %id, "end rejected");
            record_failure(app, "end", &e);
        }
    }
}

/// True when the Editing session on screen holds `ticket`
fn owns_update(mode: &Mode, ticket: Ticket) -> bool {
    matches!(mode, Mode::Editing { session, .. } if session.awaits(ticket))
}

fn apply_fetch(app: &mut App, records: Vec<Record>) {
    tracing::debug!(count = records.len(), "records fetched");
    app.records = records;
    app.list.set_records(&app.records);
    app.error = None;

    // Refresh selection hints and the record on screen
    match &mut app.mode {
        Mode::Viewing(selection) => {
            match app.records.iter().position(|r| r.id == selection.id) {
                Some(index) => {
                    selection.index = index;
                    let offset = app.viewport.offset();
                    app.viewport.show_record(&app.records[index]);
                    app.viewport.scroll_down(offset);
                }
                None => {
                    tracing::warn!(id = %selection.id, "viewed record no longer exists");
                    app.status = Some(format!("{} no longer exists", selection.id));
                    app.viewport.clear();
                    app.mode = Mode::Browsing;
                }
            }
        }
        Mode::Editing { selection, .. } => {
            if let Some(index) = app.records.iter().position(|r| r.id == selection.id) {
                selection.index = index;
            }
        }
        Mode::Browsing | Mode::Adding(_) => {}
    }
}

fn record_failure(app: &mut App, op: &str, error: &StoreError) {
    tracing::error!(op, error = %error, "store operation failed");
    app.error = Some(format!("{op} failed: {error}"));
}

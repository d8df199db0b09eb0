use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;

use worklog::model::{Draft, Record, RecordId, UiConfig};
use worklog::store::{MemoryStore, RecordStore};
use worklog::tui::app::{App, Mode, ModeKind};
use worklog::tui::event::{AppEvent, EventQueue};
use worklog::tui::input::{apply_completion, handle_event, handle_key};
use worklog::tui::scheduler::{Completion, Operation, Scheduler, Ticket, execute};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn record(id: i64, name: &str, started_at: NaiveDateTime) -> Record {
    Record {
        id: RecordId(id),
        name: name.into(),
        description: format!("About {name}"),
        project: "ProjectX".into(),
        notes: String::new(),
        duration_secs: 600,
        started_at,
        ended_at: Some(started_at),
    }
}

fn fixed_store(records: Vec<Record>) -> MemoryStore {
    MemoryStore::with_records(records).with_clock(Arc::new(|| at(5, 12)))
}

fn press(app: &mut App, code: KeyCode) {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Run every queued operation synchronously, feeding results back in,
/// until the controller stops asking for more
fn settle(app: &mut App, store: &dyn RecordStore) {
    loop {
        let ops = app.take_commands();
        if ops.is_empty() {
            break;
        }
        for op in ops {
            let completion = execute(store, op);
            handle_event(app, AppEvent::Completed(completion));
        }
    }
}

fn started_app(store: &dyn RecordStore) -> App {
    let mut app = App::new(&UiConfig::default());
    handle_event(&mut app, AppEvent::Resize(80, 24));
    app.start();
    settle(&mut app, store);
    app
}

/// Structural checks that hold after every event
fn assert_consistent(app: &App) {
    match app.mode.kind() {
        ModeKind::Adding | ModeKind::Editing => assert!(app.mode.session().is_some()),
        ModeKind::Browsing | ModeKind::Viewing => assert!(app.mode.session().is_none()),
    }
    if let Mode::Viewing(selection) = &app.mode {
        assert!(app.resolve(selection).is_some(), "viewing an unknown record");
    }
    if let Some(session) = app.mode.session() {
        assert!(session.form.focus_index() < session.form.len());
    }
}

#[test]
fn test_startup_fetches_and_lists_most_recent_first() {
    let store = fixed_store(vec![
        record(1, "B", at(1, 9)),
        record(2, "A", at(2, 9)),
        record(3, "C", at(1, 8)),
    ]);
    let app = started_app(&store);
    assert_eq!(app.mode, Mode::Browsing);
    assert!(!app.is_loading());
    let titles: Vec<&str> = app.list.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert_eq!(store.calls(), vec!["list"]);
}

#[test]
fn test_add_commits_once_after_last_field() {
    let store = fixed_store(vec![]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.mode.kind(), ModeKind::Adding);

    let values = ["Write spec", "Design doc", "ProjectX", "n/a"];
    for value in values {
        type_str(&mut app, value);
        press(&mut app, KeyCode::Enter);
        assert!(app.take_commands().is_empty(), "committed before the last field");
    }
    type_str(&mut app, "3600");
    press(&mut app, KeyCode::Enter);

    let ops = app.take_commands();
    assert_eq!(
        ops,
        vec![Operation::Insert {
            draft: Draft {
                name: "Write spec".into(),
                description: "Design doc".into(),
                project: "ProjectX".into(),
                notes: "n/a".into(),
                duration_secs: 3600,
            },
            ticket: Ticket(1),
        }]
    );
    assert!(app.mode.session().is_some_and(|s| s.is_pending()));

    // Enter again while pending does not resubmit
    press(&mut app, KeyCode::Enter);
    assert!(app.take_commands().is_empty());

    for op in ops {
        handle_event(&mut app, AppEvent::Completed(execute(&store, op)));
    }
    settle(&mut app, &store);

    assert_eq!(app.mode, Mode::Browsing);
    assert_eq!(app.status.as_deref(), Some("Added #1 Write spec"));
    assert_eq!(app.list.items().len(), 1);
    assert_eq!(app.list.items()[0].title, "Write spec");
    assert_eq!(store.calls(), vec!["list", "insert", "list"]);
    assert_eq!(store.snapshot()[0].started_at, at(5, 12));
}

#[test]
fn test_invalid_duration_blocks_commit() {
    let store = fixed_store(vec![]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('a'));
    type_str(&mut app, "Write spec");
    for _ in 0..4 {
        press(&mut app, KeyCode::Tab);
    }
    type_str(&mut app, "abc");
    press(&mut app, KeyCode::Enter);

    assert!(app.take_commands().is_empty());
    let session = app.mode.session().unwrap();
    assert!(session.error.as_deref().unwrap().contains("duration"));
    assert!(!session.is_pending());
    assert_eq!(app.mode.kind(), ModeKind::Adding);

    for _ in 0..3 {
        press(&mut app, KeyCode::Backspace);
    }
    type_str(&mut app, "3600");
    press(&mut app, KeyCode::Enter);
    let ops = app.take_commands();
    assert_eq!(ops.len(), 1);
    assert!(matches!(&ops[0], Operation::Insert { draft, .. } if draft.duration_secs == 3600));
}

#[test]
fn test_fetch_result_leaves_open_form_alone() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9))]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('a'));
    type_str(&mut app, "Draft title");
    press(&mut app, KeyCode::Tab);
    let before = app.mode.clone();

    let fetched = vec![record(1, "Write spec", at(1, 9)), record(2, "Other", at(2, 9))];
    apply_completion(&mut app, Completion::Fetched(Ok(fetched)));
    assert_eq!(app.mode, before);
    assert_eq!(app.list.items().len(), 2);

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('e'));
    assert_eq!(app.mode.kind(), ModeKind::Editing);
    let before = app.mode.clone();
    apply_completion(&mut app, Completion::Fetched(Ok(vec![record(2, "Other", at(2, 9))])));
    assert_eq!(app.mode, before);
}

#[test]
fn test_cancelling_an_edit_schedules_nothing() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9))]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('e'));
    type_str(&mut app, " changed");
    press(&mut app, KeyCode::Esc);

    assert_eq!(app.mode, Mode::Browsing);
    assert!(app.take_commands().is_empty());
    assert!(!store.calls().contains(&"update"));
    assert_eq!(store.snapshot()[0].name, "Write spec");
}

#[test]
fn test_edit_from_view_saves_and_returns_to_browsing() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9))]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode.kind(), ModeKind::Viewing);
    press(&mut app, KeyCode::Char('e'));
    assert_eq!(app.mode.kind(), ModeKind::Editing);

    // Jump to duration, replace it
    for _ in 0..4 {
        press(&mut app, KeyCode::Down);
    }
    handle_key(
        &mut app,
        KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
    );
    type_str(&mut app, "7200");
    press(&mut app, KeyCode::Enter);

    let ops = app.take_commands();
    assert!(matches!(
        &ops[..],
        [Operation::Update { id: RecordId(1), draft, .. }] if draft.duration_secs == 7200
    ));
    for op in ops {
        handle_event(&mut app, AppEvent::Completed(execute(&store, op)));
    }
    settle(&mut app, &store);

    assert_eq!(app.mode, Mode::Browsing);
    assert_eq!(app.status.as_deref(), Some("Saved #1 Write spec"));
    assert_eq!(app.records[0].duration_secs, 7200);
    assert_eq!(store.snapshot()[0].started_at, at(1, 9));
}

#[test]
fn test_cancel_edit_from_view_returns_to_view() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9))]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('v'));
    press(&mut app, KeyCode::Char('e'));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode.kind(), ModeKind::Viewing);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, Mode::Browsing);
}

#[test]
fn test_store_failure_shows_error_until_next_success() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9))]);
    let mut app = started_app(&store);

    store.fail_next("disk on fire");
    press(&mut app, KeyCode::Char('r'));
    settle(&mut app, &store);
    let error = app.error.clone().unwrap();
    assert!(error.starts_with("fetch failed"));
    assert!(error.contains("disk on fire"));
    assert_eq!(app.mode, Mode::Browsing);
    // Previous data is kept
    assert_eq!(app.list.items().len(), 1);

    press(&mut app, KeyCode::Char('r'));
    settle(&mut app, &store);
    assert!(app.error.is_none());
}

#[test]
fn test_failed_insert_keeps_the_form_open() {
    let store = fixed_store(vec![]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('a'));
    type_str(&mut app, "Write spec");
    for _ in 0..4 {
        press(&mut app, KeyCode::Enter);
    }
    type_str(&mut app, "60");
    store.fail_next("read-only");
    press(&mut app, KeyCode::Enter);
    settle(&mut app, &store);

    assert_eq!(app.mode.kind(), ModeKind::Adding);
    let session = app.mode.session().unwrap();
    assert!(!session.is_pending());
    assert!(session.error.as_deref().unwrap().contains("read-only"));
    assert_eq!(session.form.value(0), Some("Write spec"));
    assert!(store.snapshot().is_empty());
}

/// Fill the add form with a name and a duration, then commit it
fn commit_add(app: &mut App, name: &str, duration: &str) -> Vec<Operation> {
    press(app, KeyCode::Char('a'));
    type_str(app, name);
    for _ in 0..4 {
        press(app, KeyCode::Tab);
    }
    type_str(app, duration);
    press(app, KeyCode::Enter);
    app.take_commands()
}

#[test]
fn test_stale_insert_result_does_not_close_newer_form() {
    let store = fixed_store(vec![]);
    let mut app = started_app(&store);

    let first = commit_add(&mut app, "First", "60");
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, Mode::Browsing);
    let second = commit_add(&mut app, "Second", "60");
    assert_eq!(app.mode.session().and_then(|s| s.pending), Some(Ticket(2)));

    // The abandoned commit lands first and must not resolve the new form
    for op in first {
        handle_event(&mut app, AppEvent::Completed(execute(&store, op)));
    }
    assert_eq!(app.mode.kind(), ModeKind::Adding);
    assert_eq!(app.status.as_deref(), Some("Added #1 First"));

    store.fail_next("read-only");
    for op in second {
        handle_event(&mut app, AppEvent::Completed(execute(&store, op)));
    }
    settle(&mut app, &store);

    assert_eq!(app.mode.kind(), ModeKind::Adding);
    let session = app.mode.session().unwrap();
    assert!(!session.is_pending());
    assert!(session.error.as_deref().unwrap().contains("read-only"));
    assert_eq!(session.form.value(0), Some("Second"));
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn test_invalid_duration_blocks_edit_commit() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9))]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('e'));
    for _ in 0..4 {
        press(&mut app, KeyCode::Down);
    }
    handle_key(
        &mut app,
        KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
    );
    type_str(&mut app, "abc");
    press(&mut app, KeyCode::Enter);

    assert!(app.take_commands().is_empty());
    assert_eq!(app.mode.kind(), ModeKind::Editing);
    let session = app.mode.session().unwrap();
    assert!(session.error.as_deref().unwrap().contains("duration"));
    assert!(!session.is_pending());
    assert!(!store.calls().contains(&"update"));
    assert_eq!(store.snapshot()[0].duration_secs, 600);
}

#[test]
fn test_start_then_end_an_activity() {
    let now = Arc::new(Mutex::new(at(5, 9)));
    let clock = Arc::clone(&now);
    let store = MemoryStore::new().with_clock(Arc::new(move || *clock.lock().unwrap()));
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('s'));
    type_str(&mut app, "Deep work");
    for _ in 0..5 {
        press(&mut app, KeyCode::Enter);
    }
    let ops = app.take_commands();
    assert!(matches!(&ops[..], [Operation::Start { draft, .. }] if draft.name == "Deep work"));
    for op in ops {
        handle_event(&mut app, AppEvent::Completed(execute(&store, op)));
    }
    settle(&mut app, &store);

    assert_eq!(app.mode, Mode::Browsing);
    assert_eq!(app.status.as_deref(), Some("Started #1 Deep work"));
    assert!(app.records[0].is_open());
    assert!(app.list.items()[0].subtitle.ends_with("in progress"));

    *now.lock().unwrap() = at(5, 11);
    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.take_commands(), vec![Operation::Finish { id: RecordId(1) }]);
    let completion = execute(&store, Operation::Finish { id: RecordId(1) });
    handle_event(&mut app, AppEvent::Completed(completion));
    settle(&mut app, &store);

    assert_eq!(app.status.as_deref(), Some("Ended #1 Deep work (2h 00m)"));
    assert_eq!(app.records[0].ended_at, Some(at(5, 11)));
    assert_eq!(app.records[0].duration_secs, 7200);

    // Ending it again is refused without a store call
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode.kind(), ModeKind::Viewing);
    press(&mut app, KeyCode::Char('x'));
    assert!(app.take_commands().is_empty());
    assert_eq!(app.status.as_deref(), Some("#1 has already ended"));
    assert_eq!(store.calls(), vec!["list", "start", "list", "finish", "list"]);
}

#[test]
fn test_viewed_record_removed_elsewhere_returns_to_list() {
    let store = fixed_store(vec![record(1, "Write spec", at(1, 9)), record(2, "Other", at(2, 9))]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Enter);
    assert!(matches!(app.mode, Mode::Viewing(s) if s.id == RecordId(1)));

    apply_completion(&mut app, Completion::Fetched(Ok(vec![record(2, "Other", at(2, 9))])));
    assert_eq!(app.mode, Mode::Browsing);
    assert_eq!(app.status.as_deref(), Some("#1 no longer exists"));
    assert_consistent(&app);
}

#[test]
fn test_resize_mid_add_keeps_focus_and_values() {
    let store = fixed_store(vec![]);
    let mut app = started_app(&store);

    press(&mut app, KeyCode::Char('a'));
    type_str(&mut app, "Write spec");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "Design");
    let before = app.mode.clone();

    handle_event(&mut app, AppEvent::Resize(120, 40));
    handle_event(&mut app, AppEvent::Resize(20, 6));

    assert_eq!(app.mode, before);
    assert_eq!((app.width, app.height), (20, 6));
    let session = app.mode.session().unwrap();
    assert_eq!(session.form.focus_index(), 1);
    assert_eq!(session.form.value(1), Some("Design"));
}

#[test]
fn test_arbitrary_key_sequences_stay_consistent() {
    let records: Vec<Record> = (1..=9)
        .map(|i| record(i, &format!("Task {i}"), at(i as u32, 9)))
        .collect();
    let store = fixed_store(records);
    let mut app = started_app(&store);

    let script = [
        KeyCode::Char('j'),
        KeyCode::Enter,
        KeyCode::Char('j'),
        KeyCode::Char('e'),
        KeyCode::Char('x'),
        KeyCode::BackTab,
        KeyCode::Esc,
        KeyCode::Esc,
        KeyCode::Char('G'),
        KeyCode::Char('a'),
        KeyCode::Tab,
        KeyCode::Enter,
        KeyCode::Esc,
        KeyCode::Char('/'),
        KeyCode::Char('7'),
        KeyCode::Enter,
        KeyCode::Char('v'),
        KeyCode::PageDown,
        KeyCode::Char('q'),
        KeyCode::Char('h'),
        KeyCode::Char('l'),
        KeyCode::Char('r'),
    ];
    for code in script {
        press(&mut app, code);
        assert_consistent(&app);
        settle(&mut app, &store);
        assert_consistent(&app);
    }
    assert!(!store.calls().contains(&"insert"));
    assert!(!store.calls().contains(&"update"));
}

#[test]
fn test_scheduler_delivers_completions_through_the_queue() {
    let store = Arc::new(fixed_store(vec![record(1, "Write spec", at(1, 9))]));
    let queue = EventQueue::new();
    let scheduler = Scheduler::new(store.clone(), queue.sender());

    let mut app = App::new(&UiConfig::default());
    app.start();
    for op in app.take_commands() {
        scheduler.schedule(op);
    }
    assert!(app.is_loading());

    let event = queue
        .next_timeout(Duration::from_secs(5))
        .expect("fetch completion");
    handle_event(&mut app, event);
    assert!(!app.is_loading());
    assert_eq!(app.records.len(), 1);
    assert_eq!(app.records[0].name, "Write spec");
}

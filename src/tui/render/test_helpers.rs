use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::{Record, RecordId, UiConfig};
use crate::tui::app::App;
use crate::tui::input::apply_completion;
use crate::tui::scheduler::Completion;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// A completed record started on 2024-01-<id> at 09:00.
pub fn sample_record(id: i64, name: &str, project: &str, secs: u64) -> Record {
    let start = NaiveDate::from_ymd_opt(2024, 1, id as u32)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    Record {
        id: RecordId(id),
        name: name.into(),
        description: format!("About {name}"),
        project: project.into(),
        notes: String::new(),
        duration_secs: secs,
        started_at: start,
        ended_at: Some(start),
    }
}

/// An App sized to the test terminal with `records` already fetched.
pub fn app_with_records(records: Vec<Record>) -> App {
    let mut app = App::new(&UiConfig::default());
    app.resize(TERM_W, TERM_H);
    apply_completion(&mut app, Completion::Fetched(Ok(records)));
    app
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

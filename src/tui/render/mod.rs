pub mod detail_view;
pub mod form_overlay;
pub mod header;
pub(crate) mod helpers;
pub mod list_view;
pub mod status_row;

#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use super::app::{App, EditOrigin, Mode};

/// Header rows (title + separator)
pub const HEADER_ROWS: u16 = 2;
/// Status rows at the bottom
pub const STATUS_ROWS: u16 = 1;

/// The content area between header and status row for a terminal size
pub fn content_rect(width: u16, height: u16) -> Rect {
    Rect::new(
        0,
        HEADER_ROWS,
        width,
        height.saturating_sub(HEADER_ROWS + STATUS_ROWS),
    )
}

/// Main render function, dispatching to the sub-renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS), // title + separator
            Constraint::Min(1),              // content area
            Constraint::Length(STATUS_ROWS), // status row
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);

    // Content: the detail view while viewing (or editing from it), the list otherwise
    let show_detail = matches!(
        app.mode,
        Mode::Viewing(_)
            | Mode::Editing {
                origin: EditOrigin::Viewing,
                ..
            }
    );
    if show_detail {
        detail_view::render_detail_view(frame, app, chunks[1]);
    } else {
        list_view::render_list_view(frame, app, chunks[1]);
    }

    // Form overlay (rendered on top of content)
    if app.mode.session().is_some() {
        form_overlay::render_form_overlay(frame, app, chunks[1]);
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// Append `text` as spans, styling non-empty regex matches with `highlight_style`
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let mut pos = 0;
    if let Some(re) = search_re {
        for m in re.find_iter(text).filter(|m| !m.is_empty()) {
            if m.start() > pos {
                spans.push(Span::styled(text[pos..m.start()].to_string(), base_style));
            }
            spans.push(Span::styled(m.as_str().to_string(), highlight_style));
            pos = m.end();
        }
    }
    if pos < text.len() || pos == 0 {
        spans.push(Span::styled(text[pos..].to_string(), base_style));
    }
}

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, FormSession, Mode};
use crate::tui::form::FormField;
use crate::util::unicode;

use super::helpers::centered_rect_fixed;

/// Render the Add/Edit form as a centered popup over the content area
pub fn render_form_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let (title, session) = match &app.mode {
        Mode::Adding(session) if session.open => (" Start activity ".to_string(), session),
        Mode::Adding(session) => (" New activity ".to_string(), session),
        Mode::Editing {
            selection, session, ..
        } => (format!(" Edit {} ", selection.id), session),
        _ => return,
    };

    let popup_w: u16 = 60.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;
    // label + value per field, blank, message line, borders
    let popup_h = ((session.form.len() as u16) * 2 + 4).min(area.height);
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<Position> = None;

    for (i, field) in session.form.fields().iter().enumerate() {
        let focused = i == session.form.focus_index();
        let label_style = if focused {
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", field.label()),
            label_style,
        )));

        let value_w = inner_w.saturating_sub(4);
        let (shown, cursor_col) = visible_value(field, value_w, focused);
        let value_style = if focused {
            Style::default().fg(app.theme.text_bright).bg(app.theme.selection_bg)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        let pad = value_w.saturating_sub(unicode::display_width(&shown));
        lines.push(Line::from(vec![
            Span::styled("   ", Style::default().bg(bg)),
            Span::styled(format!("{}{}", shown, " ".repeat(pad)), value_style),
        ]));

        if focused && !session.is_pending() {
            // 1 border + 3 indent, then the label row above this one
            let x = overlay_area.x + 1 + 3 + cursor_col as u16;
            let y = overlay_area.y + 1 + (i as u16) * 2 + 1;
            if x < overlay_area.right().saturating_sub(1) && y < overlay_area.bottom().saturating_sub(1)
            {
                cursor = Some(Position::new(x, y));
            }
        }
    }

    lines.push(Line::default());
    lines.push(message_line(app, session));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );

    if let Some(pos) = cursor {
        frame.set_cursor_position(pos);
    }
}

/// The slice of a field value that fits in `width` cells, scrolled so the
/// cursor of the focused field stays visible, and the cursor column within it
fn visible_value(field: &FormField, width: usize, focused: bool) -> (String, usize) {
    let col = field.cursor_col();
    if !focused || col < width {
        return (unicode::truncate_to_width(&field.value, width), col);
    }
    // Drop leading graphemes until the cursor fits
    let mut start = 0;
    while unicode::byte_offset_to_display_col(&field.value, field.cursor)
        - unicode::byte_offset_to_display_col(&field.value, start)
        >= width
    {
        match unicode::next_grapheme_boundary(&field.value, start) {
            Some(next) => start = next,
            None => break,
        }
    }
    let tail = &field.value[start..];
    let shown_col = unicode::byte_offset_to_display_col(&field.value, field.cursor)
        - unicode::byte_offset_to_display_col(&field.value, start);
    (unicode::truncate_to_width(tail, width), shown_col)
}

fn message_line<'a>(app: &App, session: &FormSession) -> Line<'a> {
    let bg = app.theme.background;
    if let Some(error) = &session.error {
        return Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(app.theme.red).bg(bg),
        ));
    }
    if session.is_pending() {
        return Line::from(Span::styled(
            " Saving\u{2026}",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    let action = if session.form.is_last_focused() {
        "Enter save"
    } else {
        "Enter next"
    };
    Line::from(Span::styled(
        format!(" {action}  Shift+Tab back  Esc cancel"),
        Style::default().fg(app.theme.dim).bg(bg),
    ))
}

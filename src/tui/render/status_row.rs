use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, ModeKind};
use crate::tui::list::FilterState;

use super::helpers::push_right_aligned;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let kind = app.mode.kind();

    let mut spans: Vec<Span> = Vec::new();
    if kind == ModeKind::Browsing && app.list.filter_state() == FilterState::Editing {
        // Filter prompt: /pattern▌
        spans.push(Span::styled(
            format!("/{}", app.list.filter()),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
        spans.push(Span::styled(
            "\u{258C}",
            Style::default().fg(app.theme.highlight).bg(bg),
        )); // ▌ cursor
    } else if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {}", status),
            Style::default().fg(app.theme.green).bg(bg),
        ));
    } else if app.show_key_hints {
        spans.push(Span::styled(
            format!(" {}", key_hints(kind)),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let mode = Span::styled(
        format!(" {} ", kind.label()),
        Style::default()
            .fg(app.theme.background)
            .bg(app.theme.highlight)
            .add_modifier(Modifier::BOLD),
    );
    push_right_aligned(&mut spans, vec![mode], width, Style::default().bg(bg));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn key_hints(kind: ModeKind) -> &'static str {
    match kind {
        ModeKind::Browsing => {
            "a add  s start  x end  \u{23CE} view  e edit  / filter  r refresh  q quit"
        }
        ModeKind::Adding | ModeKind::Editing => "Tab next  Shift+Tab back  Esc cancel",
        ModeKind::Viewing => "j/k scroll  e edit  x end  Esc back",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_browsing_hints() {
        let app = app_with_records(vec![]);
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        let expected = format!(
            " a add  s start  x end  \u{23CE} view  e edit  / filter  r refresh  q quit{} BROWSE",
            " ".repeat(5)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_filter_prompt_replaces_hints() {
        let mut app = app_with_records(vec![]);
        app.list.start_filter();
        app.list.push_filter_char('x');
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with("/x\u{258C}"));
        assert!(out.ends_with("BROWSE"));
    }

    #[test]
    fn test_status_message_wins_over_hints() {
        let mut app = app_with_records(vec![]);
        app.status = Some("Added #3 Write spec".into());
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.contains("Added #3 Write spec"));
        assert!(!out.contains("q quit"));
    }

    #[test]
    fn test_hints_can_be_disabled() {
        let mut app = app_with_records(vec![]);
        app.show_key_hints = false;
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(out.trim_start(), "BROWSE");
    }
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::viewport::LineKind;

use super::helpers::push_right_aligned;

/// Horizontal padding on each side of the detail text
const PAD: u16 = 2;

/// Viewport size for a content area: padded width, one footer row
pub fn viewport_size(content: Rect) -> (u16, u16) {
    (
        content.width.saturating_sub(PAD * 2),
        content.height.saturating_sub(1),
    )
}

/// Render the detail viewport for the record being viewed
pub fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let (_, text_h) = viewport_size(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(text_h), Constraint::Length(1)])
        .split(area);
    let text_area = Rect {
        x: chunks[0].x + PAD,
        width: chunks[0].width.saturating_sub(PAD * 2),
        ..chunks[0]
    };

    let lines: Vec<Line> = app
        .viewport
        .visible_rows()
        .iter()
        .map(|row| {
            let style = match row.kind {
                LineKind::Heading => Style::default()
                    .fg(app.theme.text_bright)
                    .add_modifier(Modifier::BOLD),
                LineKind::Label => Style::default().fg(app.theme.highlight),
                LineKind::Body => Style::default().fg(app.theme.text),
                LineKind::Blank => Style::default(),
            };
            Line::from(Span::styled(row.text.clone(), style.bg(bg)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), text_area);

    // Footer: scroll position
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let mut footer: Vec<Span> = Vec::new();
    let position = if app.viewport.max_offset() == 0 {
        "all  ".to_string()
    } else {
        format!("{}%  ", app.viewport.percent())
    };
    push_right_aligned(
        &mut footer,
        vec![Span::styled(position, dim)],
        chunks[1].width as usize,
        Style::default().bg(bg),
    );
    frame.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);
}

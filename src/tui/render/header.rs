use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};

use super::helpers::push_right_aligned;

/// Render the header: app title, current screen and load state, with a separator below
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1]);
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(
            " worklog ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    let screen = match &app.mode {
        Mode::Browsing => "activities".to_string(),
        Mode::Adding(_) => "new activity".to_string(),
        Mode::Viewing(sel) => format!("activity {}", sel.id),
        Mode::Editing { selection, .. } => format!("editing {}", selection.id),
    };
    spans.push(Span::styled(
        "\u{2502}",
        Style::default().fg(app.theme.dim).bg(bg),
    ));
    spans.push(Span::styled(
        format!(" {} ", screen),
        Style::default().fg(app.theme.text).bg(bg),
    ));

    let mut right = Vec::new();
    if app.is_loading() {
        right.push(Span::styled(
            "\u{27F3} loading  ",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    if app.error.is_some() {
        right.push(Span::styled(
            "\u{2717} error  ",
            Style::default().fg(app.theme.red).bg(bg),
        ));
    }
    let count = app.records.len();
    right.push(Span::styled(
        format!("{} {} ", count, if count == 1 { "activity" } else { "activities" }),
        Style::default().fg(app.theme.dim).bg(bg),
    ));
    push_right_aligned(&mut spans, right, area.width as usize, bg_style);

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::tui::app::App;
use crate::tui::list::{FilterState, ListItem};
use crate::util::unicode;

use super::helpers::push_right_aligned;
use super::push_highlighted_spans;

/// Rows available for items in a content area of `height` rows (one footer row)
pub fn item_rows(height: u16) -> u16 {
    height.saturating_sub(1)
}

/// Render the list browser, or the error panel while a store failure is shown
pub fn render_list_view(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(error) = &app.error {
        render_error_panel(frame, app, error, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(item_rows(area.height)), Constraint::Length(1)])
        .split(area);

    if app.list.is_empty() {
        render_placeholder(frame, app, chunks[0]);
    } else {
        render_items(frame, app, chunks[0]);
    }
    render_footer(frame, app, chunks[1]);
}

fn render_items(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let search_re = app.list.filter_regex();
    let match_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);

    let mut lines: Vec<Line> = Vec::new();
    for (pos, item) in app.list.page_items() {
        let selected = pos == app.list.cursor();
        let row_bg = if selected { app.theme.selection_bg } else { bg };
        let fill = Style::default().bg(row_bg);

        // Title row: marker, project dot, title, id on the right
        let mut title: Vec<Span> = vec![Span::styled(
            if selected { "\u{258E} " } else { "  " },
            Style::default().fg(app.theme.selection_border).bg(row_bg),
        )];
        title.push(project_dot(app, item, row_bg));
        let title_style = if selected {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(row_bg)
        };
        let id_text = format!(" {} ", item.id);
        let title_budget = width.saturating_sub(4 + id_text.len());
        push_highlighted_spans(
            &mut title,
            &unicode::truncate_to_width(&item.title, title_budget),
            title_style,
            match_style,
            search_re.as_ref(),
        );
        push_right_aligned(
            &mut title,
            vec![Span::styled(
                id_text,
                Style::default().fg(app.theme.selection_id).bg(row_bg),
            )],
            width,
            fill,
        );
        lines.push(Line::from(title));

        // Subtitle row
        let mut subtitle: Vec<Span> = vec![Span::styled("    ", fill)];
        push_highlighted_spans(
            &mut subtitle,
            &unicode::truncate_to_width(&item.subtitle, width.saturating_sub(5)),
            Style::default().fg(app.theme.dim).bg(row_bg),
            match_style,
            search_re.as_ref(),
        );
        push_right_aligned(&mut subtitle, Vec::new(), width, fill);
        lines.push(Line::from(subtitle));
    }

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        area,
    );
}

fn project_dot<'a>(app: &App, item: &ListItem, row_bg: ratatui::style::Color) -> Span<'a> {
    if item.project.is_empty() {
        Span::styled("  ", Style::default().bg(row_bg))
    } else {
        Span::styled(
            "\u{25CF} ",
            Style::default()
                .fg(app.theme.project_color(&item.project))
                .bg(row_bg),
        )
    }
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.is_loading() {
        "  Loading\u{2026}"
    } else if app.list.filter_state() != FilterState::Off && !app.list.items().is_empty() {
        "  No activities match the filter."
    } else {
        "  No activities yet. Press a to add one."
    };
    let line = Line::from(Span::styled(
        text,
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    ));
    frame.render_widget(
        Paragraph::new(vec![Line::default(), line])
            .style(Style::default().bg(app.theme.background)),
        area,
    );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let mut spans: Vec<Span> = Vec::new();

    if app.list.filter_state() == FilterState::Applied {
        spans.push(Span::styled(format!("  /{}", app.list.filter()), dim));
        spans.push(Span::styled(
            format!("  {} of {}", app.list.visible_len(), app.list.items().len()),
            dim,
        ));
    }
    let page = format!(
        "page {}/{}  ",
        app.list.page() + 1,
        app.list.page_count()
    );
    push_right_aligned(
        &mut spans,
        vec![Span::styled(page, dim)],
        area.width as usize,
        Style::default().bg(bg),
    );
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Persistent error panel shown in place of the list until the next success
fn render_error_panel(frame: &mut Frame, app: &App, error: &str, area: Rect) {
    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Error ")
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    let lines = vec![
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(app.theme.dim).bg(bg),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::util::unicode;

/// Compute total display width of a slice of spans
pub(crate) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Push `right` flush against the right edge after `spans`, padding with
/// `fill`. Dropped when it does not fit.
pub(crate) fn push_right_aligned<'a>(
    spans: &mut Vec<Span<'a>>,
    right: Vec<Span<'a>>,
    width: usize,
    fill: Style,
) {
    let used = spans_width(spans);
    let right_w = spans_width(&right);
    if used + right_w < width {
        spans.push(Span::styled(" ".repeat(width - used - right_w), fill));
        spans.extend(right);
    } else if used < width {
        spans.push(Span::styled(" ".repeat(width - used), fill));
    }
}

pub(crate) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

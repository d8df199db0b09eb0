use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Next grapheme boundary after `byte_offset`. Returns None if at end.
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset >= s.len() {
        return None;
    }
    s[byte_offset..]
        .grapheme_indices(true)
        .nth(1)
        .map(|(i, _)| byte_offset + i)
        .or(Some(s.len()))
}

/// Previous grapheme boundary before `byte_offset`. Returns None if at start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    s[..byte_offset]
        .grapheme_indices(true)
        .next_back()
        .map(|(i, _)| i)
}

/// Convert byte offset to display column (terminal cells).
pub fn byte_offset_to_display_col(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

fn is_blank(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

/// Word boundary to the left (grapheme-aware, whitespace-delimited).
pub fn word_boundary_left(s: &str, byte_offset: usize) -> usize {
    let graphemes: Vec<(usize, &str)> = s[..byte_offset.min(s.len())]
        .grapheme_indices(true)
        .collect();
    let mut idx = graphemes.len();
    while idx > 0 && is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    graphemes.get(idx).map_or(0, |(i, _)| *i)
}

/// Word boundary to the right (grapheme-aware, whitespace-delimited).
pub fn word_boundary_right(s: &str, byte_offset: usize) -> usize {
    if byte_offset >= s.len() {
        return s.len();
    }
    let mut iter = s[byte_offset..].grapheme_indices(true).peekable();
    while iter.next_if(|(_, g)| !is_blank(g)).is_some() {}
    while iter.next_if(|(_, g)| is_blank(g)).is_some() {}
    iter.peek().map_or(s.len(), |(i, _)| byte_offset + i)
}

/// Word-wrap one logical line into rows of at most `width` cells.
///
/// Breaks after whitespace; a single word wider than `width` is split at
/// grapheme boundaries. Trailing whitespace at a break is dropped. An empty
/// line yields one empty row.
pub fn wrap_text(line: &str, width: usize) -> Vec<String> {
    if width == 0 || display_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_w = 0;

    for word in line.split_word_bounds() {
        let ww = display_width(word);
        if is_blank(word) {
            if row_w + ww <= width {
                row.push_str(word);
                row_w += ww;
            } else {
                rows.push(std::mem::take(&mut row).trim_end().to_string());
                row_w = 0;
            }
            continue;
        }
        if row_w + ww > width && row_w > 0 {
            rows.push(std::mem::take(&mut row).trim_end().to_string());
            row_w = 0;
        }
        if ww <= width {
            row.push_str(word);
            row_w += ww;
            continue;
        }
        for g in word.graphemes(true) {
            let gw = grapheme_display_width(g);
            if row_w + gw > width && row_w > 0 {
                rows.push(std::mem::take(&mut row));
                row_w = 0;
            }
            row.push_str(g);
            row_w += gw;
        }
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

/// Display width of a grapheme cluster.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}

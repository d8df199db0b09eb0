use regex::Regex;

use crate::model::{Record, RecordId, format_duration};

/// Rows each item takes on screen: title line plus subtitle line
pub const ROWS_PER_ITEM: usize = 2;

/// One selectable entry in the list browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: RecordId,
    pub title: String,
    pub subtitle: String,
    pub project: String,
}

impl ListItem {
    pub fn from_record(record: &Record) -> Self {
        let mut subtitle = record.started_at.format("%Y-%m-%d %H:%M").to_string();
        if !record.project.is_empty() {
            subtitle.push_str(" \u{00B7} ");
            subtitle.push_str(&record.project);
        }
        subtitle.push_str(" \u{00B7} ");
        if record.is_open() {
            subtitle.push_str("in progress");
        } else {
            subtitle.push_str(&format_duration(record.duration_secs));
        }
        ListItem {
            id: record.id,
            title: record.name.clone(),
            subtitle,
            project: record.project.clone(),
        }
    }
}

/// Filter entry state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// No filter
    Off,
    /// Query is being typed
    Editing,
    /// Query accepted and still applied
    Applied,
}

/// Navigable, filterable, paginated list of record items
#[derive(Debug, Clone)]
pub struct ListBrowser {
    items: Vec<ListItem>,
    /// Indices into `items` that pass the filter, in order
    visible: Vec<usize>,
    /// Cursor into `visible`
    cursor: usize,
    per_page: usize,
    filter: String,
    filter_state: FilterState,
}

impl Default for ListBrowser {
    fn default() -> Self {
        ListBrowser {
            items: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            per_page: 1,
            filter: String::new(),
            filter_state: FilterState::Off,
        }
    }
}

/// Case-insensitive regex for a filter query; invalid patterns match literally
pub fn filter_regex(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", query))
        .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(query))))
        .ok()
}

impl ListBrowser {
    /// Replace the items, keeping the cursor on the same id when it survives
    pub fn set_items(&mut self, items: Vec<ListItem>) {
        let keep = self.selected().map(|i| i.id);
        self.items = items;
        self.refilter(keep);
    }

    pub fn set_records(&mut self, records: &[Record]) {
        self.set_items(records.iter().map(ListItem::from_record).collect());
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Cursor position among visible items
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&ListItem> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    /// Index into the full item set (and so into the fetched records) of the selection
    pub fn selected_index(&self) -> Option<usize> {
        self.visible.get(self.cursor).copied()
    }

    // ── pagination ────────────────────────────────────────────────

    /// Size pages from the content height available to items
    pub fn set_page_height(&mut self, rows: u16) {
        self.per_page = (rows as usize / ROWS_PER_ITEM).max(1);
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn page(&self) -> usize {
        self.cursor / self.per_page
    }

    pub fn page_count(&self) -> usize {
        self.visible.len().div_ceil(self.per_page).max(1)
    }

    /// Visible items on the current page, paired with their position in `visible`
    pub fn page_items(&self) -> Vec<(usize, &ListItem)> {
        let start = self.page() * self.per_page;
        self.visible
            .iter()
            .enumerate()
            .skip(start)
            .take(self.per_page)
            .map(|(pos, &i)| (pos, &self.items[i]))
            .collect()
    }

    // ── navigation ────────────────────────────────────────────────

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = (self.cursor + self.per_page).min(self.visible.len() - 1);
    }

    pub fn prev_page(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.per_page);
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.visible.len().saturating_sub(1);
    }

    // ── filtering ─────────────────────────────────────────────────

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn filter_regex(&self) -> Option<Regex> {
        match self.filter_state {
            FilterState::Off => None,
            _ => filter_regex(&self.filter),
        }
    }

    pub fn start_filter(&mut self) {
        self.filter_state = FilterState::Editing;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.refilter_keeping_selection();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refilter_keeping_selection();
    }

    /// Stop editing the query; an empty query turns the filter off
    pub fn accept_filter(&mut self) {
        self.filter_state = if self.filter.is_empty() {
            FilterState::Off
        } else {
            FilterState::Applied
        };
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.filter_state = FilterState::Off;
        self.refilter_keeping_selection();
    }

    fn refilter_keeping_selection(&mut self) {
        let keep = self.selected().map(|i| i.id);
        self.refilter(keep);
    }

    fn refilter(&mut self, keep: Option<RecordId>) {
        let re = filter_regex(&self.filter);
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                re.as_ref()
                    .is_none_or(|re| re.is_match(&item.title) || re.is_match(&item.subtitle))
            })
            .map(|(i, _)| i)
            .collect();

        self.cursor = keep
            .and_then(|id| self.visible.iter().position(|&i| self.items[i].id == id))
            .unwrap_or_else(|| self.cursor.min(self.visible.len().saturating_sub(1)));
    }
}

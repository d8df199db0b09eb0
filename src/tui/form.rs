use crate::model::{ActivityField, Draft, Record, ValidationError};
use crate::util::unicode;

/// One labeled single-line input. `cursor` is a byte offset on a grapheme boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub field: ActivityField,
    pub value: String,
    pub cursor: usize,
}

impl FormField {
    fn new(field: ActivityField) -> Self {
        FormField {
            field,
            value: String::new(),
            cursor: 0,
        }
    }

    pub fn label(&self) -> &'static str {
        self.field.label()
    }

    /// Display column of the cursor
    pub fn cursor_col(&self) -> usize {
        unicode::byte_offset_to_display_col(&self.value, self.cursor)
    }
}

/// Ordered labeled fields with exactly one focused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldForm {
    fields: Vec<FormField>,
    focus: usize,
}

impl Default for FieldForm {
    fn default() -> Self {
        FieldForm::activity()
    }
}

impl FieldForm {
    /// The five activity fields, all empty, first one focused
    pub fn activity() -> Self {
        FieldForm {
            fields: ActivityField::ALL.iter().map(|f| FormField::new(*f)).collect(),
            focus: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    /// Focus field `i`, clamped to the last field
    pub fn focus(&mut self, i: usize) {
        self.focus = i.min(self.fields.len().saturating_sub(1));
    }

    pub fn focus_next(&mut self) {
        self.focus(self.focus + 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus(self.focus.saturating_sub(1));
    }

    pub fn is_last_focused(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    pub fn focused(&self) -> &FormField {
        &self.fields[self.focus]
    }

    fn focused_mut(&mut self) -> &mut FormField {
        &mut self.fields[self.focus]
    }

    /// Replace the value of field `i` and put its cursor at the end. Out of range is a no-op.
    pub fn set_value(&mut self, i: usize, text: &str) {
        if let Some(f) = self.fields.get_mut(i) {
            f.value = text.to_string();
            f.cursor = f.value.len();
        }
    }

    pub fn value(&self, i: usize) -> Option<&str> {
        self.fields.get(i).map(|f| f.value.as_str())
    }

    pub fn values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }

    /// Clear every value and focus the first field
    pub fn reset(&mut self) {
        for f in &mut self.fields {
            f.value.clear();
            f.cursor = 0;
        }
        self.focus = 0;
    }

    /// Fill from a record and focus the first field
    pub fn populate(&mut self, record: &Record) {
        for f in &mut self.fields {
            f.value = f.field.value_of(record);
            f.cursor = f.value.len();
        }
        self.focus = 0;
    }

    /// Validate and build a draft from the current values
    pub fn draft(&self) -> Result<Draft, ValidationError> {
        Draft::from_values(&self.values())
    }

    // ── in-field editing (focused field) ──────────────────────────

    pub fn insert_char(&mut self, c: char) {
        let f = self.focused_mut();
        f.value.insert(f.cursor, c);
        f.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        let clean = s.replace(['\n', '\r'], " ");
        let f = self.focused_mut();
        f.value.insert_str(f.cursor, &clean);
        f.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        let f = self.focused_mut();
        if let Some(prev) = unicode::prev_grapheme_boundary(&f.value, f.cursor) {
            f.value.replace_range(prev..f.cursor, "");
            f.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        let f = self.focused_mut();
        if let Some(next) = unicode::next_grapheme_boundary(&f.value, f.cursor) {
            f.value.replace_range(f.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        let f = self.focused_mut();
        if let Some(prev) = unicode::prev_grapheme_boundary(&f.value, f.cursor) {
            f.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        let f = self.focused_mut();
        if let Some(next) = unicode::next_grapheme_boundary(&f.value, f.cursor) {
            f.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.focused_mut().cursor = 0;
    }

    pub fn move_end(&mut self) {
        let f = self.focused_mut();
        f.cursor = f.value.len();
    }

    pub fn word_left(&mut self) {
        let f = self.focused_mut();
        f.cursor = unicode::word_boundary_left(&f.value, f.cursor);
    }

    pub fn word_right(&mut self) {
        let f = self.focused_mut();
        f.cursor = unicode::word_boundary_right(&f.value, f.cursor);
    }

    /// Delete from the start of the field to the cursor
    pub fn kill_to_start(&mut self) {
        let f = self.focused_mut();
        f.value.replace_range(..f.cursor, "");
        f.cursor = 0;
    }

    /// Delete the word before the cursor
    pub fn delete_word_back(&mut self) {
        let f = self.focused_mut();
        let start = unicode::word_boundary_left(&f.value, f.cursor);
        f.value.replace_range(start..f.cursor, "");
        f.cursor = start;
    }
}

use crate::model::{ActivityField, Record, format_duration};
use crate::util::unicode::wrap_text;

/// Role of a logical line, used for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Label,
    Body,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub kind: LineKind,
    pub text: String,
}

impl DetailLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        DetailLine {
            kind,
            text: text.into(),
        }
    }
}

/// Scrollable, word-wrapped read-only rendering of one record
#[derive(Debug, Clone, Default)]
pub struct DetailViewport {
    lines: Vec<DetailLine>,
    /// `lines` wrapped to `width`
    rows: Vec<DetailLine>,
    width: u16,
    height: u16,
    offset: usize,
}

/// Logical lines for a record: heading, labeled fields, then paragraphs
pub fn record_lines(record: &Record) -> Vec<DetailLine> {
    let mut lines = vec![
        DetailLine::new(LineKind::Heading, format!("{}  {}", record.id, record.name)),
        DetailLine::new(LineKind::Blank, ""),
    ];

    let ended = match record.ended_at {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "in progress".to_string(),
    };
    let meta = [
        ("Project", record.project.clone()),
        (
            "Duration",
            format!(
                "{} ({}s)",
                format_duration(record.duration_secs),
                record.duration_secs
            ),
        ),
        ("Started", record.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Ended", ended),
    ];
    for (label, value) in meta {
        lines.push(DetailLine::new(LineKind::Body, format!("{:<10}{}", label, value)));
    }

    for (field, text) in [
        (ActivityField::Description, &record.description),
        (ActivityField::Notes, &record.notes),
    ] {
        lines.push(DetailLine::new(LineKind::Blank, ""));
        lines.push(DetailLine::new(LineKind::Label, field.label()));
        if text.trim().is_empty() {
            lines.push(DetailLine::new(LineKind::Body, "\u{2014}"));
        }
        for para in text.lines() {
            lines.push(DetailLine::new(LineKind::Body, para));
        }
    }
    lines
}

impl DetailViewport {
    /// Replace the content and scroll back to the top
    pub fn set_content(&mut self, lines: Vec<DetailLine>) {
        self.lines = lines;
        self.offset = 0;
        self.rewrap();
    }

    pub fn show_record(&mut self, record: &Record) {
        self.set_content(record_lines(record));
    }

    pub fn clear(&mut self) {
        self.set_content(Vec::new());
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        if width != self.width {
            self.width = width;
            self.rewrap();
        }
        self.height = height;
        self.clamp();
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn max_offset(&self) -> usize {
        self.rows.len().saturating_sub(self.height as usize)
    }

    /// Rows currently in view
    pub fn visible_rows(&self) -> &[DetailLine] {
        let end = (self.offset + self.height as usize).min(self.rows.len());
        &self.rows[self.offset.min(end)..end]
    }

    /// Fraction scrolled, 0..=100
    pub fn percent(&self) -> usize {
        let max = self.max_offset();
        if max == 0 { 100 } else { self.offset * 100 / max }
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n);
        self.clamp();
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn page_down(&mut self) {
        self.scroll_down((self.height as usize).max(1));
    }

    pub fn page_up(&mut self) {
        self.scroll_up((self.height as usize).max(1));
    }

    pub fn top(&mut self) {
        self.offset = 0;
    }

    pub fn bottom(&mut self) {
        self.offset = self.max_offset();
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    fn rewrap(&mut self) {
        let width = self.width as usize;
        self.rows = self
            .lines
            .iter()
            .flat_map(|line| {
                wrap_text(&line.text, width)
                    .into_iter()
                    .map(|text| DetailLine::new(line.kind, text))
            })
            .collect();
        self.clamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use chrono::NaiveDate;

    fn record(notes: &str) -> Record {
        let t = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Record {
            id: RecordId(3),
            name: "Write spec".into(),
            description: "Design doc".into(),
            project: "ProjectX".into(),
            notes: notes.into(),
            duration_secs: 7200,
            started_at: t,
            ended_at: None,
        }
    }

    fn body(n: usize) -> Vec<DetailLine> {
        (0..n)
            .map(|i| DetailLine::new(LineKind::Body, format!("line {i}")))
            .collect()
    }

    #[test]
    fn test_record_lines_show_fields() {
        let texts: Vec<String> = record_lines(&record("first\nsecond"))
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(texts[0], "#3  Write spec");
        assert!(texts.contains(&"Project   ProjectX".to_string()));
        assert!(texts.contains(&"Duration  2h 00m (7200s)".to_string()));
        assert!(texts.contains(&"Ended     in progress".to_string()));
        assert_eq!(&texts[texts.len() - 2..], ["first", "second"]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut vp = DetailViewport::default();
        vp.set_size(20, 4);
        vp.set_content(body(10));
        assert_eq!(vp.max_offset(), 6);
        vp.scroll_down(100);
        assert_eq!(vp.offset(), 6);
        assert_eq!(vp.visible_rows().len(), 4);
        vp.scroll_up(100);
        assert_eq!(vp.offset(), 0);
        vp.page_down();
        assert_eq!(vp.offset(), 4);
        vp.bottom();
        assert_eq!(vp.percent(), 100);
        vp.top();
        assert_eq!(vp.percent(), 0);
    }

    #[test]
    fn test_short_content_does_not_scroll() {
        let mut vp = DetailViewport::default();
        vp.set_size(20, 10);
        vp.set_content(body(3));
        vp.scroll_down(1);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_resize_rewraps_and_reclamps() {
        let mut vp = DetailViewport::default();
        vp.set_size(40, 2);
        vp.set_content(vec![DetailLine::new(
            LineKind::Body,
            "alpha beta gamma delta epsilon",
        )]);
        assert_eq!(vp.row_count(), 1);

        vp.set_size(10, 2);
        assert_eq!(vp.row_count(), 4);
        vp.bottom();
        assert_eq!(vp.offset(), 2);

        vp.set_size(40, 2);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_new_content_scrolls_to_top() {
        let mut vp = DetailViewport::default();
        vp.set_size(20, 2);
        vp.set_content(body(10));
        vp.bottom();
        vp.show_record(&record(""));
        assert_eq!(vp.offset(), 0);
    }
}

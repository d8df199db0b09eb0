use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Store-assigned identity of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A persisted unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub project: String,
    pub notes: String,
    /// Logged duration in whole seconds
    pub duration_secs: u64,
    pub started_at: NaiveDateTime,
    /// Absent while the work is still ongoing
    pub ended_at: Option<NaiveDateTime>,
}

impl Record {
    /// True when the end timestamp (if any) is not before the start
    pub fn span_is_valid(&self) -> bool {
        self.ended_at.is_none_or(|end| end >= self.started_at)
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// The editable part of this record, as a form would submit it
    pub fn to_draft(&self) -> Draft {
        Draft {
            name: self.name.clone(),
            description: self.description.clone(),
            project: self.project.clone(),
            notes: self.notes.clone(),
            duration_secs: self.duration_secs,
        }
    }
}

/// A not-yet-persisted record built from form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub project: String,
    pub notes: String,
    pub duration_secs: u64,
}

/// Malformed field input, caught when a form is committed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("duration must be a whole number of seconds, got {0:?}")]
    Duration(String),
    #[error("expected {expected} field values, got {got}")]
    FieldCount { expected: usize, got: usize },
}

/// The five editable fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityField {
    Name,
    Description,
    Project,
    Notes,
    Duration,
}

impl ActivityField {
    pub const ALL: [ActivityField; 5] = [
        ActivityField::Name,
        ActivityField::Description,
        ActivityField::Project,
        ActivityField::Notes,
        ActivityField::Duration,
    ];

    /// Position in form order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityField::Name => "Name",
            ActivityField::Description => "Description",
            ActivityField::Project => "Project",
            ActivityField::Notes => "Notes",
            ActivityField::Duration => "Duration (s)",
        }
    }

    /// Text form of this field's value on a record
    pub fn value_of(self, record: &Record) -> String {
        match self {
            ActivityField::Name => record.name.clone(),
            ActivityField::Description => record.description.clone(),
            ActivityField::Project => record.project.clone(),
            ActivityField::Notes => record.notes.clone(),
            ActivityField::Duration => record.duration_secs.to_string(),
        }
    }
}

/// Parse a duration field: surrounding whitespace is ignored, the rest must be
/// a non-negative integer.
pub fn parse_duration_secs(text: &str) -> Result<u64, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::Duration(text.to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| ValidationError::Duration(text.to_string()))
}

impl Draft {
    /// Build a draft from raw field values in `ActivityField::ALL` order.
    pub fn from_values(values: &[String]) -> Result<Draft, ValidationError> {
        let [name, description, project, notes, duration] = values else {
            return Err(ValidationError::FieldCount {
                expected: ActivityField::ALL.len(),
                got: values.len(),
            });
        };
        Ok(Draft {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            project: project.trim().to_string(),
            notes: notes.trim().to_string(),
            duration_secs: parse_duration_secs(duration)?,
        })
    }
}

/// Format seconds as a compact human duration ("2h 05m", "45m", "30s")
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

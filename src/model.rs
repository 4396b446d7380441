use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_CATEGORY_COLOR: &str = "#5B21B6";
pub const DEFAULT_CATEGORY_ICON: &str = "Tag";
pub const DEFAULT_NOTE_TITLE: &str = "New Note";
pub const DEFAULT_NOTE_FOLDER: &str = "General";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    Today,
    Upcoming,
    Overdue,
    All,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::Overdue => "overdue",
            Self::All => "all",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub category: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub tags: Vec<String>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            category: DEFAULT_CATEGORY.to_string(),
            due_date: None,
            completed: false,
            tags: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
            && self.tags.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct CategoryInput {
    pub name: String,
    pub color: String,
    pub icon: String,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub shared_with: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    pub folder: String,
    pub tags: Vec<String>,
}

impl Default for NoteInput {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            folder: DEFAULT_NOTE_FOLDER.to_string(),
            tags: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub shared_with: Option<Vec<String>>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.folder.is_none()
            && self.tags.is_none()
            && self.is_pinned.is_none()
            && self.shared_with.is_none()
    }

    /// Folds a later edit into this one; fields set in `later` win.
    pub fn merge(&mut self, later: NoteChanges) {
        if later.title.is_some() {
            self.title = later.title;
        }
        if later.content.is_some() {
            self.content = later.content;
        }
        if later.folder.is_some() {
            self.folder = later.folder;
        }
        if later.tags.is_some() {
            self.tags = later.tags;
        }
        if later.is_pinned.is_some() {
            self.is_pinned = later.is_pinned;
        }
        if later.shared_with.is_some() {
            self.shared_with = later.shared_with;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoteQuery {
    pub search: Option<String>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportFormat {
    Markdown,
    Html,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

/// Trims, drops empties and duplicates, keeps first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Splits comma-separated input the way the quick-add form does.
pub fn split_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_tags_trims_and_dedupes_in_order() {
        let tags = normalize_tags(["  work ", "home", "", "work", "  "]);
        assert_eq!(tags, vec!["work".to_string(), "home".to_string()]);
    }

    #[test]
    fn split_tags_handles_commas_and_blanks() {
        assert_eq!(split_tags("a, b,,c ,a"), vec!["a", "b", "c"]);
        assert!(split_tags("  ").is_empty());
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse(" low "), Some(Priority::Low));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn note_changes_merge_prefers_later_fields() {
        let mut first = NoteChanges {
            title: Some("draft".to_string()),
            content: Some("<p>a</p>".to_string()),
            ..Default::default()
        };
        first.merge(NoteChanges {
            content: Some("<p>ab</p>".to_string()),
            folder: Some("Work".to_string()),
            ..Default::default()
        });
        assert_eq!(first.title.as_deref(), Some("draft"));
        assert_eq!(first.content.as_deref(), Some("<p>ab</p>"));
        assert_eq!(first.folder.as_deref(), Some("Work"));
    }

    #[test]
    fn task_deserializes_from_camel_case_fixture() {
        let raw = r#"{
            "id": 3,
            "title": "Call",
            "priority": "High",
            "category": "Work",
            "dueDate": "2024-05-01",
            "createdAt": "2024-04-30T10:00:00Z",
            "updatedAt": "2024-04-30T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(raw).expect("parse task");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(!task.completed);
        assert!(task.tags.is_empty());
    }
}

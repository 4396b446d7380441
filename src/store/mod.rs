//! Backing stores for tasks, categories and notes.
//!
//! Two variants share one contract: `memory` keeps a seeded vector behind an
//! artificial latency, `records` persists rows in SQLite through sea-orm.

#[cfg(test)]
pub(crate) mod contract;
pub mod memory;
pub mod records;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::model::{
    Category, CategoryChanges, CategoryInput, Note, NoteChanges, NoteInput, Task, TaskChanges,
    TaskInput,
};

pub use memory::{MemoryBackend, MemoryStore};
pub use records::RecordsBackend;

/// A stored entity that can be built from its input and patched by its changes.
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: &'static str;
    type Input: Send + 'static;
    type Changes: Send + 'static;

    fn id(&self) -> i64;
    fn from_input(id: i64, input: Self::Input, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, changes: Self::Changes, now: DateTime<Utc>);
}

pub trait Store: Clone + Send + Sync + 'static {
    type Item: Record;

    /// Newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Self::Item>, AppError>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<Self::Item, AppError>> + Send;

    fn create(
        &self,
        input: <Self::Item as Record>::Input,
    ) -> impl Future<Output = Result<Self::Item, AppError>> + Send;

    fn update(
        &self,
        id: i64,
        changes: <Self::Item as Record>::Changes,
    ) -> impl Future<Output = Result<Self::Item, AppError>> + Send;

    /// Returns the removed record.
    fn delete(&self, id: i64) -> impl Future<Output = Result<Self::Item, AppError>> + Send;
}

/// One store per entity, chosen together.
pub trait Backend: Send + Sync + 'static {
    type Tasks: Store<Item = Task>;
    type Categories: Store<Item = Category>;
    type Notes: Store<Item = Note>;

    fn name(&self) -> &'static str;
    fn tasks(&self) -> Self::Tasks;
    fn categories(&self) -> Self::Categories;
    fn notes(&self) -> Self::Notes;
}

impl Record for Task {
    const KIND: &'static str = "task";
    type Input = TaskInput;
    type Changes = TaskChanges;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_input(id: i64, input: TaskInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            category: input.category,
            due_date: input.due_date,
            completed: input.completed,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }
}

impl Record for Category {
    const KIND: &'static str = "category";
    type Input = CategoryInput;
    type Changes = CategoryChanges;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_input(id: i64, input: CategoryInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            color: input.color,
            icon: input.icon,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: CategoryChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(icon) = changes.icon {
            self.icon = icon;
        }
        self.updated_at = now;
    }
}

impl Record for Note {
    const KIND: &'static str = "note";
    type Input = NoteInput;
    type Changes = NoteChanges;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_input(id: i64, input: NoteInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            folder: input.folder,
            tags: input.tags,
            is_pinned: false,
            shared_with: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: NoteChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(folder) = changes.folder {
            self.folder = folder;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(is_pinned) = changes.is_pinned {
            self.is_pinned = is_pinned;
        }
        if let Some(shared_with) = changes.shared_with {
            self.shared_with = shared_with;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn task_apply_merges_only_provided_fields() {
        let created = Utc::now();
        let mut task = Task::from_input(1, TaskInput::new("Write report"), created);
        let later = created + Duration::seconds(5);
        task.apply(
            TaskChanges {
                completed: Some(true),
                due_date: Some(NaiveDate::from_ymd_opt(2024, 1, 2)),
                ..Default::default()
            },
            later,
        );
        assert_eq!(task.title, "Write report");
        assert!(task.completed);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(task.created_at, created);
        assert_eq!(task.updated_at, later);

        task.apply(
            TaskChanges {
                due_date: Some(None),
                ..Default::default()
            },
            later,
        );
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn note_from_input_is_never_pinned() {
        let note = Note::from_input(9, NoteInput::default(), Utc::now());
        assert!(!note.is_pinned);
        assert!(note.shared_with.is_empty());
        assert_eq!(note.title, "New Note");
    }
}

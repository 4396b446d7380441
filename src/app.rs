use chrono::NaiveDate;

use crate::error::AppError;
use crate::filter::{daily_progress, range_counts, DailyProgress, RangeCounts, TaskFilter};
use crate::model::{Category, Note, NoteQuery, Task};
use crate::service::{CategoryService, NoteService, TaskService};
use crate::store::Backend;

pub struct App<B: Backend> {
    backend: &'static str,
    pub tasks: TaskService<B::Tasks>,
    pub categories: CategoryService<B::Categories>,
    pub notes: NoteService<B::Notes>,
}

/// Everything the Today page renders.
pub struct TodayView {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub progress: DailyProgress,
    pub counts: RangeCounts,
    pub total: usize,
    pub filter_active: bool,
}

/// Everything the Notes page renders.
pub struct NotesView {
    pub notes: Vec<Note>,
    pub folders: Vec<String>,
    pub tags: Vec<String>,
}

impl<B: Backend> App<B> {
    pub fn new(backend: &B) -> Self {
        Self {
            backend: backend.name(),
            tasks: TaskService::new(backend.tasks()),
            categories: CategoryService::new(backend.categories()),
            notes: NoteService::new(backend.notes()),
        }
    }

    #[cfg(test)]
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    /// Loads tasks and categories together, then derives the filtered list.
    pub async fn load_today(
        &self,
        filter: &TaskFilter,
        today: NaiveDate,
    ) -> Result<TodayView, AppError> {
        let (tasks, categories) =
            tokio::try_join!(self.tasks.get_all(), self.categories.get_all())?;
        log::debug!(
            "event=page_load module=app status=ok page=today backend={} tasks={} categories={}",
            self.backend,
            tasks.len(),
            categories.len()
        );
        Ok(TodayView {
            progress: daily_progress(&tasks, today),
            counts: range_counts(&tasks, today),
            total: tasks.len(),
            filter_active: filter.is_active(),
            tasks: filter.apply(&tasks, today),
            categories,
        })
    }

    pub async fn load_notes(&self, query: &NoteQuery) -> Result<NotesView, AppError> {
        let (notes, folders, tags) = tokio::try_join!(
            self.notes.query(query),
            self.notes.folders(),
            self.notes.tags()
        )?;
        log::debug!(
            "event=page_load module=app status=ok page=notes backend={} notes={}",
            self.backend,
            notes.len()
        );
        Ok(NotesView {
            notes,
            folders,
            tags,
        })
    }

    /// Open tasks filed under the category's name.
    pub async fn open_tasks_in(&self, category: &Category) -> Result<usize, AppError> {
        let tasks = self.tasks.get_all().await?;
        Ok(tasks
            .iter()
            .filter(|task| !task.completed && task.category == category.name)
            .count())
    }
}

use super::{ensure_non_empty, log_failure};
use crate::error::AppError;
use crate::model::{normalize_tags, Task, TaskChanges, TaskInput, DEFAULT_CATEGORY};
use crate::store::Store;

pub struct TaskService<S> {
    store: S,
}

impl<S: Store<Item = Task>> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Task>, AppError> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Task, AppError> {
        self.store.get(id).await
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        ensure_non_empty("task title", &input.title)?;
        let input = normalize_input(input);
        let task = self
            .store
            .create(input)
            .await
            .map_err(|err| log_failure("task_create", None, err))?;
        log::info!(
            "event=task_create module=service status=ok id={} priority={} due={}",
            task.id,
            task.priority.as_str(),
            task.due_date
                .map(|due| due.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Ok(task)
    }

    pub async fn update(&self, id: i64, changes: TaskChanges) -> Result<Task, AppError> {
        if let Some(title) = &changes.title {
            ensure_non_empty("task title", title)?;
        }
        if changes.is_empty() {
            return Err(AppError::InvalidInput("no task changes provided".to_string()));
        }
        let changes = normalize_changes(changes);
        let task = self
            .store
            .update(id, changes)
            .await
            .map_err(|err| log_failure("task_update", Some(id), err))?;
        log::info!("event=task_update module=service status=ok id={}", task.id);
        Ok(task)
    }

    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<Task, AppError> {
        self.update(
            id,
            TaskChanges {
                completed: Some(completed),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn toggle_complete(&self, id: i64) -> Result<Task, AppError> {
        let task = self.get_by_id(id).await?;
        self.set_completed(id, !task.completed).await
    }

    pub async fn delete(&self, id: i64) -> Result<Task, AppError> {
        let task = self
            .store
            .delete(id)
            .await
            .map_err(|err| log_failure("task_delete", Some(id), err))?;
        log::info!("event=task_delete module=service status=ok id={id}");
        Ok(task)
    }
}

fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_input(input: TaskInput) -> TaskInput {
    TaskInput {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        category: normalize_category(&input.category),
        tags: normalize_tags(&input.tags),
        ..input
    }
}

fn normalize_changes(changes: TaskChanges) -> TaskChanges {
    TaskChanges {
        title: changes.title.map(|title| title.trim().to_string()),
        description: changes
            .description
            .map(|description| description.trim().to_string()),
        category: changes.category.as_deref().map(normalize_category),
        tags: changes.tags.map(normalize_tags),
        ..changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn service() -> TaskService<MemoryStore<Task>> {
        TaskService::new(MemoryStore::new(Duration::ZERO))
    }

    fn quick_add(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: "  details  ".to_string(),
            priority: Priority::High,
            category: "Work".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 11),
            completed: false,
            tags: vec!["a".to_string(), " b ".to_string(), "a".to_string()],
        }
    }

    #[tokio::test]
    async fn create_then_fetch_returns_input_with_id_and_timestamps() {
        let service = service();
        let created = service.create(quick_add("Ship release")).await.expect("create");
        let fetched = service.get_by_id(created.id).await.expect("fetch");

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Ship release");
        assert_eq!(fetched.description, "details");
        assert_eq!(fetched.priority, Priority::High);
        assert_eq!(fetched.category, "Work");
        assert_eq!(fetched.due_date, NaiveDate::from_ymd_opt(2024, 6, 11));
        assert_eq!(fetched.tags, vec!["a", "b"]);
        assert!(!fetched.completed);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let err = service().create(quick_add("   ")).await.unwrap_err();
        match err {
            AppError::InvalidInput(message) => {
                assert!(message.contains("task title cannot be empty"));
            }
            _ => panic!("unexpected error type"),
        }
    }

    #[tokio::test]
    async fn blank_category_falls_back_to_general() {
        let mut input = quick_add("Errand");
        input.category = "  ".to_string();
        let task = service().create(input).await.expect("create");
        assert_eq!(task.category, "General");
    }

    #[tokio::test]
    async fn toggle_complete_flips_state() {
        let service = service();
        let task = service.create(quick_add("Stretch")).await.expect("create");
        let done = service.toggle_complete(task.id).await.expect("toggle");
        assert!(done.completed);
        let reopened = service.toggle_complete(task.id).await.expect("toggle");
        assert!(!reopened.completed);
    }

    #[tokio::test]
    async fn update_rejects_empty_changes_and_blank_title() {
        let service = service();
        let task = service.create(quick_add("Keep")).await.expect("create");

        let err = service
            .update(task.id, TaskChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .update(
                task.id,
                TaskChanges {
                    title: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let after = service.get_by_id(task.id).await.expect("fetch");
        assert_eq!(after.title, "Keep");
    }

    #[tokio::test]
    async fn delete_missing_task_is_not_found() {
        let err = service().delete(404).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: task id 404");
    }
}

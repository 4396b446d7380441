use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, EntityTrait, QueryOrder, Set,
};

use super::{Backend, Record, Store};
use crate::entities::{category, note, task};
use crate::error::AppError;
use crate::model::{
    Category, CategoryChanges, CategoryInput, Note, NoteChanges, NoteInput, Priority, Task,
    TaskChanges, TaskInput,
};

/// Record variant: each entity lives in its own SQLite table.
#[derive(Clone)]
pub struct RecordsBackend {
    db: DatabaseConnection,
}

impl RecordsBackend {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl Backend for RecordsBackend {
    type Tasks = TaskRecords;
    type Categories = CategoryRecords;
    type Notes = NoteRecords;

    fn name(&self) -> &'static str {
        "records"
    }

    fn tasks(&self) -> TaskRecords {
        TaskRecords {
            db: self.db.clone(),
        }
    }

    fn categories(&self) -> CategoryRecords {
        CategoryRecords {
            db: self.db.clone(),
        }
    }

    fn notes(&self) -> NoteRecords {
        NoteRecords {
            db: self.db.clone(),
        }
    }
}

/// List columns hold a JSON array, so entries may contain commas.
fn encode_list(values: &[String]) -> Result<String, AppError> {
    Ok(serde_json::to_string(values)?)
}

fn decode_list(raw: &str) -> Result<Vec<String>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

#[derive(Clone)]
pub struct TaskRecords {
    db: DatabaseConnection,
}

impl TaskRecords {
    async fn find(&self, id: i64) -> Result<task::Model, AppError> {
        task::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(Task::KIND, id))
    }
}

fn task_from_model(model: task::Model) -> Result<Task, AppError> {
    let priority = Priority::parse(&model.priority).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "task id {} has unknown priority `{}`",
            model.id, model.priority
        ))
    })?;
    Ok(Task {
        id: model.id,
        title: model.title,
        description: model.description,
        priority,
        category: model.category,
        due_date: model.due_date,
        completed: model.completed,
        tags: decode_list(&model.tags)?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn task_active(task: &Task) -> Result<task::ActiveModel, AppError> {
    Ok(task::ActiveModel {
        id: NotSet,
        title: Set(task.title.clone()),
        description: Set(task.description.clone()),
        priority: Set(task.priority.as_str().to_string()),
        category: Set(task.category.clone()),
        due_date: Set(task.due_date),
        completed: Set(task.completed),
        tags: Set(encode_list(&task.tags)?),
        created_at: Set(task.created_at),
        updated_at: Set(task.updated_at),
    })
}

impl Store for TaskRecords {
    type Item = Task;

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let models = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(task_from_model).collect()
    }

    async fn get(&self, id: i64) -> Result<Task, AppError> {
        task_from_model(self.find(id).await?)
    }

    async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        let draft = Task::from_input(0, input, Utc::now());
        let insert = task::Entity::insert(task_active(&draft)?)
            .exec(&self.db)
            .await?;
        let created = task::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("task not found after insert".to_string()))?;
        task_from_model(created)
    }

    async fn update(&self, id: i64, changes: TaskChanges) -> Result<Task, AppError> {
        let mut current = task_from_model(self.find(id).await?)?;
        current.apply(changes, Utc::now());
        let mut active = task_active(&current)?;
        active.id = Set(id);
        task_from_model(active.update(&self.db).await?)
    }

    async fn delete(&self, id: i64) -> Result<Task, AppError> {
        let removed = task_from_model(self.find(id).await?)?;
        task::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(removed)
    }
}

#[derive(Clone)]
pub struct CategoryRecords {
    db: DatabaseConnection,
}

impl CategoryRecords {
    async fn find(&self, id: i64) -> Result<category::Model, AppError> {
        category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(Category::KIND, id))
    }
}

fn category_from_model(model: category::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        color: model.color,
        icon: model.icon,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn category_active(category: &Category) -> category::ActiveModel {
    category::ActiveModel {
        id: NotSet,
        name: Set(category.name.clone()),
        color: Set(category.color.clone()),
        icon: Set(category.icon.clone()),
        created_at: Set(category.created_at),
        updated_at: Set(category.updated_at),
    }
}

impl Store for CategoryRecords {
    type Item = Category;

    async fn list(&self) -> Result<Vec<Category>, AppError> {
        let models = category::Entity::find()
            .order_by_desc(category::Column::CreatedAt)
            .order_by_desc(category::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn get(&self, id: i64) -> Result<Category, AppError> {
        Ok(category_from_model(self.find(id).await?))
    }

    async fn create(&self, input: CategoryInput) -> Result<Category, AppError> {
        let draft = Category::from_input(0, input, Utc::now());
        let insert = category::Entity::insert(category_active(&draft))
            .exec(&self.db)
            .await?;
        let created = category::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("category not found after insert".to_string()))?;
        Ok(category_from_model(created))
    }

    async fn update(&self, id: i64, changes: CategoryChanges) -> Result<Category, AppError> {
        let mut current = category_from_model(self.find(id).await?);
        current.apply(changes, Utc::now());
        let mut active = category_active(&current);
        active.id = Set(id);
        Ok(category_from_model(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i64) -> Result<Category, AppError> {
        let removed = category_from_model(self.find(id).await?);
        category::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(removed)
    }
}

#[derive(Clone)]
pub struct NoteRecords {
    db: DatabaseConnection,
}

impl NoteRecords {
    async fn find(&self, id: i64) -> Result<note::Model, AppError> {
        note::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(Note::KIND, id))
    }
}

fn note_from_model(model: note::Model) -> Result<Note, AppError> {
    Ok(Note {
        id: model.id,
        title: model.title,
        content: model.content,
        folder: model.folder,
        tags: decode_list(&model.tags)?,
        is_pinned: model.is_pinned,
        shared_with: decode_list(&model.shared_with)?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn note_active(note: &Note) -> Result<note::ActiveModel, AppError> {
    Ok(note::ActiveModel {
        id: NotSet,
        title: Set(note.title.clone()),
        content: Set(note.content.clone()),
        folder: Set(note.folder.clone()),
        tags: Set(encode_list(&note.tags)?),
        is_pinned: Set(note.is_pinned),
        shared_with: Set(encode_list(&note.shared_with)?),
        created_at: Set(note.created_at),
        updated_at: Set(note.updated_at),
    })
}

impl Store for NoteRecords {
    type Item = Note;

    async fn list(&self) -> Result<Vec<Note>, AppError> {
        let models = note::Entity::find()
            .order_by_desc(note::Column::CreatedAt)
            .order_by_desc(note::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(note_from_model).collect()
    }

    async fn get(&self, id: i64) -> Result<Note, AppError> {
        note_from_model(self.find(id).await?)
    }

    async fn create(&self, input: NoteInput) -> Result<Note, AppError> {
        let draft = Note::from_input(0, input, Utc::now());
        let insert = note::Entity::insert(note_active(&draft)?)
            .exec(&self.db)
            .await?;
        let created = note::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("note not found after insert".to_string()))?;
        note_from_model(created)
    }

    async fn update(&self, id: i64, changes: NoteChanges) -> Result<Note, AppError> {
        let mut current = note_from_model(self.find(id).await?)?;
        current.apply(changes, Utc::now());
        let mut active = note_active(&current)?;
        active.id = Set(id);
        note_from_model(active.update(&self.db).await?)
    }

    async fn delete(&self, id: i64) -> Result<Note, AppError> {
        let removed = note_from_model(self.find(id).await?)?;
        note::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(removed)
    }
}

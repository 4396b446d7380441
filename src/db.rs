use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use url::Url;

use crate::entities::{category, note, task};
use crate::error::AppError;

pub fn resolve_db_path(home: &Path) -> PathBuf {
    home.join("taskflow.db")
}

pub fn resolve_log_dir(home: &Path) -> PathBuf {
    home.join("logs")
}

pub fn resolve_export_dir(home: &Path) -> PathBuf {
    home.join("exports")
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn open_lock(path: &Path) -> Result<fd_lock::RwLock<File>, AppError> {
    let lock_path = path.with_extension("lock");
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    Ok(fd_lock::RwLock::new(file))
}

pub async fn connect(path: &Path) -> Result<DatabaseConnection, AppError> {
    let mut url = Url::from_file_path(path)
        .map_err(|_| AppError::InvalidInput(format!("invalid sqlite path: {}", path.display())))?;
    url.set_query(Some("mode=rwc"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);
    Ok(Database::connect(&sqlite_url).await?)
}

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), AppError> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut task_stmt = schema.create_table_from_entity(task::Entity);
    task_stmt.if_not_exists();
    db.execute(builder.build(&task_stmt)).await?;

    let mut category_stmt = schema.create_table_from_entity(category::Entity);
    category_stmt.if_not_exists();
    db.execute(builder.build(&category_stmt)).await?;

    let mut note_stmt = schema.create_table_from_entity(note::Entity);
    note_stmt.if_not_exists();
    db.execute(builder.build(&note_stmt)).await?;

    let mut due_index = Index::create()
        .name("idx_tasks_due_date")
        .table(task::Entity)
        .col(task::Column::DueDate)
        .to_owned();
    due_index.if_not_exists();
    db.execute(builder.build(&due_index)).await?;

    let mut folder_index = Index::create()
        .name("idx_notes_folder")
        .table(note::Entity)
        .col(note::Column::Folder)
        .to_owned();
    folder_index.if_not_exists();
    db.execute(builder.build(&folder_index)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let db_path = resolve_db_path(dir.path());
        ensure_parent_dir(&db_path).expect("ensure parent");
        let db = connect(&db_path).await.expect("connect db");
        ensure_schema(&db).await.expect("first schema");
        ensure_schema(&db).await.expect("second schema");
        assert!(db_path.exists());
    }

    #[test]
    fn lock_file_sits_next_to_database() {
        let dir = TempDir::new().expect("temp dir");
        let db_path = resolve_db_path(dir.path());
        let mut lock = open_lock(&db_path).expect("open lock");
        let _guard = lock.write().expect("write lock");
        assert!(dir.path().join("taskflow.lock").exists());
    }
}

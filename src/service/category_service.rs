use once_cell::sync::Lazy;
use regex::Regex;

use super::{ensure_non_empty, log_failure};
use crate::error::AppError;
use crate::model::{Category, CategoryChanges, CategoryInput};
use crate::store::Store;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

pub struct CategoryService<S> {
    store: S,
}

impl<S: Store<Item = Category>> CategoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Sorted by name, case-insensitive, ties broken by id.
    pub async fn get_all(&self) -> Result<Vec<Category>, AppError> {
        let mut categories = self.store.list().await?;
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Category, AppError> {
        self.store.get(id).await
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Category, AppError> {
        ensure_non_empty("category name", &input.name)?;
        ensure_color(&input.color)?;
        ensure_non_empty("category icon", &input.icon)?;
        let input = CategoryInput {
            name: input.name.trim().to_string(),
            color: input.color.trim().to_string(),
            icon: input.icon.trim().to_string(),
        };
        let category = self
            .store
            .create(input)
            .await
            .map_err(|err| log_failure("category_create", None, err))?;
        log::info!(
            "event=category_create module=service status=ok id={}",
            category.id
        );
        Ok(category)
    }

    pub async fn update(&self, id: i64, changes: CategoryChanges) -> Result<Category, AppError> {
        if let Some(name) = &changes.name {
            ensure_non_empty("category name", name)?;
        }
        if let Some(color) = &changes.color {
            ensure_color(color)?;
        }
        if let Some(icon) = &changes.icon {
            ensure_non_empty("category icon", icon)?;
        }
        let changes = CategoryChanges {
            name: changes.name.map(|name| name.trim().to_string()),
            color: changes.color.map(|color| color.trim().to_string()),
            icon: changes.icon.map(|icon| icon.trim().to_string()),
        };
        let category = self
            .store
            .update(id, changes)
            .await
            .map_err(|err| log_failure("category_update", Some(id), err))?;
        log::info!("event=category_update module=service status=ok id={id}");
        Ok(category)
    }

    pub async fn delete(&self, id: i64) -> Result<Category, AppError> {
        let category = self
            .store
            .delete(id)
            .await
            .map_err(|err| log_failure("category_delete", Some(id), err))?;
        log::info!("event=category_delete module=service status=ok id={id}");
        Ok(category)
    }
}

fn ensure_color(color: &str) -> Result<(), AppError> {
    if HEX_COLOR_RE.is_match(color.trim()) {
        return Ok(());
    }
    Err(AppError::InvalidInput(format!(
        "category color must look like #RRGGBB, got `{color}`"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON};
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn service() -> CategoryService<MemoryStore<Category>> {
        CategoryService::new(MemoryStore::new(Duration::ZERO))
    }

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            icon: DEFAULT_CATEGORY_ICON.to_string(),
        }
    }

    #[tokio::test]
    async fn get_all_orders_by_name() {
        let service = service();
        for name in ["work", "Errands", "home"] {
            service.create(input(name)).await.expect("create");
        }
        let names: Vec<String> = service
            .get_all()
            .await
            .expect("list")
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, vec!["Errands", "home", "work"]);
    }

    #[tokio::test]
    async fn create_rejects_bad_color() {
        let mut bad = input("Work");
        bad.color = "purple".to_string();
        let err = service().create(bad).await.unwrap_err();
        match err {
            AppError::InvalidInput(message) => assert!(message.contains("#RRGGBB")),
            _ => panic!("unexpected error type"),
        }
    }

    #[tokio::test]
    async fn update_trims_and_keeps_other_fields() {
        let service = service();
        let created = service.create(input("Work")).await.expect("create");
        let updated = service
            .update(
                created.id,
                CategoryChanges {
                    name: Some("  Office ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.name, "Office");
        assert_eq!(updated.color, created.color);
        assert_eq!(updated.icon, created.icon);
    }

    #[tokio::test]
    async fn delete_missing_category_is_not_found() {
        assert!(service().delete(3).await.unwrap_err().is_not_found());
    }
}

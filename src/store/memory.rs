use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{Backend, Record, Store};
use crate::error::AppError;
use crate::model::{Category, Note, Task};

const TASK_FIXTURES: &str = include_str!("../../fixtures/tasks.json");
const CATEGORY_FIXTURES: &str = include_str!("../../fixtures/categories.json");
const NOTE_FIXTURES: &str = include_str!("../../fixtures/notes.json");

struct Inner<R> {
    items: Vec<R>,
    next_id: i64,
}

/// Vector-backed store; every call sleeps for `latency` first.
pub struct MemoryStore<R> {
    inner: Arc<Mutex<Inner<R>>>,
    latency: Duration,
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            latency: self.latency,
        }
    }
}

impl<R: Record> MemoryStore<R> {
    #[cfg(test)]
    pub fn new(latency: Duration) -> Self {
        Self::seeded(Vec::new(), latency)
    }

    pub fn seeded(items: Vec<R>, latency: Duration) -> Self {
        let next_id = items.iter().map(Record::id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Mutex::new(Inner { items, next_id })),
            latency,
        }
    }

    pub fn from_json(raw: &str, latency: Duration) -> Result<Self, AppError>
    where
        R: DeserializeOwned,
    {
        let items: Vec<R> = serde_json::from_str(raw)?;
        Ok(Self::seeded(items, latency))
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl<R: Record> Store for MemoryStore<R> {
    type Item = R;

    async fn list(&self) -> Result<Vec<R>, AppError> {
        self.simulate_latency().await;
        let inner = self.inner.lock().await;
        Ok(inner.items.clone())
    }

    async fn get(&self, id: i64) -> Result<R, AppError> {
        self.simulate_latency().await;
        let inner = self.inner.lock().await;
        inner
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(R::KIND, id))
    }

    async fn create(&self, input: R::Input) -> Result<R, AppError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let record = R::from_input(id, input, Utc::now());
        inner.items.insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, changes: R::Changes) -> Result<R, AppError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        let record = inner
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| AppError::not_found(R::KIND, id))?;
        record.apply(changes, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<R, AppError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        let index = inner
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| AppError::not_found(R::KIND, id))?;
        Ok(inner.items.remove(index))
    }
}

/// Mock variant: three vectors seeded from the bundled fixtures.
#[derive(Clone)]
pub struct MemoryBackend {
    tasks: MemoryStore<Task>,
    categories: MemoryStore<Category>,
    notes: MemoryStore<Note>,
}

impl MemoryBackend {
    #[cfg(test)]
    pub fn empty(latency: Duration) -> Self {
        Self {
            tasks: MemoryStore::new(latency),
            categories: MemoryStore::new(latency),
            notes: MemoryStore::new(latency),
        }
    }

    pub fn with_fixtures(latency: Duration) -> Result<Self, AppError> {
        Ok(Self {
            tasks: MemoryStore::from_json(TASK_FIXTURES, latency)?,
            categories: MemoryStore::from_json(CATEGORY_FIXTURES, latency)?,
            notes: MemoryStore::from_json(NOTE_FIXTURES, latency)?,
        })
    }
}

impl Backend for MemoryBackend {
    type Tasks = MemoryStore<Task>;
    type Categories = MemoryStore<Category>;
    type Notes = MemoryStore<Note>;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn tasks(&self) -> Self::Tasks {
        self.tasks.clone()
    }

    fn categories(&self) -> Self::Categories {
        self.categories.clone()
    }

    fn notes(&self) -> Self::Notes {
        self.notes.clone()
    }
}

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::log_failure;
use crate::error::AppError;
use crate::export;
use crate::model::{
    normalize_tags, ExportFormat, Note, NoteChanges, NoteInput, NoteQuery, DEFAULT_NOTE_FOLDER,
    DEFAULT_NOTE_TITLE,
};
use crate::store::Store;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub struct NoteService<S> {
    store: S,
}

impl<S: Clone> Clone for NoteService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store<Item = Note>> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Pinned notes first, then most recently updated.
    pub async fn get_all(&self) -> Result<Vec<Note>, AppError> {
        let mut notes = self.store.list().await?;
        sort_for_sidebar(&mut notes);
        Ok(notes)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Note, AppError> {
        self.store.get(id).await
    }

    pub async fn query(&self, query: &NoteQuery) -> Result<Vec<Note>, AppError> {
        let notes = self.get_all().await?;
        Ok(notes
            .into_iter()
            .filter(|note| note_matches(note, query))
            .collect())
    }

    /// Matches title, content or any tag; an empty query returns every note.
    pub async fn search(&self, text: &str) -> Result<Vec<Note>, AppError> {
        self.query(&NoteQuery {
            search: Some(text.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn get_by_folder(&self, folder: &str) -> Result<Vec<Note>, AppError> {
        self.query(&NoteQuery {
            folder: Some(folder.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn get_by_tag(&self, tag: &str) -> Result<Vec<Note>, AppError> {
        self.query(&NoteQuery {
            tags: normalize_tags([tag]),
            ..Default::default()
        })
        .await
    }

    pub async fn folders(&self) -> Result<Vec<String>, AppError> {
        let notes = self.store.list().await?;
        let folders: BTreeSet<String> = notes.into_iter().map(|note| note.folder).collect();
        Ok(folders.into_iter().collect())
    }

    pub async fn tags(&self) -> Result<Vec<String>, AppError> {
        let notes = self.store.list().await?;
        let tags: BTreeSet<String> = notes.into_iter().flat_map(|note| note.tags).collect();
        Ok(tags.into_iter().collect())
    }

    pub async fn create(&self, input: NoteInput) -> Result<Note, AppError> {
        let input = NoteInput {
            title: or_default(&input.title, DEFAULT_NOTE_TITLE),
            folder: or_default(&input.folder, DEFAULT_NOTE_FOLDER),
            tags: normalize_tags(&input.tags),
            content: input.content,
        };
        let note = self
            .store
            .create(input)
            .await
            .map_err(|err| log_failure("note_create", None, err))?;
        log::info!(
            "event=note_create module=service status=ok id={} folder={}",
            note.id,
            note.folder
        );
        Ok(note)
    }

    pub async fn update(&self, id: i64, changes: NoteChanges) -> Result<Note, AppError> {
        if changes.is_empty() {
            return Err(AppError::InvalidInput("no note changes provided".to_string()));
        }
        let changes = NoteChanges {
            folder: changes
                .folder
                .map(|folder| or_default(&folder, DEFAULT_NOTE_FOLDER)),
            tags: changes.tags.map(normalize_tags),
            ..changes
        };
        let note = self
            .store
            .update(id, changes)
            .await
            .map_err(|err| log_failure("note_update", Some(id), err))?;
        log::info!(
            "event=note_update module=service status=ok id={} content_chars={}",
            note.id,
            note.content.chars().count()
        );
        Ok(note)
    }

    pub async fn toggle_pin(&self, id: i64) -> Result<Note, AppError> {
        let note = self.get_by_id(id).await?;
        self.update(
            id,
            NoteChanges {
                is_pinned: Some(!note.is_pinned),
                ..Default::default()
            },
        )
        .await
    }

    /// Replaces the share list; an empty list stops sharing.
    pub async fn share(&self, id: i64, emails: &[String]) -> Result<Note, AppError> {
        let mut recipients = Vec::new();
        for email in emails {
            let email = email.trim();
            if email.is_empty() {
                continue;
            }
            if !EMAIL_RE.is_match(email) {
                return Err(AppError::InvalidInput(format!(
                    "invalid email address `{email}`"
                )));
            }
            if !recipients.iter().any(|known: &String| known == email) {
                recipients.push(email.to_string());
            }
        }
        self.update(
            id,
            NoteChanges {
                shared_with: Some(recipients),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn export(&self, id: i64, format: ExportFormat) -> Result<String, AppError> {
        let note = self.get_by_id(id).await?;
        let rendered = export::render(&note, format)?;
        log::info!(
            "event=note_export module=service status=ok id={id} format={}",
            format.as_str()
        );
        Ok(rendered)
    }

    pub async fn delete(&self, id: i64) -> Result<Note, AppError> {
        let note = self
            .store
            .delete(id)
            .await
            .map_err(|err| log_failure("note_delete", Some(id), err))?;
        log::info!("event=note_delete module=service status=ok id={id}");
        Ok(note)
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn sort_for_sidebar(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then(b.updated_at.cmp(&a.updated_at))
            .then(b.id.cmp(&a.id))
    });
}

fn note_matches(note: &Note, query: &NoteQuery) -> bool {
    if let Some(text) = query.search.as_deref().map(str::trim) {
        if !text.is_empty() {
            let needle = text.to_lowercase();
            let hit = note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
                || note
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
    }

    if let Some(folder) = query.folder.as_deref().map(str::trim) {
        if !folder.is_empty() && note.folder != folder {
            return false;
        }
    }

    query.tags.iter().all(|tag| note.tags.contains(tag))
}

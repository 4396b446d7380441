//! Debounced note auto-save.
//!
//! Edits are queued on a channel. The worker holds at most one pending edit;
//! every new edit for the same note folds into it and restarts the window.
//! Only when the window passes quietly is the pending edit written.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::model::{Note, NoteChanges};
use crate::service::NoteService;
use crate::store::Store;

pub const DEFAULT_AUTOSAVE_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Default)]
pub struct AutosaveReport {
    pub saves: usize,
    pub failures: usize,
    pub last_saved: Option<Note>,
}

struct PendingEdit {
    note_id: i64,
    changes: NoteChanges,
}

pub struct AutoSaver {
    tx: mpsc::UnboundedSender<PendingEdit>,
    worker: JoinHandle<AutosaveReport>,
}

impl AutoSaver {
    pub fn spawn<S>(service: NoteService<S>, window: Duration) -> Self
    where
        S: Store<Item = Note>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(service, rx, window));
        Self { tx, worker }
    }

    /// Queues an edit; it is written once no further edit arrives within the window.
    pub fn schedule(&self, note_id: i64, changes: NoteChanges) -> Result<(), AppError> {
        self.tx
            .send(PendingEdit { note_id, changes })
            .map_err(|_| AppError::Background("auto-save worker has stopped".to_string()))
    }

    /// Flushes any pending edit and waits for the worker to stop.
    pub async fn finish(self) -> Result<AutosaveReport, AppError> {
        drop(self.tx);
        self.worker
            .await
            .map_err(|err| AppError::Background(err.to_string()))
    }
}

async fn run_worker<S>(
    service: NoteService<S>,
    mut rx: mpsc::UnboundedReceiver<PendingEdit>,
    window: Duration,
) -> AutosaveReport
where
    S: Store<Item = Note>,
{
    let mut report = AutosaveReport::default();
    let mut pending: Option<PendingEdit> = None;

    loop {
        let Some(mut edit) = pending.take() else {
            match rx.recv().await {
                Some(edit) => {
                    pending = Some(edit);
                    continue;
                }
                None => break,
            }
        };

        tokio::select! {
            next = rx.recv() => match next {
                Some(next) if next.note_id == edit.note_id => {
                    edit.changes.merge(next.changes);
                    pending = Some(edit);
                }
                Some(next) => {
                    save(&service, edit, &mut report).await;
                    pending = Some(next);
                }
                None => {
                    save(&service, edit, &mut report).await;
                    break;
                }
            },
            _ = tokio::time::sleep(window) => {
                save(&service, edit, &mut report).await;
            }
        }
    }

    report
}

async fn save<S>(service: &NoteService<S>, edit: PendingEdit, report: &mut AutosaveReport)
where
    S: Store<Item = Note>,
{
    if edit.changes.is_empty() {
        return;
    }
    match service.update(edit.note_id, edit.changes).await {
        Ok(note) => {
            log::debug!(
                "event=note_autosave module=autosave status=ok id={}",
                note.id
            );
            report.saves += 1;
            report.last_saved = Some(note);
        }
        Err(err) => {
            log::error!(
                "event=note_autosave module=autosave status=error id={} error={}",
                edit.note_id,
                err
            );
            report.failures += 1;
        }
    }
}

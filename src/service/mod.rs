//! Use-case services over a `Store`.
//!
//! Services validate and normalize input, call the store, and log one
//! `event=` line per mutation. Reads are passed through unchanged.

pub mod category_service;
pub mod note_service;
pub mod task_service;

pub use category_service::CategoryService;
pub use note_service::NoteService;
pub use task_service::TaskService;

use crate::error::AppError;

fn ensure_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{label} cannot be empty")));
    }
    Ok(())
}

/// Logs a failed mutation and hands the error back to the caller.
fn log_failure(event: &str, id: Option<i64>, err: AppError) -> AppError {
    match id {
        Some(id) => log::warn!("event={event} module=service status=error id={id} error={err}"),
        None => log::warn!("event={event} module=service status=error error={err}"),
    }
    err
}

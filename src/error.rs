use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", Multiline("Not found", .0))]
    NotFound(String),
    #[error("{}", Multiline("Invalid input", .0))]
    InvalidInput(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("background task failed: {0}")]
    Background(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: i64) -> Self {
        Self::NotFound(format!("{kind} id {id}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

struct Multiline<'a>(&'a str, &'a str);

impl fmt::Display for Multiline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Multiline(label, message) = self;
        if message.contains('\n') {
            write!(f, "{label}:\n{message}")
        } else {
            write!(f, "{label}: {message}")
        }
    }
}

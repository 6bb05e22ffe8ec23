use thiserror::Error;

/// Errors returned by repository and engine operations
#[derive(Debug, Error)]
pub enum TodoError {
    /// Malformed input: a field is out of its domain or a required field is missing
    #[error("{0}")]
    Validation(String),

    /// A referenced id does not exist
    #[error("{0}")]
    NotFound(String),

    /// A storage constraint was violated (duplicate tag, foreign key, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TodoError>;

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        TodoError::Validation(message.into())
    }

    pub fn todo_not_found(id: i64) -> Self {
        TodoError::NotFound(format!("Todo {} not found", id))
    }

    /// True for errors caused by the caller's input rather than the store
    pub fn is_user_error(&self) -> bool {
        !matches!(self, TodoError::Database(_))
    }
}

impl From<rusqlite::Error> for TodoError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, message) = &err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| code.to_string());
                return TodoError::Conflict(detail);
            }
        }
        TodoError::Database(err)
    }
}

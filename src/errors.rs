use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("UNKNOWN_MODULE: {0}")]
    UnknownModule(String),
    #[error("UNKNOWN_DIALOG: {0}")]
    UnknownDialogType(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INVALID_VALUE: {0}")]
    InvalidValue(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

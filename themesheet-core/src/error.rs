//! Error types for theme resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes for theme engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found or unreadable (-1)
    Io = -1,
    /// Malformed JSON input (-2)
    Json = -2,
    /// Unregistered composable id (E100)
    UnknownComposable = 100,
    /// Composable registered twice (E101)
    DuplicateComposable = 101,
    /// Composable resolution failed (E102)
    Composition = 102,
    /// Code override failed to parse or evaluate (E200)
    CodeEvaluation = 200,
    /// DSL placeholder could not be hydrated (E201)
    Hydration = 201,
    /// Unknown template reference (E300)
    UnknownTemplate = 300,
    /// Composable selection envelope rejected (E301)
    InvalidSelection = 301,
    /// Design record rejected (E302)
    InvalidDesign = 302,
}

/// Main error type for the theme engine.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Unknown composable: {id}")]
    UnknownComposable { id: String },

    #[error("Composable '{id}' is already registered")]
    DuplicateComposable { id: String },

    #[error("Composable '{id}' failed to resolve: {message}")]
    Composition { id: String, message: String },

    #[error("Code override error: {message}")]
    CodeEvaluation { message: String },

    #[error("Cannot hydrate '{placeholder}': {message}")]
    Hydration { placeholder: String, message: String },

    #[error("Unknown template: {id}")]
    UnknownTemplate { id: String },

    #[error("Invalid composable selection: {message}")]
    InvalidSelection { message: String },

    #[error("Invalid design record {path}: {message}")]
    InvalidDesign { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ThemeError {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ThemeError::UnknownComposable { .. } => ErrorCode::UnknownComposable,
            ThemeError::DuplicateComposable { .. } => ErrorCode::DuplicateComposable,
            ThemeError::Composition { .. } => ErrorCode::Composition,
            ThemeError::CodeEvaluation { .. } => ErrorCode::CodeEvaluation,
            ThemeError::Hydration { .. } => ErrorCode::Hydration,
            ThemeError::UnknownTemplate { .. } => ErrorCode::UnknownTemplate,
            ThemeError::InvalidSelection { .. } => ErrorCode::InvalidSelection,
            ThemeError::InvalidDesign { .. } => ErrorCode::InvalidDesign,
            ThemeError::Io(_) => ErrorCode::Io,
            ThemeError::Json(_) => ErrorCode::Json,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }

    /// Whether lenient resolution may swallow this error and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ThemeError::UnknownComposable { .. }
                | ThemeError::Composition { .. }
                | ThemeError::CodeEvaluation { .. }
                | ThemeError::Hydration { .. }
        )
    }
}

/// Error raised by color manipulation helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("Unsupported color '{0}': expected #hex, rgb(), rgba(), hsl() or hsla()")]
    Unsupported(String),

    #[error("Invalid channel value in '{0}'")]
    InvalidChannel(String),
}

/// Result type alias for theme engine operations.
pub type Result<T> = std::result::Result<T, ThemeError>;

use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::{common, ErrorExt};

/// The unified error type for taskshare
#[derive(Error, Debug)]
pub enum TaskShareError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Load error: {message}")]
    Load {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Schema error: {message}")]
    Schema {
        code: u16,
        message: String,
        column: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TaskShareError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a load error with specific code and path
    pub fn load_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Load {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a storage error with specific code and path
    pub fn storage_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a schema error for a missing required column
    pub fn missing_column(column: impl Into<String>) -> Self {
        let column = column.into();
        Self::Schema {
            code: ErrorCode::SCHEMA_MISSING_COLUMN,
            message: format!("required column '{}' is missing", column),
            column: Some(column),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Load { source: src, .. }
            | Self::Storage { source: src, .. }
            | Self::Schema { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Load { message, .. }
            | Self::Storage { message, .. }
            | Self::Schema { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Attach a file path to load and storage errors
    pub fn with_path(mut self, file: impl Into<PathBuf>) -> Self {
        if let Self::Load { path, .. } | Self::Storage { path, .. } = &mut self {
            *path = Some(file.into());
        }
        self
    }

    /// Reclassify this error as a fatal input load fault, keeping its code
    /// when it already is one.
    pub fn into_load_fault(self, file: impl Into<PathBuf>) -> Self {
        if matches!(
            self,
            Self::Load { .. } | Self::Schema { .. } | Self::Config { .. }
        ) {
            return self.with_path(file);
        }
        let message = self.to_string();
        Self::load_with_code(ErrorCode::LOAD_UNREADABLE, message, Some(file.into()))
            .with_source(self)
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Load { .. } => 3,
            Self::Storage { .. } => 4,
            Self::Schema { .. } => 5,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Load { code, .. }
            | Self::Storage { code, .. }
            | Self::Schema { code, .. } => *code,
        }
    }

    /// Path of the file involved, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Load { path, .. } | Self::Storage { path, .. } => path.as_ref(),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Load { message, path, .. } => match path {
                Some(p) => format!("Could not load {}: {}", p.display(), message),
                None => format!("Could not load input: {}", message),
            },
            Self::Storage { message, path, .. } => match path {
                Some(p) => format!("Storage error at {}: {}", p.display(), message),
                None => format!("Storage error: {}", message),
            },
            Self::Schema { message, .. } => format!("Dataset problem: {}", message),
        }
    }
}

impl From<std::io::Error> for TaskShareError {
    fn from(err: std::io::Error) -> Self {
        Self::storage_with_code(ErrorCode::STORAGE_IO_ERROR, err.to_string(), None)
            .with_source(err)
    }
}

impl From<toml::de::Error> for TaskShareError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_PARSE_ERROR, err.to_string()).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, TaskShareError>;

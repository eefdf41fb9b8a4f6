use super::{ErrorCode, TaskShareError};
use std::path::{Path, PathBuf};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to a load error for the file at `path`
    fn to_load_error(self, code: u16, path: &Path) -> Result<T, TaskShareError>;

    /// Convert to a storage error for the file at `path`
    fn to_storage_error(self, code: u16, path: &Path) -> Result<T, TaskShareError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_load_error(self, code: u16, path: &Path) -> Result<T, TaskShareError> {
        self.map_err(|e| {
            let source: Box<dyn std::error::Error + Send + Sync> = e.into();
            TaskShareError::load_with_code(code, source.to_string(), Some(path.to_path_buf()))
                .with_source(source)
        })
    }

    fn to_storage_error(self, code: u16, path: &Path) -> Result<T, TaskShareError> {
        self.map_err(|e| {
            let source: Box<dyn std::error::Error + Send + Sync> = e.into();
            TaskShareError::storage_with_code(code, source.to_string(), Some(path.to_path_buf()))
                .with_source(source)
        })
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for configuration
    pub fn config_not_found(path: impl AsRef<Path>) -> TaskShareError {
        TaskShareError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    /// Create a not found error for the input table
    pub fn input_not_found(path: impl AsRef<Path>) -> TaskShareError {
        TaskShareError::load_with_code(
            ErrorCode::LOAD_NOT_FOUND,
            "input file does not exist",
            Some(path.as_ref().to_path_buf()),
        )
    }

    /// Create an error for a file extension no table reader understands
    pub fn unsupported_format(path: impl AsRef<Path>) -> TaskShareError {
        TaskShareError::load_with_code(
            ErrorCode::LOAD_UNSUPPORTED_FORMAT,
            "unsupported table format (expected xlsx, xlsm, xlsb, xls, ods or csv)",
            Some(path.as_ref().to_path_buf()),
        )
    }

    /// Create a table write failure
    pub fn write_failed(path: Option<PathBuf>, reason: impl Into<String>) -> TaskShareError {
        TaskShareError::storage_with_code(ErrorCode::STORAGE_WRITE_FAILED, reason, path)
    }
}

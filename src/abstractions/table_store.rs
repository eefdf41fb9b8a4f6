//! Table storage abstraction layer
//!
//! Provides trait-based abstraction for reading and writing tables so the
//! pipeline can run against an in-memory store in tests.

use crate::error::{ErrorCode, ErrorExt, Result, TaskShareError};
use crate::table::{self, Dataset};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Trait for table storage operations
pub trait TableStore {
    /// Read a whole table
    fn read_table(&self, path: &Path) -> Result<Dataset>;

    /// Write a whole table, replacing any existing file
    fn write_table(&self, path: &Path, table: &Dataset) -> Result<()>;

    /// Create a directory and its parents if absent
    fn ensure_dir(&self, path: &Path) -> Result<()>;
}

/// Real implementation of TableStore backed by the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTableStore;

impl RealTableStore {
    pub fn new() -> Self {
        Self
    }
}

impl TableStore for RealTableStore {
    fn read_table(&self, path: &Path) -> Result<Dataset> {
        table::read_table(path)
    }

    fn write_table(&self, path: &Path, table: &Dataset) -> Result<()> {
        table::write_table(path, table)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).to_storage_error(ErrorCode::STORAGE_DIR_FAILED, path)
    }
}

/// Mock implementation of TableStore for testing
#[derive(Debug, Default)]
pub struct MockTableStore {
    /// Tables currently "on disk"
    tables: RefCell<BTreeMap<PathBuf, Dataset>>,
    /// Paths whose reads fail
    failing_reads: RefCell<HashSet<PathBuf>>,
    /// Paths whose writes fail
    failing_writes: RefCell<HashSet<PathBuf>>,
    /// Directories created
    dirs: RefCell<Vec<PathBuf>>,
    /// Every successful write, in order
    written: RefCell<Vec<PathBuf>>,
}

impl MockTableStore {
    /// Create a new empty MockTableStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table at a path
    pub fn insert(&self, path: impl Into<PathBuf>, table: Dataset) {
        self.tables.borrow_mut().insert(path.into(), table);
    }

    /// Make reads of a path fail
    pub fn fail_reads_of(&self, path: impl Into<PathBuf>) {
        self.failing_reads.borrow_mut().insert(path.into());
    }

    /// Make writes to a path fail
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing_writes.borrow_mut().insert(path.into());
    }

    /// Table stored at a path, if any
    pub fn table(&self, path: &Path) -> Option<Dataset> {
        self.tables.borrow().get(path).cloned()
    }

    /// Paths written so far, in write order
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.written.borrow().clone()
    }

    /// Directories created so far
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.dirs.borrow().clone()
    }
}

impl TableStore for MockTableStore {
    fn read_table(&self, path: &Path) -> Result<Dataset> {
        if self.failing_reads.borrow().contains(path) {
            return Err(TaskShareError::storage_with_code(
                ErrorCode::STORAGE_READ_FAILED,
                "simulated read failure",
                Some(path.to_path_buf()),
            ));
        }
        self.tables.borrow().get(path).cloned().ok_or_else(|| {
            TaskShareError::load_with_code(
                ErrorCode::LOAD_NOT_FOUND,
                "no table at path",
                Some(path.to_path_buf()),
            )
        })
    }

    fn write_table(&self, path: &Path, table: &Dataset) -> Result<()> {
        if self.failing_writes.borrow().contains(path) {
            return Err(TaskShareError::storage_with_code(
                ErrorCode::STORAGE_WRITE_FAILED,
                "simulated write failure",
                Some(path.to_path_buf()),
            ));
        }
        self.tables
            .borrow_mut()
            .insert(path.to_path_buf(), table.clone());
        self.written.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        self.dirs.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

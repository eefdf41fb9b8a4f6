//! Record of the files written for each owner
//!
//! Every write made by the pipeline is recorded here, and the final pass
//! reads back exactly these files. [`OutputManifest::discover`] rebuilds a
//! manifest from an existing output directory for re-running the final
//! pass on its own.

use super::allocator::Worker;
use super::naming::is_final_file_of;
use crate::error::{ErrorCode, Result, TaskShareError};
use crate::table::TableFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A table written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub owner: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// A file that could not be read or written, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-owner list of written files, in write order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputManifest {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl OutputManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file written for `owner`
    pub fn record(&mut self, owner: &str, path: PathBuf) {
        match self.entries.iter_mut().find(|(o, _)| o == owner) {
            Some((_, files)) => files.push(path),
            None => self.entries.push((owner.to_string(), vec![path])),
        }
    }

    /// Files recorded for `owner`, empty if none
    pub fn files_for(&self, owner: &str) -> &[PathBuf] {
        self.entries
            .iter()
            .find(|(o, _)| o == owner)
            .map(|(_, files)| files.as_slice())
            .unwrap_or(&[])
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|(_, files)| files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }

    /// Rebuild a manifest from files already in `dir`.
    ///
    /// A file belongs to a worker when its name starts with `{name}_`. When
    /// several worker names match, the longest one wins. Final outputs
    /// (`{name}_{final_marker}_…`) and files no table reader understands are
    /// ignored. Files are listed in name order.
    pub fn discover(dir: &Path, workers: &[Worker], final_marker: &str) -> Result<Self> {
        let mut manifest = Self::new();

        for worker in workers {
            let pattern = format!(
                "{}/{}_*",
                glob::Pattern::escape(&dir.to_string_lossy()),
                glob::Pattern::escape(&worker.name)
            );
            let paths = glob::glob(&pattern).map_err(|e| {
                TaskShareError::storage_with_code(
                    ErrorCode::STORAGE_IO_ERROR,
                    format!("invalid discovery pattern for {}: {}", worker.name, e),
                    Some(dir.to_path_buf()),
                )
            })?;

            for entry in paths {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping unreadable directory entry");
                        continue;
                    }
                };
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if TableFormat::from_path(&path).is_none()
                    || is_final_file_of(file_name, &worker.name, final_marker)
                    || longest_owner(file_name, workers) != Some(worker.name.as_str())
                {
                    continue;
                }
                manifest.record(&worker.name, path.clone());
            }
        }

        Ok(manifest)
    }
}

/// Longest worker name `n` such that `file_name` starts with `{n}_`
fn longest_owner<'a>(file_name: &str, workers: &'a [Worker]) -> Option<&'a str> {
    workers
        .iter()
        .map(|w| w.name.as_str())
        .filter(|name| {
            file_name
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('_'))
        })
        .max_by_key(|name| name.len())
}

//! Final per-worker aggregation
//!
//! Concatenates every file recorded for a worker into one final table whose
//! columns are sorted alphabetically.

use super::allocator::Worker;
use super::manifest::{OutputManifest, SkippedFile, WrittenFile};
use super::naming::{final_file_name, RunDate};
use crate::abstractions::TableStore;
use crate::table::{Dataset, TableFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Where and how final files are written
#[derive(Debug, Clone)]
pub struct FinalPassOptions<'a> {
    pub output_dir: &'a Path,
    pub date: &'a RunDate,
    pub final_marker: &'a str,
    pub format: TableFormat,
    pub assignee_column: &'a str,
}

/// Outcome of the final pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPassReport {
    pub written: Vec<WrittenFile>,
    pub skipped: Vec<SkippedFile>,
    /// Workers that ended without a final file
    pub without_output: Vec<String>,
}

/// Concatenate tables, make sure the assignee column exists on every row,
/// then sort the columns alphabetically
pub fn combine_tables(tables: Vec<Dataset>, assignee_column: &str) -> Dataset {
    let normalized = tables.into_iter().map(|mut table| {
        table.ensure_column(assignee_column);
        table
    });
    Dataset::concat(normalized).with_sorted_columns()
}

/// Write one final file per worker from the files recorded in `manifest`.
///
/// Unreadable files are skipped. A worker with nothing to combine gets a
/// diagnostic instead of a file.
pub fn combine_all(
    store: &dyn TableStore,
    manifest: &OutputManifest,
    workers: &[Worker],
    options: &FinalPassOptions<'_>,
) -> FinalPassReport {
    let mut report = FinalPassReport::default();

    for worker in workers {
        let files = manifest.files_for(&worker.name);
        if files.is_empty() {
            info!(worker = %worker.name, "No files found for worker");
            report.without_output.push(worker.name.clone());
            continue;
        }

        let mut tables = Vec::with_capacity(files.len());
        for path in files {
            match store.read_table(path) {
                Ok(table) => tables.push(table),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read file, skipping");
                    report.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if tables.is_empty() {
            info!(worker = %worker.name, "No data to combine for worker");
            report.without_output.push(worker.name.clone());
            continue;
        }

        let combined = combine_tables(tables, options.assignee_column);
        let path = options.output_dir.join(final_file_name(
            &worker.name,
            options.final_marker,
            options.date,
            options.format,
        ));

        match store.write_table(&path, &combined) {
            Ok(()) => {
                info!(
                    worker = %worker.name,
                    path = %path.display(),
                    rows = combined.len(),
                    "Final file written"
                );
                report.written.push(WrittenFile {
                    owner: worker.name.clone(),
                    path,
                    rows: combined.len(),
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write final file");
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                report.without_output.push(worker.name.clone());
            }
        }
    }

    report
}

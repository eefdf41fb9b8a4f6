//! End-to-end distribution run
//!
//! Stages run strictly in order: load, direct filters, allocation, final
//! aggregation. Only a load fault (or an output directory that cannot be
//! created) stops the run. Every other failure is logged, recorded in the
//! [`RunReport`] and skipped.

use crate::abstractions::TableStore;
use crate::config::DistributionConfig;
use crate::distribution::{
    allocate, combine_all, filter_records, output_file_name, AliasTable, AllocationSummary,
    FinalPassOptions, FinalPassReport, OutputManifest, RunDate, SkippedFile, WrittenFile,
};
use crate::error::Result;
use crate::table::{Records, TableFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Paths and stamps for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub date: RunDate,
    pub format: TableFormat,
}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub input_rows: usize,
    pub direct_files: Vec<WrittenFile>,
    pub combined_files: Vec<WrittenFile>,
    pub final_files: Vec<WrittenFile>,
    /// Owners whose filter or combination came out empty, per stage
    pub empty_results: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub allocation: Option<AllocationSummary>,
}

impl RunReport {
    pub fn files_written(&self) -> usize {
        self.direct_files.len() + self.combined_files.len() + self.final_files.len()
    }

    fn absorb_final_pass(&mut self, final_pass: FinalPassReport) {
        self.final_files = final_pass.written;
        self.skipped.extend(final_pass.skipped);
    }
}

/// Writes non-empty tables and records them in the manifest
struct Emitter<'a> {
    store: &'a dyn TableStore,
    output_dir: &'a Path,
    date: &'a RunDate,
    format: TableFormat,
    manifest: OutputManifest,
}

impl Emitter<'_> {
    /// Write `records` as `{owner}_{date}{suffix}`. Empty tables produce a
    /// diagnostic and no file; write failures are recorded and skipped.
    fn emit(
        &mut self,
        records: Records,
        owner: &str,
        suffix: &str,
        report: &mut RunReport,
    ) -> Option<WrittenFile> {
        if records.is_empty() {
            info!(owner, "No data found for owner");
            report.empty_results.push(format!("{}{}", owner, suffix));
            return None;
        }

        let path = self
            .output_dir
            .join(output_file_name(owner, self.date, suffix, self.format));
        let rows = records.len();

        match self.store.write_table(&path, records.dataset()) {
            Ok(()) => {
                info!(owner, path = %path.display(), rows, "File written");
                self.manifest.record(owner, path.clone());
                Some(WrittenFile {
                    owner: owner.to_string(),
                    path,
                    rows,
                })
            }
            Err(e) => {
                warn!(owner, path = %path.display(), error = %e, "Failed to write file, skipping");
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

/// Run every stage against `options.input`.
///
/// Returns `Err` only when the input cannot be loaded or normalized, or the
/// output directory cannot be created.
pub fn run(
    store: &dyn TableStore,
    config: &DistributionConfig,
    options: &RunOptions,
) -> Result<RunReport> {
    store.ensure_dir(&options.output_dir)?;

    let dataset = store
        .read_table(&options.input)
        .map_err(|e| e.into_load_fault(&options.input))?;
    let records = Records::normalize(dataset, &config.columns)
        .map_err(|e| e.into_load_fault(&options.input))?;
    info!(
        path = %options.input.display(),
        rows = records.len(),
        "Loaded input"
    );

    let mut report = RunReport {
        input_rows: records.len(),
        ..RunReport::default()
    };
    let mut emitter = Emitter {
        store,
        output_dir: &options.output_dir,
        date: &options.date,
        format: options.format,
        manifest: OutputManifest::new(),
    };

    // Fixed task categories go wholesale to their owner
    for rule in &config.direct_rules {
        let matched = filter_records(&records, &rule.task_type, None);
        debug!(
            task_type = %rule.task_type,
            owner = %rule.owner,
            rows = matched.len(),
            "Direct rule"
        );
        if let Some(file) = emitter.emit(matched, &rule.owner, "", &mut report) {
            report.direct_files.push(file);
        }
    }

    // Residual category rows each worker already owns by login
    for worker in &config.workers {
        let matched = filter_records(
            &records,
            &config.residual_task_type,
            Some(worker.alias.as_str()),
        );
        if let Some(file) = emitter.emit(matched, &worker.name, "", &mut report) {
            report.direct_files.push(file);
        }
    }

    let aliases = AliasTable::from_workers(&config.workers);
    let allocation = allocate(
        &records,
        &config.residual_task_type,
        &aliases,
        &config.workers,
    );
    if allocation.unclaimed().is_empty() {
        info!(task_type = %config.residual_task_type, "No remaining data to distribute");
    } else {
        for worker in &config.workers {
            let Some(combined) = allocation.combined_for(&worker.name) else {
                continue;
            };
            if let Some(file) = emitter.emit(
                combined,
                &worker.name,
                &config.output.combined_suffix,
                &mut report,
            ) {
                report.combined_files.push(file);
            }
        }
    }
    report.allocation = Some(allocation.summary());

    let final_pass = combine_all(
        store,
        &emitter.manifest,
        &config.workers,
        &FinalPassOptions {
            output_dir: &options.output_dir,
            date: &options.date,
            final_marker: &config.output.final_marker,
            format: options.format,
            assignee_column: &config.columns.assignee,
        },
    );
    report.absorb_final_pass(final_pass);

    Ok(report)
}

/// Re-run only the final aggregation over files already in `output_dir`
pub fn combine_existing(
    store: &dyn TableStore,
    config: &DistributionConfig,
    output_dir: &Path,
    date: &RunDate,
    format: TableFormat,
) -> Result<FinalPassReport> {
    let manifest =
        OutputManifest::discover(output_dir, &config.workers, &config.output.final_marker)?;
    info!(
        dir = %output_dir.display(),
        files = manifest.file_count(),
        "Discovered worker files"
    );

    Ok(combine_all(
        store,
        &manifest,
        &config.workers,
        &FinalPassOptions {
            output_dir,
            date,
            final_marker: &config.output.final_marker,
            format,
            assignee_column: &config.columns.assignee,
        },
    ))
}

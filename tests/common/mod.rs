//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use taskshare::table::{write_table, Cell, ColumnNames, Dataset};
use tempfile::TempDir;

pub const CTP: &str = "Conferência Técnica Preliminar";
pub const DESPACHO: &str = "Despacho / Análise Técnica (Decisão)";

/// Test context builder for setting up input spreadsheets
pub struct TestContextBuilder {
    temp_dir: TempDir,
    inputs: Vec<(PathBuf, Dataset)>,
    config: Option<String>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            inputs: Vec::new(),
            config: None,
        })
    }

    /// Add an input table, written in the format its extension names
    pub fn with_input(mut self, path: impl AsRef<Path>, table: Dataset) -> Self {
        self.inputs.push((path.as_ref().to_path_buf(), table));
        self
    }

    /// Write `taskshare.toml` with the given content
    pub fn with_config(mut self, content: &str) -> Self {
        self.config = Some(content.to_string());
        self
    }

    pub fn build(self) -> Result<TestContext> {
        let path = self.temp_dir.path();

        for (file_path, table) in &self.inputs {
            let full_path = path.join(file_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            write_table(&full_path, table)?;
        }

        if let Some(content) = &self.config {
            fs::write(path.join("taskshare.toml"), content)?;
        }

        Ok(TestContext {
            temp_dir: self.temp_dir,
        })
    }
}

/// Test context that manages temporary directories and cleanup
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("taskshare.toml")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("SAIDA")
    }

    /// Sorted file names in the output directory
    pub fn output_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(self.output_dir())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Task table with a protocol id column plus the default task and login
/// columns
pub fn task_table(rows: &[(&str, &str, &str)]) -> Dataset {
    let columns = ColumnNames::default();
    Dataset::from_rows(
        vec![
            "Protocolo".to_string(),
            columns.task_type.clone(),
            columns.login.clone(),
        ],
        rows.iter()
            .map(|(id, task, login)| vec![Cell::from(*id), Cell::from(*task), Cell::from(*login)])
            .collect(),
    )
}

/// Values of `column` in row order, rendered as text
pub fn column_values(table: &Dataset, column: &str) -> Vec<String> {
    (0..table.len())
        .map(|i| {
            table
                .value(i, column)
                .map(|cell| cell.to_string())
                .unwrap_or_default()
        })
        .collect()
}

pub const SINGLE_WORKER_CONFIG: &str = r#"
residual_task_type = "X"
direct_rules = []

[[workers]]
alias = "FOO"
name = "Foo"
weight = 1
"#;

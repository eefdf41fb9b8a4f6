//! Distribution configuration
//!
//! Configuration is layered: built-in defaults (the reference team and
//! spreadsheet layout), then an optional TOML file, then `TASKSHARE_*`
//! environment variables. The result is validated before use.

use crate::distribution::Worker;
use crate::table::{ColumnNames, TableFormat};
use serde::{Deserialize, Serialize};

pub mod loader;
pub mod validator;

pub use loader::{load_config, load_config_with_env};
pub use validator::ConfigValidator;

/// A task type whose rows all go to one fixed owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectRule {
    pub task_type: String,
    pub owner: String,
}

/// Output naming and format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Suffix of each worker's combined direct + allocated file
    pub combined_suffix: String,
    /// Marker between owner and date in final file names
    pub final_marker: String,
    pub format: TableFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            combined_suffix: "_combinado".to_string(),
            final_marker: "FINAL".to_string(),
            format: TableFormat::Xlsx,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Task type whose unclaimed rows are allocated by weight
    pub residual_task_type: String,
    pub columns: ColumnNames,
    pub direct_rules: Vec<DirectRule>,
    /// Workers in allocation order
    pub workers: Vec<Worker>,
    pub output: OutputConfig,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            residual_task_type: "Conferência Técnica Preliminar".to_string(),
            columns: ColumnNames::default(),
            direct_rules: vec![DirectRule {
                task_type: "Despacho / Análise Técnica (Decisão)".to_string(),
                owner: "MMARIO".to_string(),
            }],
            workers: vec![
                Worker::new("EDUARSOUZA", "EDUARDO", 15),
                Worker::new("ROSSILVA", "ROSANA", 15),
                Worker::new("VSILVEIRA", "VINICIUS", 15),
                Worker::new("KAMARQUES", "KAUE", 11),
                Worker::new("PFREGOLON", "PEDRO", 11),
            ],
            output: OutputConfig::default(),
        }
    }
}

impl DistributionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `TASKSHARE_*` overrides from a variable lookup
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(column) = lookup("TASKSHARE_TASK_COLUMN") {
            self.columns.task_type = column;
        }

        if let Some(column) = lookup("TASKSHARE_LOGIN_COLUMN") {
            self.columns.login = column;
        }

        if let Some(column) = lookup("TASKSHARE_ASSIGNEE_COLUMN") {
            self.columns.assignee = column;
        }

        if let Some(task) = lookup("TASKSHARE_RESIDUAL_TASK") {
            self.residual_task_type = task;
        }

        if let Some(format) = lookup("TASKSHARE_OUTPUT_FORMAT") {
            match format.to_lowercase().as_str() {
                "xlsx" => self.output.format = TableFormat::Xlsx,
                "csv" => self.output.format = TableFormat::Csv,
                other => tracing::warn!(value = other, "Ignoring unknown TASKSHARE_OUTPUT_FORMAT"),
            }
        }
    }

    pub fn worker(&self, name: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.name == name)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            crate::TaskShareError::config(format!("cannot render configuration: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_is_reference_team() {
        let config = DistributionConfig::default();

        assert_eq!(config.workers.len(), 5);
        assert_eq!(crate::distribution::total_weight(&config.workers), 67);
        assert_eq!(config.worker("KAUE").unwrap().alias, "KAMARQUES");
        assert_eq!(config.direct_rules[0].owner, "MMARIO");
        assert_eq!(config.output.combined_suffix, "_combinado");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TASKSHARE_TASK_COLUMN", "Task"),
            ("TASKSHARE_RESIDUAL_TASK", "Review"),
            ("TASKSHARE_OUTPUT_FORMAT", "CSV"),
        ]
        .into_iter()
        .collect();

        let mut config = DistributionConfig::default();
        config.merge_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.columns.task_type, "Task");
        assert_eq!(config.columns.login, "LOGIN RETORNO EXIGÊNCIA");
        assert_eq!(config.residual_task_type, "Review");
        assert_eq!(config.output.format, TableFormat::Csv);
    }

    #[test]
    fn test_toml_round_trip_of_default() {
        let config = DistributionConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: DistributionConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: DistributionConfig = toml::from_str(
            r#"
residual_task_type = "Review"

[[workers]]
alias = "FOO"
name = "Foo"
weight = 1
"#,
        )
        .unwrap();

        assert_eq!(parsed.residual_task_type, "Review");
        assert_eq!(parsed.workers, vec![Worker::new("FOO", "Foo", 1)]);
        assert_eq!(parsed.columns, ColumnNames::default());
        assert_eq!(parsed.output.final_marker, "FINAL");
    }
}

use super::DistributionConfig;
use crate::distribution::Worker;
use crate::error::{ErrorCode, Result, TaskShareError};
use crate::table::ColumnNames;
use std::collections::HashSet;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_config(config: &DistributionConfig) -> Result<()> {
        Self::validate_columns(&config.columns)?;
        Self::validate_workers(&config.workers)?;

        if config.residual_task_type.is_empty() {
            return Err(invalid("residual_task_type cannot be empty"));
        }

        if config.output.combined_suffix.is_empty() {
            return Err(invalid(
                "output.combined_suffix cannot be empty; combined files would overwrite direct files",
            ));
        }

        if config.output.final_marker.is_empty() {
            return Err(invalid("output.final_marker cannot be empty"));
        }

        let mut owners = HashSet::new();
        for rule in &config.direct_rules {
            if rule.task_type.is_empty() {
                return Err(invalid("direct rule task_type cannot be empty"));
            }
            Self::validate_file_name_part("direct rule owner", &rule.owner)?;
            if config.worker(&rule.owner).is_some() {
                return Err(invalid(format!(
                    "direct rule owner '{}' is also a worker; their output files would collide",
                    rule.owner
                )));
            }
            if !owners.insert(rule.owner.as_str()) {
                return Err(invalid(format!(
                    "direct rule owner '{}' is used twice; their output files would collide",
                    rule.owner
                )));
            }
        }

        Ok(())
    }

    pub fn validate_columns(columns: &ColumnNames) -> Result<()> {
        for (field, value) in [
            ("columns.task_type", &columns.task_type),
            ("columns.login", &columns.login),
            ("columns.assignee", &columns.assignee),
        ] {
            if value.is_empty() {
                return Err(invalid(format!("{} cannot be empty", field)));
            }
        }

        if columns.assignee == columns.task_type || columns.assignee == columns.login {
            return Err(invalid(
                "columns.assignee must differ from the task type and login columns",
            ));
        }

        Ok(())
    }

    pub fn validate_workers(workers: &[Worker]) -> Result<()> {
        if workers.is_empty() {
            return Err(TaskShareError::config_with_code(
                ErrorCode::CONFIG_NO_WORKERS,
                "at least one worker must be configured",
            ));
        }

        let mut aliases = HashSet::new();
        let mut names = HashSet::new();
        for worker in workers {
            if worker.alias.trim().is_empty() {
                return Err(invalid(format!("worker '{}' has an empty alias", worker.name)));
            }
            Self::validate_file_name_part("worker name", &worker.name)?;
            if worker.weight == 0 {
                return Err(invalid(format!(
                    "worker '{}' must have a weight greater than 0",
                    worker.name
                )));
            }
            if !aliases.insert(worker.alias.to_lowercase()) {
                return Err(TaskShareError::config_with_code(
                    ErrorCode::CONFIG_DUPLICATE_WORKER,
                    format!("alias '{}' is configured twice", worker.alias),
                ));
            }
            if !names.insert(worker.name.as_str()) {
                return Err(TaskShareError::config_with_code(
                    ErrorCode::CONFIG_DUPLICATE_WORKER,
                    format!("worker name '{}' is configured twice", worker.name),
                ));
            }
        }

        Ok(())
    }

    /// Names end up in file names, so they must be non-empty and free of
    /// path separators
    fn validate_file_name_part(what: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(invalid(format!("{} cannot be empty", what)));
        }
        if value.contains(['/', '\\']) || value == "." || value == ".." {
            return Err(invalid(format!(
                "{} '{}' cannot contain path separators",
                what, value
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> TaskShareError {
    TaskShareError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message)
}

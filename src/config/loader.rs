use super::{ConfigValidator, DistributionConfig};
use crate::error::{common, ErrorCode, ErrorExt, Result, TaskShareError};
use std::path::Path;

/// Load configuration from defaults, an optional TOML file and the process
/// environment, then validate it
pub fn load_config(path: Option<&Path>) -> Result<DistributionConfig> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<DistributionConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(common::config_not_found(path));
            }
            let content = std::fs::read_to_string(path)
                .to_storage_error(ErrorCode::STORAGE_READ_FAILED, path)?;
            let parsed: DistributionConfig = toml::from_str(&content).map_err(|e| {
                TaskShareError::from(e).with_context(format!("in {}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), "Loaded configuration file");
            parsed
        }
        None => DistributionConfig::default(),
    };

    config.merge_env_with(env);
    ConfigValidator::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Worker;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_defaults_without_file() {
        let config = load_config_with_env(None, no_env).unwrap();
        assert_eq!(config, DistributionConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskshare.toml");
        std::fs::write(
            &path,
            r#"
residual_task_type = "X"
direct_rules = []

[columns]
task_type = "task"
login = "login"

[[workers]]
alias = "FOO"
name = "Foo"
weight = 1
"#,
        )
        .unwrap();

        let config = load_config_with_env(Some(path.as_path()), no_env).unwrap();

        assert_eq!(config.residual_task_type, "X");
        assert!(config.direct_rules.is_empty());
        assert_eq!(config.columns.task_type, "task");
        assert_eq!(config.columns.assignee, "Responsavel");
        assert_eq!(config.workers, vec![Worker::new("FOO", "Foo", 1)]);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config_with_env(Some(Path::new("/nope/taskshare.toml")), no_env)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "workers = 3").unwrap();

        let err = load_config_with_env(Some(path.as_path()), no_env).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "workers = []").unwrap();

        let err = load_config_with_env(Some(path.as_path()), no_env).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NO_WORKERS);
    }
}

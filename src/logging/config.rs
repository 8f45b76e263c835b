use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use tidemq_error::{context, ensure, TideResult};

use crate::SettingsError;

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Daily-rolling file sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("logs"),
            prefix: "tidemq.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub file: FileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            file: FileConfig::default(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> TideResult<()> {
        ensure!(
            !self.level.trim().is_empty(),
            SettingsError::invalid("logging.level", "must not be empty")
        );
        ensure!(
            !self.file.enabled || !self.file.prefix.trim().is_empty(),
            SettingsError::invalid(
                "logging.file.prefix",
                "must not be empty when the file sink is enabled",
            )
        );
        Ok(())
    }

    /// Creates the log directory when the file sink is enabled.
    pub fn ensure_log_dir(&self) -> TideResult<()> {
        if !self.file.enabled {
            return Ok(());
        }
        context!(
            fs::create_dir_all(&self.file.dir),
            "creating log dir {}",
            self.file.dir.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, LogFormat::Compact);
        assert!(!cfg.file.enabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let cfg = LoggingConfig {
            level: " ".into(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SettingsError>(),
            Some(SettingsError::Invalid { field: "logging.level", .. })
        ));

        let cfg = LoggingConfig {
            file: FileConfig {
                enabled: true,
                prefix: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_ensure_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/logs");
        let mut cfg = LoggingConfig::default();
        cfg.file.dir = dir.clone();

        cfg.ensure_log_dir().unwrap();
        assert!(!dir.exists());

        cfg.file.enabled = true;
        cfg.ensure_log_dir().unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_ensure_log_dir_under_a_file_fails_with_context() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let mut cfg = LoggingConfig::default();
        cfg.file.enabled = true;
        cfg.file.dir = blocker.join("logs");

        let err = cfg.ensure_log_dir().unwrap_err();
        assert!(err.downcast_ref::<tidemq_error::GenericError>().is_some());
        assert_eq!(err.contexts().len(), 1);
        assert!(err.contexts()[0].message.starts_with("creating log dir"));
        assert!(err.contexts()[0].message.contains("not_a_dir"));
    }

    #[test]
    fn test_deserialize_partial() {
        let cfg: LoggingConfig =
            serde_json::from_str(r#"{"format":"pretty","file":{"enabled":true}}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Pretty);
        assert!(cfg.file.enabled);
        assert_eq!(cfg.file.prefix, "tidemq.log");
        assert_eq!(cfg.level, "info");
    }
}

use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Errors while loading settings or bootstrapping the ambient stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {reason}")]
    Load { reason: String },

    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to initialize logging: {reason}")]
    Logging { reason: String },
}

impl SettingsError {
    pub fn invalid(
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl ErrorExt for SettingsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Load { .. } => StatusCode::ConfigLoadFailed,
            Self::Invalid { .. } => StatusCode::ConfigInvalid,
            Self::Logging { .. } => StatusCode::LoggingInitFailed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting() {
        let err = SettingsError::invalid("max_concurrent_deliveries", "must be at least 1");
        assert_eq!(err.status_code(), StatusCode::ConfigInvalid);
        assert_eq!(
            err.to_string(),
            "invalid setting 'max_concurrent_deliveries': must be at least 1"
        );
    }

    #[test]
    fn test_logging_error_status() {
        let err = SettingsError::Logging {
            reason: "subscriber already set".into(),
        };
        assert_eq!(err.status_code(), StatusCode::LoggingInitFailed);
        assert!(!err.status_code().is_retryable());
    }
}

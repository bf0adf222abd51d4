//! Error types for the CLI

use navprobe::news::ConfigError;
use navprobe::ModelError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The model could not start a run
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A run ended without completing its budget
    #[error("Run failed: {message}")]
    RunFailed {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report could not be rendered
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a run failure error
    #[must_use]
    pub fn run_failed(message: impl Into<String>) -> Self {
        Self::RunFailed {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::report_generation(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err: CliError = ConfigError::Invalid("bad config".to_string()).into();
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_model_error() {
        let err: CliError = ModelError::resource_init("no browser").into();
        assert!(err.to_string().contains("Model error"));
        assert!(err.to_string().contains("no browser"));
    }

    #[test]
    fn test_run_failed_error() {
        let err = CliError::run_failed("HOMEPAGE/search");
        assert!(err.to_string().contains("Run failed"));
    }

    #[test]
    fn test_report_generation_error() {
        let err = CliError::report_generation("bad json");
        assert!(err.to_string().contains("Report"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}

//! Unified error type for the fixture harness.
//!
//! Every failure the harness can surface is a [`HarnessError`]. Discovery
//! errors are fatal and escape the registration call; every other variant is
//! local to a single case and is reported as that case's failure by the host.
//!
//! Errors implement [`miette::Diagnostic`] so the binary can render them with
//! codes and help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Failure reported by an external mutation pipeline. Opaque to the harness.
pub type PipelineError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

/// Type-safe classification of a [`HarnessError`], mirroring the harness's
/// error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Discovery,
    CaseNotFound,
    Pipeline,
    Assertion,
    Io,
    Pattern,
    Config,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Discovery => "Discovery",
            ErrorType::CaseNotFound => "CaseNotFound",
            ErrorType::Pipeline => "Pipeline",
            ErrorType::Assertion => "Assertion",
            ErrorType::Io => "Io",
            ErrorType::Pattern => "Pattern",
            ErrorType::Config => "Config",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// The cases tree could not be listed. Fatal for the whole discovery pass.
    #[error("failed to crawl '{}': {source}", path.display())]
    #[diagnostic(
        code(fixture_harness::discovery),
        help("check that the cases directory exists and is readable")
    )]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not find a file matching '{pattern}' in '{}'", directory.display())]
    #[diagnostic(
        code(fixture_harness::case_not_found),
        help("every case directory needs a file matching the original-file pattern")
    )]
    CaseNotFound { pattern: String, directory: PathBuf },

    /// Passed through from the mutation pipeline without rewording.
    #[error("{error}")]
    #[diagnostic(code(fixture_harness::pipeline))]
    Pipeline { target: PathBuf, error: PipelineError },

    #[error("mutated output does not match '{}'", expected_path.display())]
    #[diagnostic(
        code(fixture_harness::assertion),
        help("rerun in accept mode to take the actual output as the new baseline")
    )]
    Assertion {
        expected_path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to {action} '{}': {source}", path.display())]
    #[diagnostic(code(fixture_harness::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    #[diagnostic(code(fixture_harness::pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration '{}': {message}", path.display())]
    #[diagnostic(code(fixture_harness::config))]
    Config { path: PathBuf, message: String },
}

impl HarnessError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            HarnessError::Discovery { .. } => ErrorType::Discovery,
            HarnessError::CaseNotFound { .. } => ErrorType::CaseNotFound,
            HarnessError::Pipeline { .. } => ErrorType::Pipeline,
            HarnessError::Assertion { .. } => ErrorType::Assertion,
            HarnessError::Io { .. } => ErrorType::Io,
            HarnessError::InvalidPattern { .. } => ErrorType::Pattern,
            HarnessError::Config { .. } => ErrorType::Config,
        }
    }

    /// Wraps an I/O failure on a fixture file.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        HarnessError::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Canonical error type for the launcher.
#[derive(Debug, Error)]
pub enum LoadrunError {
    /// Malformed or missing command-line input.
    #[error("usage error: {0}")]
    Usage(String),

    /// Test type is not present in the catalog.
    #[error("unknown test type `{0}`")]
    UnknownTestType(String),

    /// A required file (test plan, engine binary) is absent.
    #[error("{what} not found: {}", path.display())]
    MissingResource {
        /// Kind of resource (e.g. `"test plan"`).
        what: &'static str,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Inputs are individually valid but do not form a runnable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The load-test engine exited with a non-zero status.
    #[error("load-test engine exited with code {code}")]
    ExternalProcess {
        /// Exit code reported by the child process.
        code: i32,
    },

    /// At least one attempted run of a batch failed.
    #[error("{failed} of {attempted} batch runs failed")]
    BatchFailed {
        /// Runs that exited non-zero or could not be launched.
        failed: usize,
        /// Runs that were attempted (skipped plans excluded).
        attempted: usize,
    },

    /// Launcher settings could not be loaded.
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// I/O error while preparing output directories or spawning processes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadrunError {
    /// Creates a `Usage` variant.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Creates a `Configuration` variant.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a `MissingResource` variant.
    #[must_use]
    pub fn missing(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::MissingResource {
            what,
            path: path.into(),
        }
    }

    /// Returns true for errors caused by the command line itself.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::UnknownTestType(_))
    }

    /// Process exit status for this error.
    ///
    /// Engine failures propagate the engine's own code; everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalProcess { code } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Convenient result alias for launcher operations.
pub type LoadrunResult<T> = Result<T, LoadrunError>;

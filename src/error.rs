use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for pcdiag
#[derive(Error, Debug)]
pub enum DiagError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source report not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Hardware monitor unavailable: {0}")]
    MonitorUnavailable(String),

    #[error("Firmware query failed: {0}")]
    Firmware(String),

    #[error("Health-check script failed: {0}")]
    Script(String),

    #[error("Health-check script timed out after {0} seconds")]
    ScriptTimeout(u64),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for pcdiag
pub type Result<T> = std::result::Result<T, DiagError>;

impl DiagError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DiagError::Config(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        DiagError::PermissionDenied(msg.into())
    }

    pub fn monitor_unavailable<S: Into<String>>(msg: S) -> Self {
        DiagError::MonitorUnavailable(msg.into())
    }

    pub fn firmware<S: Into<String>>(msg: S) -> Self {
        DiagError::Firmware(msg.into())
    }

    pub fn script<S: Into<String>>(msg: S) -> Self {
        DiagError::Script(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DiagError::Other(msg.into())
    }

    /// Classify a failure reading `path` by its I/O kind.
    ///
    /// Missing files become `SourceNotFound`, access failures become
    /// `PermissionDenied`, everything else stays a plain `Io` error.
    pub fn from_read_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => DiagError::SourceNotFound(path),
            io::ErrorKind::PermissionDenied => {
                DiagError::permission_denied(format!("{}: {}", path.display(), err))
            }
            _ => DiagError::Io(err),
        }
    }

    /// Classify a failure writing to `path`. A missing directory is an I/O
    /// error here, not a missing source.
    pub fn from_write_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::PermissionDenied => {
                DiagError::permission_denied(format!("{}: {}", path.display(), err))
            }
            _ => DiagError::Io(err),
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the learning core: configuration, frame logging,
/// and value-table persistence.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No value tables found in {0}")]
    NoValueTables(PathBuf),

    #[error("Value table kind mismatch: expected {expected}, found {found}")]
    SnapshotMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Frame logged outside of a phase")]
    PhaseNotStarted,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let e = Error::InvalidConfig("grid width must be positive".to_string());
        assert_eq!(
            e.to_string(),
            "Invalid configuration: grid width must be positive"
        );
    }

    #[test]
    fn snapshot_mismatch_display() {
        let e = Error::SnapshotMismatch {
            expected: "action_value",
            found: "state_value",
        };
        assert_eq!(
            e.to_string(),
            "Value table kind mismatch: expected action_value, found state_value"
        );
    }

    #[test]
    fn io_error_names_path() {
        let e = Error::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(e.to_string().contains("/tmp/missing"));
    }
}

//! Error types for a timing analysis run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Outcomes of a run that the caller must be able to tell apart.
///
/// Parse rejections and transient read failures never show up here; they
/// are absorbed by the acquisition session.
#[derive(Debug, Error)]
pub enum RunError {
    /// The line source could not be opened. Nothing was collected.
    #[error("Connection failed ({source_desc}): {reason}")]
    Connection {
        source_desc: String,
        #[source]
        reason: io::Error,
    },

    /// Cancelled before the line source finished opening.
    #[error("Cancelled while opening {source_desc}")]
    Cancelled { source_desc: String },

    /// Collection finished without a single valid sample.
    #[error("Insufficient data: no valid samples in {lines_read} lines read")]
    InsufficientData { lines_read: usize },

    /// A renderer failed to produce its artifact.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl RunError {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Connection { .. } => 2,
            RunError::InsufficientData { .. } => 3,
            RunError::Render(_) => 1,
            RunError::Cancelled { .. } => 130,
        }
    }
}

/// Errors raised while writing report artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the artifact to disk failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing the analysis record failed.
    #[error("Failed to serialize analysis: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The chart backend reported an error.
    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let connection = RunError::Connection {
            source_desc: "serial: /dev/null".to_string(),
            reason: io::Error::new(io::ErrorKind::NotFound, "no such device"),
        };
        let insufficient = RunError::InsufficientData { lines_read: 4 };
        let cancelled = RunError::Cancelled {
            source_desc: "tcp localhost:4000".to_string(),
        };

        assert_eq!(connection.exit_code(), 2);
        assert_eq!(cancelled.exit_code(), 130);
        assert_eq!(insufficient.exit_code(), 3);
        assert_ne!(connection.exit_code(), insufficient.exit_code());
    }

    #[test]
    fn test_display_messages() {
        let err = RunError::InsufficientData { lines_read: 7 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: no valid samples in 7 lines read"
        );

        let err = RunError::Render(RenderError::Chart("backend gone".to_string()));
        assert_eq!(err.to_string(), "Chart rendering failed: backend gone");
    }
}

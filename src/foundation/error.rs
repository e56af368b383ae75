use std::path::{Path, PathBuf};

/// Convenience result type used across the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Top-level error taxonomy used by the naming and queue APIs.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A filename or identifier does not follow the production naming protocol.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The work queue has no items left. Callers use this to end a processing loop.
    #[error("queue is empty")]
    QueueEmpty,

    /// IO failure on a file the pipeline owns (queue, backup, logs, journal).
    #[error("filesystem error: failed to {action} '{}'", .path.display())]
    Filesystem {
        /// What was being attempted, e.g. "read queue".
        action: &'static str,
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An expected directory on the shared drive is missing.
    #[error("directory not found: '{}'", .0.display())]
    DirectoryNotFound(PathBuf),

    /// An expected file on the shared drive is missing.
    #[error("file not found: '{}'", .0.display())]
    NotFound(PathBuf),

    /// Invalid user-provided input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing config or journal data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Build a [`PipelineError::InvalidIdentifier`] value.
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    /// Build a [`PipelineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PipelineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`PipelineError::Filesystem`] value.
    pub fn filesystem(action: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for errors that compromise the queue's own files and must stop a session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Filesystem { .. } | Self::Serde(_) | Self::Other(_))
    }

    /// True when this is the end-of-queue signal rather than a failure.
    pub fn is_queue_empty(&self) -> bool {
        matches!(self, Self::QueueEmpty)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for segment writing.
//!
//! Every error is fatal from the writer's point of view. Nothing is retried
//! internally; the caller decides whether to retry, tear down or restart.

use std::path::PathBuf;

/// Convenience result type using [`WriteError`] as the error variant.
pub type Result<T> = core::result::Result<T, WriteError>;

/// Errors that can occur while delivering buffers to a segment writer.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The next segment file could not be opened for writing
    /// (permissions, missing directory, full disk, ...).
    #[error("Could not open segment \"{}\" for writing: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cached stream header did not fully write to a freshly opened segment.
    ///
    /// The segment is closed again before this is returned.
    #[error("Could not write stream header {index} to \"{}\": {source}", path.display())]
    HeaderWriteFailed {
        path: PathBuf,
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// A data buffer did not fully write to the current segment.
    #[error("Incomplete write to \"{}\": {source}", path.display())]
    WriteIncomplete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The location template could not be turned into a filename.
    #[error("Invalid location template {template:?}")]
    InvalidTemplate { template: String },

    /// Flushing the last segment on shutdown failed.
    #[error("Could not close segment \"{}\": {source}", path.display())]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Returns `true` for errors raised while naming or opening a segment,
    /// as opposed to writing into one.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            WriteError::OpenFailed { .. } | WriteError::InvalidTemplate { .. }
        )
    }
}

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Cache of stream header buffers replayed at the start of every segment.

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::{Result, WriteError};

/// Ordered list of stream header buffers.
///
/// The cache only holds references: [`Bytes`] clones share the underlying
/// allocation with whoever announced the headers.
#[derive(Debug, Default, Clone)]
pub struct HeaderCache {
    headers: Vec<Bytes>,
}

impl HeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached headers, keeping the order in which they are given.
    ///
    /// An empty list clears the cache. Segments that are already open are not
    /// touched; only segments opened afterwards replay the new set.
    pub fn update<I>(&mut self, headers: I)
    where
        I: IntoIterator<Item = Bytes>,
    {
        self.headers = headers.into_iter().collect();
        debug!(
            "Stream headers updated: {} buffer(s), {} byte(s)",
            self.headers.len(),
            self.total_len()
        );
    }

    /// Writes every cached header, in order, to `out`.
    ///
    /// `path` is only used to describe the failure.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::HeaderWriteFailed`] for the first header that
    /// could not be written completely. Later headers are not attempted.
    pub fn replay_into<W: Write + ?Sized>(&self, out: &mut W, path: &Path) -> Result<()> {
        for (index, header) in self.headers.iter().enumerate() {
            out.write_all(header)
                .map_err(|source| WriteError::HeaderWriteFailed {
                    path: path.to_path_buf(),
                    index,
                    source,
                })?;
        }
        if !self.headers.is_empty() {
            debug!(
                "Replayed {} stream header(s) into \"{}\"",
                self.headers.len(),
                path.display()
            );
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.headers.clear();
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Sum of the sizes of all cached headers.
    pub fn total_len(&self) -> usize {
        self.headers.iter().map(Bytes::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.headers.iter()
    }
}

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! The contract between a media pipeline and the segment writer.

use std::path::PathBuf;

use bytes::Bytes;

use crate::Result;

/// Outcome of a successful [`StreamSink::deliver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    /// Number of payload bytes written (headers not included).
    pub bytes: usize,

    /// Segment opened while handling this buffer, if any.
    pub opened: Option<PathBuf>,
}

/// A consumer of one ordered stream of buffers.
///
/// Calls must be serialized by the caller: a delivery, a header update and
/// shutdown never run concurrently on the same sink.
pub trait StreamSink {
    /// Writes one data buffer, starting a new segment first when needed.
    fn deliver(&mut self, buffer: &[u8]) -> Result<Written>;

    /// Replaces the stream headers replayed at the start of later segments.
    fn update_headers(&mut self, headers: Vec<Bytes>);

    /// Closes the open segment and drops all cached headers.
    fn shutdown(&mut self) -> Result<()>;
}

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Where segments are created.
//!
//! [`FsStore`] writes real files. Other stores can be plugged into a
//! [`crate::SegmentWriter`] to keep segments in memory or to inject failures.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Opens segments for writing.
pub trait SegmentStore {
    /// Handle of one open segment.
    type Segment: Write;

    /// Creates (or truncates) the segment at `path`, write-only.
    fn create(&mut self, path: &Path) -> io::Result<Self::Segment>;

    /// Finishes a segment. The handle is dropped afterwards either way.
    fn close(&mut self, mut segment: Self::Segment) -> io::Result<()> {
        segment.flush()
    }
}

/// Stores segments as files on the local file system.
///
/// Relative paths resolve against the working directory of the process.
/// Missing parent directories are not created.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl SegmentStore for FsStore {
    type Segment = File;

    fn create(&mut self, path: &Path) -> io::Result<File> {
        File::create(path)
    }
}

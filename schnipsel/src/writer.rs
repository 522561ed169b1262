// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Segment writer: counts buffers, rotates segments and replays headers.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Local;
use tracing::{debug, info, trace, warn};

use crate::headers::HeaderCache;
use crate::settings::SinkSettings;
use crate::sink::{StreamSink, Written};
use crate::store::{FsStore, SegmentStore};
use crate::{Result, WriteError, template};

/// A segment currently open for writing.
struct OpenSegment<W> {
    path: PathBuf,
    out: W,
}

/// Writes a buffer stream into consecutive segments of `frames` buffers each.
///
/// The first delivery opens a segment. Once a segment holds `frames` buffers,
/// the next delivery closes it and opens a new one, named by expanding the
/// location template against the local time. Every new segment starts with
/// the cached stream headers.
///
/// # Examples
///
/// ```no_run
/// use bytes::Bytes;
/// use schnipsel::{SegmentWriter, SinkSettings};
///
/// # fn main() -> schnipsel::Result<()> {
/// let mut writer = SegmentWriter::new(SinkSettings {
///     location: "/srv/recordings/%Y-%m-%d_%H-%M-%S.ts".into(),
///     frames: 6000,
/// });
/// writer.update_headers(vec![Bytes::from_static(b"\x47\x40\x00\x10")]);
/// writer.deliver(&[0x47; 188])?;
/// writer.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct SegmentWriter<S: SegmentStore = FsStore> {
    store: S,
    settings: SinkSettings,
    count: u64,
    current: Option<OpenSegment<S::Segment>>,
    headers: HeaderCache,
    segments_opened: u64,
}

impl SegmentWriter<FsStore> {
    /// Creates a writer producing files on the local file system.
    pub fn new(settings: SinkSettings) -> Self {
        Self::with_store(FsStore, settings)
    }
}

impl Default for SegmentWriter<FsStore> {
    fn default() -> Self {
        Self::new(SinkSettings::default())
    }
}

impl<S: SegmentStore> SegmentWriter<S> {
    /// Creates a writer that opens its segments through `store`.
    pub fn with_store(store: S, settings: SinkSettings) -> Self {
        Self {
            store,
            settings,
            count: 0,
            current: None,
            headers: HeaderCache::new(),
            segments_opened: 0,
        }
    }

    /// Writes `buffer` to the current segment, rotating first if the segment
    /// is full and opening one if none is open.
    ///
    /// # Errors
    ///
    /// - [`WriteError::InvalidTemplate`] / [`WriteError::OpenFailed`] if the
    ///   next segment could not be named or opened. No segment is open then.
    /// - [`WriteError::HeaderWriteFailed`] if header replay failed. The new
    ///   segment is closed again.
    /// - [`WriteError::CloseFailed`] if the full segment could not be closed.
    /// - [`WriteError::WriteIncomplete`] if `buffer` was not fully written.
    ///   The segment stays open and the buffer is not counted.
    pub fn deliver(&mut self, buffer: &[u8]) -> Result<Written> {
        if self.current.is_some() && self.count >= self.effective_threshold() {
            debug!(
                "Segment full after {} buffer(s) (threshold {}), rotating",
                self.count, self.settings.frames
            );
            self.count = 0;
            self.close_current()?;
        }

        let mut opened = None;
        let mut segment = match self.current.take() {
            Some(segment) => segment,
            None => {
                self.count = 0;
                let segment = self.open_next()?;
                opened = Some(segment.path.clone());
                segment
            }
        };

        let written = segment
            .out
            .write_all(buffer)
            .map_err(|source| WriteError::WriteIncomplete {
                path: segment.path.clone(),
                source,
            });
        self.current = Some(segment);
        written?;

        self.count += 1;
        trace!("Wrote {} byte(s), buffer {} of segment", buffer.len(), self.count);

        Ok(Written {
            bytes: buffer.len(),
            opened,
        })
    }

    /// Replaces the cached stream headers.
    ///
    /// The open segment is left as is; the new headers are replayed into
    /// segments opened from now on.
    pub fn update_headers<I>(&mut self, headers: I)
    where
        I: IntoIterator<Item = Bytes>,
    {
        self.headers.update(headers);
    }

    /// Closes the open segment, if any, and drops the cached headers.
    ///
    /// Calling it again is a no-op. The writer can keep being used afterwards
    /// and will open a fresh segment on the next delivery.
    pub fn shutdown(&mut self) -> Result<()> {
        let closed = self.close_current();
        self.headers.clear();
        self.count = 0;
        closed
    }

    /// Changes the location template. Applies to the next segment opened.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.settings.location = location.into();
    }

    /// Changes the number of buffers per segment. Applies to the next
    /// threshold check.
    pub fn set_threshold(&mut self, frames: u64) {
        self.settings.frames = frames;
    }

    /// Settings the next open and threshold check will use.
    pub fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    pub fn location(&self) -> &str {
        &self.settings.location
    }

    pub fn threshold(&self) -> u64 {
        self.settings.frames
    }

    /// Buffers written into the current segment.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Path of the open segment, if any.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|segment| segment.path.as_path())
    }

    /// Number of segments opened since the writer was created.
    pub fn segments_opened(&self) -> u64 {
        self.segments_opened
    }

    pub fn headers(&self) -> &HeaderCache {
        &self.headers
    }

    // A threshold of zero still puts one buffer into each segment.
    fn effective_threshold(&self) -> u64 {
        self.settings.frames.max(1)
    }

    fn open_next(&mut self) -> Result<OpenSegment<S::Segment>> {
        let path = template::render(&self.settings.location, &Local::now())?;

        let mut out = self
            .store
            .create(&path)
            .map_err(|source| WriteError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        self.segments_opened += 1;
        info!("Opened segment \"{}\"", path.display());

        if let Err(err) = self.headers.replay_into(&mut out, &path) {
            if let Err(close_err) = self.store.close(out) {
                warn!(
                    "Could not close \"{}\" after header failure: {}",
                    path.display(),
                    close_err
                );
            }
            return Err(err);
        }

        Ok(OpenSegment { path, out })
    }

    fn close_current(&mut self) -> Result<()> {
        let Some(OpenSegment { path, out }) = self.current.take() else {
            return Ok(());
        };
        self.store
            .close(out)
            .map_err(|source| WriteError::CloseFailed {
                path: path.clone(),
                source,
            })?;
        info!("Closed segment \"{}\"", path.display());
        Ok(())
    }
}

impl<S: SegmentStore> StreamSink for SegmentWriter<S> {
    fn deliver(&mut self, buffer: &[u8]) -> Result<Written> {
        SegmentWriter::deliver(self, buffer)
    }

    fn update_headers(&mut self, headers: Vec<Bytes>) {
        SegmentWriter::update_headers(self, headers)
    }

    fn shutdown(&mut self) -> Result<()> {
        SegmentWriter::shutdown(self)
    }
}

impl<S: SegmentStore> Drop for SegmentWriter<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close_current() {
            warn!("{}", err);
        }
    }
}

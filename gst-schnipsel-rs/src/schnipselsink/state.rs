//! State Management for Schnipsel Sink
//!
//! ## Key Types
//! - `Context`: Runtime state, holding the segment writer between start()
//!   and stop()
//!
//! Settings are the core's [`schnipsel::SinkSettings`]; the element keeps its
//! own copy so properties can be read and written while stopped.

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use gst::glib;
use gstreamer as gst;
use schnipsel::SegmentWriter;

/// Context wrapper for the element's mutable state.
///
/// The writer is created in start() and shut down in stop(), following
/// GStreamer's state transition lifecycle.
#[derive(Default)]
pub(crate) struct Context {
    /// Segment writer (None when stopped, Some when started)
    pub writer: Option<SegmentWriter>,
}

/// Extracts the `streamheader` buffers from negotiated caps.
///
/// Returns `Ok(None)` if the first caps structure has no `streamheader` array,
/// in which case previously cached headers stay in effect.
///
/// Each returned [`Bytes`] keeps the caps' buffer mapped and points into its
/// memory; nothing is copied.
///
/// # Errors
///
/// Fails if an array entry is not a buffer or cannot be mapped readable.
pub fn stream_headers(caps: &gst::CapsRef) -> Result<Option<Vec<Bytes>>, glib::BoolError> {
    let Some(structure) = caps.structure(0) else {
        return Ok(None);
    };
    let Ok(array) = structure.get::<gst::ArrayRef>("streamheader") else {
        return Ok(None);
    };

    let mut headers = Vec::with_capacity(array.as_slice().len());
    for value in array.as_slice() {
        let buffer = value
            .get::<gst::Buffer>()
            .map_err(|e| glib::bool_error!("streamheader entry is not a buffer: {}", e))?;
        let map = buffer
            .into_mapped_buffer_readable()
            .map_err(|_| glib::bool_error!("Failed to map streamheader buffer"))?;
        headers.push(Bytes::from_owner(map));
    }

    Ok(Some(headers))
}

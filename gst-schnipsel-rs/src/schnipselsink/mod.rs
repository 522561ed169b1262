//! Schnipsel Sink Element
//!
//! This module implements `schnipselsink`, a GStreamer sink element that writes
//! an MPEG transport stream into rotating files.
//!
//! ## Responsibilities
//! - Accepts `video/mpegts` buffers from upstream elements
//! - Caches the `streamheader` buffers announced in the caps
//! - Hands every buffer to a [`schnipsel::SegmentWriter`], which starts a new
//!   file after `frames` buffers and replays the stream headers into it
//!
//! ## Properties (may be changed in any state)
//! - `location`: strftime template for file names
//!   (default `%Y-%m-%d_%H-%M-%S.ts`), used for the next file opened
//! - `frames`: buffers per file (default 6000), used at the next check
//!
//! ## Example Pipeline
//! ```bash
//! gst-launch-1.0 udpsrc port=5000 caps=video/mpegts ! tsparse ! \
//!     schnipselsink location=/srv/dump/%Y-%m-%d_%H-%M-%S.ts frames=6000
//! ```

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

use gst::glib;
use gst::prelude::*;
use gstreamer as gst;
use gstreamer_base as gst_base;

/// Core implementation (properties, lifecycle, BaseSink trait impls)
mod imp;

/// Unit tests for schnipselsink
#[cfg(test)]
mod sink_tests;

/// State structures (writer context, caps header extraction)
mod state;

pub use state::stream_headers;

/// GLib wrapper type for the SchnipselSink element.
///
/// ## Inheritance Chain (GStreamer class hierarchy)
/// - `gst::Object`
/// - `gst::Element`
/// - `gst_base::BaseSink`
/// - `SchnipselSink`
glib::wrapper! {
    pub struct SchnipselSink(ObjectSubclass<imp::SchnipselSink>) @extends gst_base::BaseSink, gst::Element, gst::Object;
}

/// Registers the schnipselsink element with GStreamer.
///
/// The rank is NONE: the element is never picked by autoplugging and has to
/// be requested by name.
pub fn register(plugin: &gst::Plugin) -> Result<(), glib::BoolError> {
    gst::Element::register(
        Some(plugin),
        "schnipselsink",
        gst::Rank::NONE,
        SchnipselSink::static_type(),
    )
}

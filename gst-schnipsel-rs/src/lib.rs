//! GStreamer Plugin for rotating MPEG-TS segments
//!
//! This crate implements a GStreamer plugin providing one element:
//!
//! - **schnipselsink**: A sink element that writes an MPEG transport stream
//!   into a series of files, starting a new file every `frames` buffers
//!
//! The element is a thin adapter: all rotation, header replay and filename
//! logic lives in the [`schnipsel`] crate. The element only forwards buffers,
//! `streamheader` caps fields and its properties to a [`schnipsel::SegmentWriter`].
//!
//! ## GStreamer Concepts (for non-GStreamer developers)
//! - **Element**: A processing unit in a pipeline (source, filter, or sink)
//! - **Plugin**: A dynamically loadable library containing one or more elements
//! - **Caps (Capabilities)**: Media format descriptions; for MPEG-TS these may
//!   carry `streamheader` buffers (PAT/PMT) that every new file must start with

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

// Allow non-Send fields in Send types (required for GStreamer's threading model)
// and unused doc comments (sometimes present in macro-generated code)
#![allow(clippy::non_send_fields_in_send_ty, unused_doc_comments)]

use gst::glib;
use gstreamer as gst;

/// Segment sink element (receives MPEG-TS buffers, writes rotating files)
pub mod schnipselsink;

/// Registers the plugin's elements with GStreamer.
///
/// Called once when the plugin is loaded.
fn plugin_init(plugin: &gst::Plugin) -> Result<(), glib::BoolError> {
    schnipselsink::register(plugin)?;

    Ok(())
}

/// GStreamer plugin metadata and entry point.
///
/// Generates the C-compatible entry point GStreamer looks up when loading the
/// shared library, and `plugin_register_static()` for in-process use.
gst::plugin_define!(
    schnipsel,
    env!("CARGO_PKG_DESCRIPTION"),
    plugin_init,
    concat!(env!("CARGO_PKG_VERSION"), "-", env!("COMMIT_ID")),
    "Apache-2.0",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_REPOSITORY"),
    env!("BUILD_REL_DATE")
);

//! Build Script for gst-schnipsel-rs
//!
//! Generates version information for the GStreamer plugin using
//! `gst_plugin_version_helper`:
//! - `COMMIT_ID`: Git commit hash (for version string)
//! - `BUILD_REL_DATE`: Build date (for plugin metadata)
//!
//! Both are read in lib.rs via `env!` by `gst::plugin_define!`.

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

fn main() {
    gst_plugin_version_helper::info()
}

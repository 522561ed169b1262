// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! User-facing configuration of a segment writer.

use serde::{Deserialize, Serialize};

/// Default filename template, evaluated with strftime substitutions.
pub const DEFAULT_LOCATION: &str = "%Y-%m-%d_%H-%M-%S.ts";

/// Default number of buffers per segment (four minutes of 25 fps video).
pub const DEFAULT_FRAMES: u64 = 4 * 60 * 25;

/// Settings of a [`crate::SegmentWriter`].
///
/// Both fields may be changed while a stream is running. A new `location`
/// applies to the next segment that is opened, a new `frames` to the next
/// threshold check.
///
/// # Examples
///
/// ```
/// use schnipsel::SinkSettings;
///
/// let settings: SinkSettings = serde_json::from_str(r#"{ "frames": 250 }"#).unwrap();
/// assert_eq!(settings.frames, 250);
/// assert_eq!(settings.location, schnipsel::DEFAULT_LOCATION);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    /// Filename template, processed by strftime
    pub location: String,

    /// Number of buffers after which a new segment is started
    pub frames: u64,
}

impl Default for SinkSettings {
    fn default() -> Self {
        SinkSettings {
            location: DEFAULT_LOCATION.to_owned(),
            frames: DEFAULT_FRAMES,
        }
    }
}

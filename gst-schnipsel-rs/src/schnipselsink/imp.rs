//! Schnipsel Sink Implementation
//!
//! This module contains the GStreamer side of the schnipselsink element. It
//! implements GStreamer's BaseSink trait and forwards everything of substance
//! to [`schnipsel::SegmentWriter`]:
//! - `start()` creates the writer from the current properties
//! - `set_caps()` hands `streamheader` buffers to the writer's header cache
//! - `render()` delivers each buffer
//! - `stop()` shuts the writer down, closing the open file
//!
//! ## Implementation Structure
//! - `SchnipselSink`: The struct holding element state (settings, context)
//! - `ObjectImpl`: GObject property system integration
//! - `ElementImpl`: GStreamer element metadata and pad templates
//! - `BaseSinkImpl`: Sink-specific behavior (start, stop, render, set_caps)

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

use gst::glib;
use gst::prelude::*;
use gst::subclass::prelude::*;
use gst_base::prelude::BaseSinkExt;
use gst_base::subclass::prelude::*;
use gstreamer as gst;
use gstreamer_base as gst_base;

use schnipsel::{DEFAULT_FRAMES, DEFAULT_LOCATION, SegmentWriter, SinkSettings};
use tracing::trace;

use std::sync::LazyLock;
use std::sync::Mutex;

use crate::schnipselsink;
use crate::schnipselsink::state::{Context, stream_headers};

/// GStreamer debug category for logging schnipselsink-specific messages.
///
/// Set GST_DEBUG=schnipselsink:5 to see TRACE-level logs.
pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "schnipselsink",
        gst::DebugColorFlags::empty(),
        Some("Rotating MPEG-TS segment sink"),
    )
});

/// Schnipsel Sink element implementation.
///
/// Each field is wrapped in a Mutex because GStreamer calls into the element
/// from the streaming thread and from application threads. The context lock
/// covers a whole deliver / header update / shutdown call.
#[derive(Default)]
pub struct SchnipselSink {
    /// User-configurable properties (location, frames)
    settings: Mutex<SinkSettings>,

    /// Runtime state (segment writer)
    context: Mutex<Context>,
}

#[glib::object_subclass]
impl ObjectSubclass for SchnipselSink {
    const NAME: &'static str = "GstRsSchnipselSink";
    type Type = schnipselsink::SchnipselSink;
    type ParentType = gst_base::BaseSink;
}

/// GObject property system implementation.
///
/// Both properties may change while PLAYING; a running writer picks the new
/// values up at the next rotation or threshold check.
impl ObjectImpl for SchnipselSink {
    fn properties() -> &'static [glib::ParamSpec] {
        static PROPERTIES: LazyLock<Vec<glib::ParamSpec>> = LazyLock::new(|| {
            vec![
                glib::ParamSpecString::builder("location")
                    .nick("Location")
                    .blurb(
                        "Location of the files to write. Processed by strftime, \
                         so date/time modifiers can be used.",
                    )
                    .default_value(DEFAULT_LOCATION)
                    .mutable_playing()
                    .build(),
                glib::ParamSpecUInt64::builder("frames")
                    .nick("Frames")
                    .blurb("Number of buffers after which a new file is started")
                    .minimum(0)
                    .maximum(u64::MAX)
                    .default_value(DEFAULT_FRAMES)
                    .mutable_playing()
                    .build(),
            ]
        });

        PROPERTIES.as_ref()
    }

    /// Sets up tracing (if enabled) and turns off clock synchronization: files
    /// are written as fast as buffers arrive.
    fn constructed(&self) {
        #[cfg(feature = "tracing")]
        {
            use tracing_subscriber::filter::LevelFilter;
            use tracing_subscriber::util::SubscriberInitExt;

            let _ = tracing_subscriber::fmt()
                .compact()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(false)
                .with_max_level(LevelFilter::TRACE)
                .with_ansi(true)
                .finish()
                .try_init();
        }

        self.parent_constructed();

        self.obj().set_sync(false);
    }

    fn set_property(&self, _id: usize, value: &glib::Value, pspec: &glib::ParamSpec) {
        let Ok(mut settings) = self.settings.lock() else {
            gst::error!(
                CAT,
                imp = self,
                "Settings mutex poisoned, property change ignored"
            );
            return;
        };

        match pspec.name() {
            "location" => {
                // A NULL string falls back to the default template
                let location = value
                    .get::<Option<String>>()
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| DEFAULT_LOCATION.to_owned());
                gst::info!(
                    CAT,
                    imp = self,
                    "Changing location from {} to {}",
                    settings.location,
                    location
                );
                settings.location = location;
            }
            "frames" => {
                if let Ok(frames) = value.get::<u64>() {
                    gst::info!(
                        CAT,
                        imp = self,
                        "Changing frames from {} to {}",
                        settings.frames,
                        frames
                    );
                    settings.frames = frames;
                } else {
                    gst::error!(CAT, imp = self, "Invalid type for frames property");
                    return;
                }
            }
            other => {
                gst::error!(CAT, imp = self, "Unknown property '{}'", other);
                return;
            }
        }

        let snapshot = settings.clone();
        drop(settings);

        if let Ok(mut context) = self.context.lock() {
            if let Some(writer) = context.writer.as_mut() {
                writer.set_location(snapshot.location);
                writer.set_threshold(snapshot.frames);
                gst::debug!(CAT, imp = self, "Running writer now uses {:?}", writer.settings());
            }
        } else {
            gst::error!(CAT, imp = self, "Context mutex poisoned");
        }
    }

    fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
        if let Ok(settings) = self.settings.lock() {
            match pspec.name() {
                "location" => settings.location.to_value(),
                "frames" => settings.frames.to_value(),
                _ => {
                    gst::error!(CAT, imp = self, "Unknown property {}", pspec.name());
                    pspec.default_value().clone()
                }
            }
        } else {
            gst::error!(CAT, imp = self, "Settings mutex poisoned");
            pspec.default_value().clone()
        }
    }
}

impl GstObjectImpl for SchnipselSink {}

impl ElementImpl for SchnipselSink {
    fn metadata() -> Option<&'static gst::subclass::ElementMetadata> {
        static ELEMENT_METADATA: LazyLock<gst::subclass::ElementMetadata> = LazyLock::new(|| {
            gst::subclass::ElementMetadata::new(
                "Schnipsel Sink",
                "Sink/File",
                "Writes an MPEG transport stream into files rotated every N buffers",
                "Contributors to the Schnipsel project",
            )
        });

        Some(&*ELEMENT_METADATA)
    }

    /// One always-present sink pad accepting `video/mpegts`.
    fn pad_templates() -> &'static [gst::PadTemplate] {
        static PAD_TEMPLATES: LazyLock<Result<Vec<gst::PadTemplate>, glib::BoolError>> =
            LazyLock::new(|| {
                let caps = gst::Caps::builder("video/mpegts").build();

                let sink_pad_template = gst::PadTemplate::new(
                    "sink",
                    gst::PadDirection::Sink,
                    gst::PadPresence::Always,
                    &caps,
                )?;

                Ok(vec![sink_pad_template])
            });

        match PAD_TEMPLATES.as_ref() {
            Ok(templates) => templates,
            Err(err) => {
                trace!("Failed to create pad templates: {:?}", err);
                &[]
            }
        }
    }
}

impl BaseSinkImpl for SchnipselSink {
    /// Creates the segment writer. No file is opened until the first buffer.
    fn start(&self) -> Result<(), gst::ErrorMessage> {
        let settings = self
            .settings
            .lock()
            .map_err(|e| {
                gst::error_msg!(
                    gst::CoreError::Failed,
                    ["Failed to get settings mutex: {}", e]
                )
            })?
            .clone();

        let mut context = self.context.lock().map_err(|e| {
            gst::error_msg!(gst::CoreError::Failed, ["Failed to get state mutex: {}", e])
        })?;

        gst::info!(
            CAT,
            imp = self,
            "Started with location {} and {} frames per file",
            settings.location,
            settings.frames
        );
        context.writer = Some(SegmentWriter::new(settings));

        Ok(())
    }

    /// Closes the open file and drops the writer with its cached headers.
    fn stop(&self) -> Result<(), gst::ErrorMessage> {
        let mut context = self.context.lock().map_err(|e| {
            gst::error_msg!(
                gst::CoreError::Failed,
                ["Failed to get context mutex: {}", e]
            )
        })?;

        if let Some(mut writer) = context.writer.take() {
            let segments = writer.segments_opened();
            writer.shutdown().map_err(|e| {
                gst::error_msg!(gst::ResourceError::Close, ["{}", e])
            })?;
            gst::info!(CAT, imp = self, "Stopped after {} file(s)", segments);
        }

        Ok(())
    }

    fn render(&self, buffer: &gst::Buffer) -> Result<gst::FlowSuccess, gst::FlowError> {
        let mut context = self.context.lock().map_err(|_| gst::FlowError::Error)?;
        let writer = context.writer.as_mut().ok_or(gst::FlowError::Flushing)?;

        let map = buffer.map_readable().map_err(|_| {
            gst::element_imp_error!(self, gst::CoreError::Failed, ["Failed to map buffer"]);
            gst::FlowError::Error
        })?;

        match writer.deliver(map.as_slice()) {
            Ok(written) => {
                if let Some(path) = written.opened {
                    gst::info!(CAT, imp = self, "Opened file {}", path.display());
                }
                gst::trace!(CAT, imp = self, "Wrote {} bytes", written.bytes);
                Ok(gst::FlowSuccess::Ok)
            }
            Err(err) if err.is_open_error() => {
                gst::element_imp_error!(
                    self,
                    gst::ResourceError::OpenWrite,
                    ["Could not open file for writing."],
                    ["{}", err]
                );
                Err(gst::FlowError::Error)
            }
            Err(err) => {
                gst::element_imp_error!(
                    self,
                    gst::ResourceError::Write,
                    ["Error while writing to file."],
                    ["{}", err]
                );
                Err(gst::FlowError::Error)
            }
        }
    }

    /// Picks up `streamheader` buffers whenever new caps are negotiated.
    ///
    /// Caps without `streamheader` keep the previously cached headers. The
    /// file being written is not touched; the headers go into the next one.
    fn set_caps(&self, caps: &gst::Caps) -> Result<(), gst::LoggableError> {
        let headers = stream_headers(caps)
            .map_err(|e| gst::loggable_error!(CAT, "Invalid streamheader in {}: {}", caps, e))?;

        let Some(headers) = headers else {
            gst::debug!(CAT, imp = self, "No streamheader in caps {}", caps);
            return Ok(());
        };

        let mut context = self
            .context
            .lock()
            .map_err(|e| gst::loggable_error!(CAT, "Failed to lock context mutex: {}", e))?;
        let writer = context
            .writer
            .as_mut()
            .ok_or(gst::loggable_error!(CAT, "Caps received while stopped"))?;

        gst::debug!(
            CAT,
            imp = self,
            "Caching {} stream header buffer(s)",
            headers.len()
        );
        writer.update_headers(headers);

        Ok(())
    }
}

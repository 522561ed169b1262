// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the schnipselsink element.
//!
//! These need the GStreamer runtime libraries; the plugin is registered
//! statically so no plugin path has to be set up.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use gst::prelude::*;
use gstreamer as gst;
use schnipsel::{DEFAULT_FRAMES, DEFAULT_LOCATION};

use super::stream_headers;

/// Ensures GStreamer and the plugin are initialized only once across all tests.
static INIT: std::sync::Once = std::sync::Once::new();

fn init() {
    INIT.call_once(|| {
        gst::init().unwrap();
        crate::plugin_register_static().expect("Failed to register schnipsel plugin");
    });
}

fn make_sink() -> gst::Element {
    init();
    gst::ElementFactory::make("schnipselsink").build().unwrap()
}

fn header_buffer(data: &'static [u8]) -> gst::Buffer {
    gst::Buffer::from_slice(data)
}

fn mpegts_caps(headers: &[&'static [u8]]) -> gst::Caps {
    gst::Caps::builder("video/mpegts")
        .field(
            "streamheader",
            gst::Array::from_values(headers.iter().map(|h| header_buffer(*h).to_send_value())),
        )
        .build()
}

/// Directory for one test's output files, removed on drop.
struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(test: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "schnipselsink_tests_{}_{}",
            test,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Contents of every file in the directory, ordered by file name.
    fn files(&self) -> Vec<String> {
        let mut paths: Vec<_> = fs::read_dir(&self.path)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        paths.sort();
        paths
            .iter()
            .map(|p| String::from_utf8(fs::read(p).unwrap()).unwrap())
            .collect()
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A schnipselsink inside a pipeline, fed from a bare source pad.
struct Feed {
    pipeline: gst::Pipeline,
    sink: gst::Element,
    src: gst::Pad,
}

impl Feed {
    /// Sets the pipeline PLAYING and sends stream-start, caps and segment.
    fn start(location: &Path, frames: u64, caps: &gst::Caps) -> Self {
        let sink = make_sink();
        sink.set_property("location", location.to_str().unwrap());
        sink.set_property("frames", frames);

        let pipeline = gst::Pipeline::new();
        pipeline.add(&sink).unwrap();

        let src = gst::Pad::builder(gst::PadDirection::Src).name("src").build();
        src.link(&sink.static_pad("sink").unwrap()).unwrap();
        src.set_active(true).unwrap();

        pipeline.set_state(gst::State::Playing).unwrap();

        assert!(src.push_event(gst::event::StreamStart::new("schnipsel")));
        assert!(src.push_event(gst::event::Caps::new(caps)));
        assert!(src.push_event(gst::event::Segment::new(
            &gst::FormattedSegment::<gst::ClockTime>::new()
        )));

        Self {
            pipeline,
            sink,
            src,
        }
    }

    fn push(&self, data: &'static [u8]) -> Result<gst::FlowSuccess, gst::FlowError> {
        self.src.push(gst::Buffer::from_slice(data))
    }

    fn stop(&self) {
        self.pipeline.set_state(gst::State::Null).unwrap();
        self.src.set_active(false).unwrap();
    }
}

#[test]
fn properties_have_defaults() {
    let sink = make_sink();
    assert_eq!(sink.property::<String>("location"), DEFAULT_LOCATION);
    assert_eq!(sink.property::<u64>("frames"), DEFAULT_FRAMES);
}

#[test]
fn properties_can_be_changed() {
    let sink = make_sink();
    let location = format!("/tmp/schnipsel-{}/%H-%M-%S.ts", uuid::Uuid::new_v4());
    sink.set_property("location", location.as_str());
    sink.set_property("frames", 250u64);
    assert_eq!(sink.property::<String>("location"), location);
    assert_eq!(sink.property::<u64>("frames"), 250);
}

#[test]
fn sink_pad_accepts_mpegts() {
    let sink = make_sink();
    let pad = sink.static_pad("sink").unwrap();
    let template_caps = pad.pad_template_caps();
    assert!(template_caps.can_intersect(&gst::Caps::builder("video/mpegts").build()));
    assert!(!template_caps.can_intersect(&gst::Caps::builder("video/x-raw").build()));
}

#[test]
fn stream_headers_keep_caps_order() {
    init();
    let caps = gst::Caps::builder("video/mpegts")
        .field(
            "streamheader",
            gst::Array::from_values([
                header_buffer(b"PAT").to_send_value(),
                header_buffer(b"PMT").to_send_value(),
            ]),
        )
        .build();

    let headers = stream_headers(&caps).unwrap().unwrap();
    assert_eq!(
        headers,
        vec![Bytes::from_static(b"PAT"), Bytes::from_static(b"PMT")]
    );
}

#[test]
fn stream_headers_share_buffer_memory() {
    init();
    let header = header_buffer(b"PAT");
    let caps = gst::Caps::builder("video/mpegts")
        .field(
            "streamheader",
            gst::Array::from_values([header.to_send_value()]),
        )
        .build();

    let headers = stream_headers(&caps).unwrap().unwrap();
    let map = header.map_readable().unwrap();
    assert_eq!(headers[0].as_ptr(), map.as_slice().as_ptr());
}

#[test]
fn empty_streamheader_clears() {
    init();
    let caps = gst::Caps::builder("video/mpegts")
        .field("streamheader", gst::Array::from_values([]))
        .build();

    assert_eq!(stream_headers(&caps).unwrap(), Some(Vec::new()));
}

#[test]
fn caps_without_streamheader_yield_nothing() {
    init();
    let caps = gst::Caps::builder("video/mpegts")
        .field("systemstream", true)
        .build();

    assert_eq!(stream_headers(&caps).unwrap(), None);
}

#[test]
fn non_buffer_streamheader_is_rejected() {
    init();
    let caps = gst::Caps::builder("video/mpegts")
        .field(
            "streamheader",
            gst::Array::from_values(["not a buffer".to_send_value()]),
        )
        .build();

    assert!(stream_headers(&caps).is_err());
}

#[test]
fn clock_sync_is_disabled() {
    let sink = make_sink();
    assert!(!sink.property::<bool>("sync"));
}

#[test]
fn caps_headers_start_every_rotated_file() {
    let dir = TestDir::new("rotation");
    let feed = Feed::start(
        &dir.path().join("%Y%m%d%H%M%S%.9f.ts"),
        2,
        &mpegts_caps(&[b"H".as_slice()]),
    );

    for data in [b"a", b"b", b"c"] {
        assert_eq!(feed.push(data), Ok(gst::FlowSuccess::Ok));
    }
    feed.stop();

    assert_eq!(dir.files(), vec!["Hab", "Hc"]);
    assert!(!feed.sink.property::<bool>("sync"));
}

#[test]
fn missing_directory_posts_open_write_error() {
    let dir = TestDir::new("missing_dir");
    let feed = Feed::start(
        &dir.path().join("missing").join("%H-%M-%S.ts"),
        2,
        &mpegts_caps(&[b"H".as_slice()]),
    );

    assert_eq!(feed.push(b"a"), Err(gst::FlowError::Error));

    let bus = feed.pipeline.bus().unwrap();
    let msg = bus
        .timed_pop_filtered(gst::ClockTime::from_seconds(5), &[gst::MessageType::Error])
        .expect("no error posted on the bus");
    match msg.view() {
        gst::MessageView::Error(err) => {
            assert!(err.error().matches(gst::ResourceError::OpenWrite));
        }
        other => panic!("unexpected message {:?}", other),
    }

    feed.stop();
    assert!(dir.files().is_empty());
}

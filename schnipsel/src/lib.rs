// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! # Schnipsel - rotating transport-stream segments
//!
//! Writes a stream of opaque buffers (typically MPEG-TS packets) into a
//! sequence of files ("segments"), starting a new file after a fixed number
//! of buffers. Each new segment begins with the stream headers the pipeline
//! announced last, so every file can be decoded on its own.
//!
//! ## Key Concepts
//!
//! - **Segment**: one output file; stream headers followed by up to `frames`
//!   data buffers, concatenated without any framing
//! - **Rotation**: closing a full segment and opening the next one
//! - **Location**: strftime-style template naming each segment after the
//!   local time it was opened ([`template::render`])
//! - **Stream headers**: out-of-band buffers cached in a [`HeaderCache`] and
//!   replayed at the start of every segment
//!
//! ## Architecture
//!
//! ```text
//!  pipeline ──deliver()──────────► SegmentWriter ──► SegmentStore ──► segment files
//!           ──update_headers()──►  │  HeaderCache
//!           ──shutdown()────────►  │  SinkSettings (location, frames)
//! ```
//!
//! The pipeline side talks to the writer through [`StreamSink`]. All calls are
//! synchronous and must be serialized by the caller.
//!
//! ## Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use schnipsel::{SegmentWriter, SinkSettings, StreamSink};
//!
//! # fn main() -> schnipsel::Result<()> {
//! let mut sink = SegmentWriter::new(SinkSettings::default());
//! sink.update_headers(vec![Bytes::from_static(&[0x47, 0x40, 0x00, 0x10])]);
//! for packet in std::iter::repeat_n([0x47u8; 188], 10) {
//!     sink.deliver(&packet)?;
//! }
//! sink.shutdown()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod headers;
mod settings;
mod sink;
mod store;
mod writer;

pub mod template;

pub use error::{Result, WriteError};
pub use headers::HeaderCache;
pub use settings::{DEFAULT_FRAMES, DEFAULT_LOCATION, SinkSettings};
pub use sink::{StreamSink, Written};
pub use store::{FsStore, SegmentStore};
pub use writer::SegmentWriter;

// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the schnipsel integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use schnipsel::SegmentStore;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

/// Initializes logging (respects the RUST_LOG environment variable).
pub fn init_logging() {
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .init();
    });
}

/// RAII guard for a scratch output directory.
///
/// Creates a unique directory below the system temp dir and removes it with
/// everything in it when dropped.
pub struct TestDirGuard {
    dir: PathBuf,
}

impl TestDirGuard {
    pub fn new(test: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "schnipsel_tests_{}_{}",
            test,
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(dir.as_path()).unwrap_or_else(|_| {
            panic!(
                "Failed to create test directory \"{}\".",
                dir.display()
            )
        });
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Location template for a segment file inside this directory.
    pub fn location(&self, template: &str) -> String {
        self.dir.join(template).to_string_lossy().to_string()
    }

    /// Contents of all files in the directory, ordered by file name.
    pub fn segments(&self) -> Vec<Vec<u8>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        paths.sort();
        paths
            .iter()
            .map(|path| std::fs::read(path).unwrap())
            .collect()
    }
}

impl Drop for TestDirGuard {
    fn drop(&mut self) {
        std::fs::remove_dir_all(self.dir.as_path()).unwrap_or_else(|_| {
            panic!(
                "Failed to remove test directory \"{}\".",
                self.dir.display()
            )
        });
    }
}

/// One segment recorded by [`MemStore`].
#[derive(Debug, Clone, Default)]
pub struct MemSegment {
    pub path: PathBuf,
    pub data: Vec<u8>,
    pub closed: bool,
}

#[derive(Debug, Default)]
pub struct MemState {
    pub segments: Vec<MemSegment>,
    /// Refuse every `create` with a permission error.
    pub refuse_open: bool,
    /// Bytes that may still be written before writes start failing.
    pub write_budget: Option<usize>,
}

/// In-memory segment store recording every segment in opening order.
///
/// Clones share their state, so a test keeps one clone to inspect what the
/// writer produced.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    state: Rc<RefCell<MemState>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_open(&self, refuse: bool) {
        self.state.borrow_mut().refuse_open = refuse;
    }

    pub fn limit_writes(&self, budget: Option<usize>) {
        self.state.borrow_mut().write_budget = budget;
    }

    pub fn segments(&self) -> Vec<MemSegment> {
        self.state.borrow().segments.clone()
    }

    /// Segment contents as strings, for readable assertions.
    pub fn contents(&self) -> Vec<String> {
        self.state
            .borrow()
            .segments
            .iter()
            .map(|segment| String::from_utf8_lossy(&segment.data).into_owned())
            .collect()
    }
}

pub struct MemHandle {
    index: usize,
    state: Rc<RefCell<MemState>>,
}

impl Write for MemHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        let n = match state.write_budget {
            Some(0) => return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full")),
            Some(budget) => {
                let n = buf.len().min(budget);
                state.write_budget = Some(budget - n);
                n
            }
            None => buf.len(),
        };
        state.segments[self.index]
            .data
            .extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SegmentStore for MemStore {
    type Segment = MemHandle;

    fn create(&mut self, path: &Path) -> io::Result<MemHandle> {
        let mut state = self.state.borrow_mut();
        if state.refuse_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        state.segments.push(MemSegment {
            path: path.to_path_buf(),
            ..MemSegment::default()
        });
        Ok(MemHandle {
            index: state.segments.len() - 1,
            state: self.state.clone(),
        })
    }

    fn close(&mut self, segment: MemHandle) -> io::Result<()> {
        self.state.borrow_mut().segments[segment.index].closed = true;
        Ok(())
    }
}

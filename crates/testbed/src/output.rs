//! Line-oriented output sink: console plus an optional append-only log
//! file, with cooperative multi-process rank gating.
//!
//! Rank gating is pure per-process filtering. Processes in a multi-process
//! run share no state; each one simply checks its own rank against the
//! configured writer rank before emitting a line, so only one copy of the
//! otherwise-identical output survives. [`ALL_RANKS`] disables the filter.

use crate::config::RankInfo;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writer-rank value that lets every rank emit.
pub const ALL_RANKS: i32 = -1;

/// Console-and-file text sink used for all harness reporting.
#[derive(Debug)]
pub struct OutputSink {
    file: Option<File>,
    rank: RankInfo,
    rank_to_write: i32,
}

impl OutputSink {
    /// Create a console-only sink. The log file is attached later via
    /// [`open`](Self::open).
    pub fn new(rank: RankInfo, rank_to_write: i32) -> Self {
        Self {
            file: None,
            rank,
            rank_to_write,
        }
    }

    /// Attach the log file, truncating any previous contents. Returns
    /// false when the file could not be created; the sink stays
    /// console-only in that case.
    pub fn open(&mut self, path: &Path) -> bool {
        match File::create(path) {
            Ok(f) => {
                self.file = Some(f);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether a log file is currently attached.
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Drop the log file handle, flushing it first.
    pub fn close(&mut self) {
        if let Some(mut f) = self.file.take() {
            let _ = f.flush();
        }
    }

    /// True when this process's rank is allowed to emit.
    fn emitting(&self) -> bool {
        self.rank_to_write == ALL_RANKS || self.rank.rank == self.rank_to_write
    }

    /// Write one line to the console, rank-gated.
    pub fn console_line(&self, text: &str) {
        if self.emitting() {
            println!("{text}");
        }
    }

    /// Write one line to the log file, rank-gated. No-op when the file is
    /// absent or the write fails; reporting failure of reporting has
    /// nowhere useful to go.
    pub fn file_line(&mut self, text: &str) {
        if !self.emitting() {
            return;
        }
        if let Some(f) = self.file.as_mut() {
            let _ = writeln!(f, "{text}");
            let _ = f.flush();
        }
    }

    /// Write `plain` to the log file and `styled` to the console, each
    /// independently rank-gated. The file never receives escapes.
    pub fn both(&mut self, plain: &str, styled: &str) {
        self.file_line(plain);
        self.console_line(styled);
    }
}

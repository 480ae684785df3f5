//! Reading `du -ak` style reports
//!
//! Each line holds a size, whitespace, and a path (`4	./src/main.rs`). Paths
//! are split on `/` into tree segments. Lines that cannot be parsed are
//! skipped and counted; they never abort the read.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::InputSettings;
use crate::tree::{DuTree, TreeBuilder};

/// Progress is printed every this many entries
const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("line {line}: missing size")]
    MissingSize { line: usize },
    #[error("line {line}: invalid size {value:?}")]
    InvalidSize { line: usize, value: String },
    #[error("line {line}: missing path")]
    MissingPath { line: usize },
}

/// Treatment of a leading `/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsolutePaths {
    /// Drop it, so `/usr/bin` and `usr/bin` are the same node
    #[default]
    Strip,
    /// Keep it as a top-level segment named `/`
    RootSegment,
}

/// A parsed report
pub struct Report {
    pub tree: DuTree,
    /// Lines turned into tree records
    pub entries: usize,
    /// Malformed lines that were ignored
    pub skipped: usize,
}

impl Report {
    /// One-line account of what was read
    pub fn summary(&self) -> String {
        let root = self.tree.root();
        let mut summary = format!(
            "{} entries, {} nodes, {} KB total",
            self.entries,
            self.tree.node_count() - 1,
            self.tree.node(root).size()
        );
        if self.skipped > 0 {
            summary.push_str(&format!(", {} malformed lines skipped", self.skipped));
        }
        summary
    }
}

/// Split one report line into its size and path.
///
/// `line` is the 1-based line number used in errors.
pub fn parse_line(line: usize, text: &str) -> Result<(u64, &str), ReportError> {
    let text = text.trim_end_matches(['\n', '\r']).trim_start();
    if text.is_empty() {
        return Err(ReportError::MissingSize { line });
    }

    let (size, path) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let size = size.parse::<u64>().map_err(|_| ReportError::InvalidSize {
        line,
        value: size.to_string(),
    })?;

    let path = path.trim_start();
    if path.is_empty() {
        return Err(ReportError::MissingPath { line });
    }
    Ok((size, path))
}

/// Path segments for `path`; empty segments are dropped
pub fn split_path(path: &str, absolute: AbsolutePaths) -> Vec<&str> {
    let mut segments = Vec::new();
    if absolute == AbsolutePaths::RootSegment && path.starts_with('/') {
        segments.push("/");
    }
    segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
    segments
}

/// Build a tree from every line of `reader`
pub fn read_report<R: BufRead>(mut reader: R, settings: &InputSettings) -> io::Result<Report> {
    let mut builder =
        TreeBuilder::new(settings.duplicate_paths).with_groups(settings.groups.clone());
    let mut skipped = 0;
    let show_progress = io::stderr().is_terminal();

    let mut buf = Vec::new();
    let mut line = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line += 1;

        let text = String::from_utf8_lossy(&buf);
        if text.trim().is_empty() {
            continue;
        }

        match parse_line(line, &text) {
            Ok((size, path)) => {
                builder.insert(&split_path(path, settings.absolute_paths), size);
                let entries = builder.records();
                if show_progress && entries % PROGRESS_INTERVAL == 0 {
                    eprint!("{} entries\r", entries);
                }
            }
            Err(e) => {
                warn!("skipping report {}", e);
                skipped += 1;
            }
        }
    }

    let entries = builder.records();
    if show_progress {
        eprintln!("{} entries", entries);
        io::stderr().flush()?;
    }
    info!(entries, skipped, "report read");

    Ok(Report {
        tree: builder.finish(),
        entries,
        skipped,
    })
}

/// Read the report at `path`; `None` or `-` reads standard input
pub fn load(path: Option<&Path>, settings: &InputSettings) -> Result<Report> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file =
                File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
            read_report(BufReader::new(file), settings)
                .with_context(|| format!("Failed to read report from {}", path.display()))
        }
        _ => read_report(io::stdin().lock(), settings).context("Failed to read report from stdin"),
    }
}

//! Values produced by the split pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A maximal run of consecutive pages sharing one detected title.
///
/// Indices are 0-based and inclusive; `end_idx >= start_idx` always holds
/// for groups produced by [`crate::pipeline::group::group_consecutive_pages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGroup {
    pub title: String,
    pub start_idx: usize,
    pub end_idx: usize,
}

impl PageGroup {
    pub fn new(title: impl Into<String>, start_idx: usize, end_idx: usize) -> Self {
        Self {
            title: title.into(),
            start_idx,
            end_idx,
        }
    }

    /// Pages covered. An inverted group (`start_idx > end_idx`) counts as one.
    pub fn num_pages(&self) -> usize {
        self.end_idx.saturating_sub(self.start_idx) + 1
    }

    /// 1-indexed `(first, last)` page numbers, as shown to users.
    pub fn display_range(&self) -> (usize, usize) {
        (self.start_idx + 1, self.end_idx + 1)
    }
}

/// A group written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub output_path: PathBuf,
    pub group: PageGroup,
}

/// A group rendered to an in-memory PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFile {
    pub filename: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl NamedFile {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }

    /// Size in MiB, the unit the download page reports.
    pub fn size_mib(&self) -> f64 {
        self.content.len() as f64 / (1024.0 * 1024.0)
    }
}

/// A ZIP archive built from [`NamedFile`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    pub filename: String,
    pub content: Vec<u8>,
}

/// What one split run did, for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSummary {
    /// Path of the source PDF, or a description of an in-memory buffer.
    pub source: String,
    pub total_pages: usize,
    pub files: Vec<SplitFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitFile {
    /// Output path or archive member name.
    pub name: String,
    pub group: PageGroup,
}

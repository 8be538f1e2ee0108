//! Per-group PDF re-assembly.
//!
//! Each group becomes a new document into which pdfium imports the group's
//! page range from the source. Page objects are copied, not re-rendered, so
//! scanned pages keep their original image streams. The serialised bytes
//! are then handed to an [`OutputSink`], which decides where they go.

use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::output::{ExportResult, NamedFile, PageGroup};
use crate::pipeline::{engine, slug};
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for exported groups.
pub trait OutputSink {
    /// What the sink reports back for each accepted file.
    type Item;

    /// Called once before the first file, even when there are no groups.
    fn prepare(&mut self) -> Result<(), SplitError> {
        Ok(())
    }

    fn accept(
        &mut self,
        filename: String,
        group: &PageGroup,
        content: Vec<u8>,
    ) -> Result<Self::Item, SplitError>;
}

/// Writes each file into a directory, creating it (and its parents) first.
///
/// Files are written to a temporary name in the same directory and renamed
/// into place, so a failed run never leaves a truncated PDF behind. Files
/// from earlier groups stay on disk when a later one fails.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    type Item = ExportResult;

    fn prepare(&mut self) -> Result<(), SplitError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SplitError::OutputWriteFailed {
            path: self.dir.clone(),
            source,
        })
    }

    fn accept(
        &mut self,
        filename: String,
        group: &PageGroup,
        content: Vec<u8>,
    ) -> Result<ExportResult, SplitError> {
        let output_path = self.dir.join(&filename);
        let write_failed = |source: std::io::Error| SplitError::OutputWriteFailed {
            path: output_path.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_failed)?;
        tmp.write_all(&content).map_err(write_failed)?;
        tmp.persist(&output_path).map_err(|e| write_failed(e.error))?;

        debug!("Wrote {} ({} bytes)", output_path.display(), content.len());
        Ok(ExportResult {
            output_path,
            group: group.clone(),
        })
    }
}

/// Keeps every file in memory.
#[derive(Debug, Default)]
pub struct MemorySink;

impl OutputSink for MemorySink {
    type Item = NamedFile;

    fn accept(
        &mut self,
        filename: String,
        _group: &PageGroup,
        content: Vec<u8>,
    ) -> Result<NamedFile, SplitError> {
        Ok(NamedFile::new(filename, content))
    }
}

/// Check that `groups` fit a document of `total_pages` pages.
pub fn validate_groups(groups: &[PageGroup], total_pages: usize) -> Result<(), SplitError> {
    for group in groups {
        if group.start_idx > group.end_idx {
            return Err(SplitError::Internal(format!(
                "group '{}' starts after it ends ({} > {})",
                group.title, group.start_idx, group.end_idx
            )));
        }
        if group.end_idx >= total_pages {
            return Err(SplitError::PageOutOfRange {
                page: group.end_idx + 1,
                total: total_pages,
            });
        }
    }
    Ok(())
}

/// Export every group of `source` into `sink`, in group order.
///
/// `origin` names the source in error messages.
pub fn export_groups<S: OutputSink>(
    pdfium: &Pdfium,
    source: &PdfDocument<'_>,
    origin: &str,
    groups: &[PageGroup],
    sink: &mut S,
    config: &SplitConfig,
) -> Result<Vec<S::Item>, SplitError> {
    validate_groups(groups, source.pages().len() as usize)?;
    sink.prepare()?;

    let total = groups.len();
    let mut items = Vec::with_capacity(total);
    for (i, group) in groups.iter().enumerate() {
        let index = i + 1;
        let filename = slug::group_filename(index, &group.title, config.max_slug_len);
        let content = assemble(pdfium, source, origin, group)?;
        items.push(sink.accept(filename.clone(), group, content)?);

        if let Some(ref cb) = config.progress_callback {
            cb.on_group_exported(index, total, &filename, group);
        }
    }

    info!("Exported {} group(s) from {}", total, origin);
    Ok(items)
}

/// Build a standalone PDF holding `group`'s pages and serialise it.
fn assemble(
    pdfium: &Pdfium,
    source: &PdfDocument<'_>,
    origin: &str,
    group: &PageGroup,
) -> Result<Vec<u8>, SplitError> {
    let decode_failed = |detail: String| SplitError::CorruptPdf {
        origin: origin.to_string(),
        detail,
    };

    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| SplitError::Internal(format!("cannot create output document: {e:?}")))?;

    let range = engine::page_index(group.start_idx)?..=engine::page_index(group.end_idx)?;
    document
        .pages_mut()
        .copy_page_range_from_document(source, range, 0)
        .map_err(|e| {
            decode_failed(format!(
                "importing pages {}-{}: {e:?}",
                group.start_idx + 1,
                group.end_idx + 1
            ))
        })?;

    document
        .save_to_bytes()
        .map_err(|e| decode_failed(format!("serialising '{}': {e:?}", group.title)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_full_cover() {
        let groups = vec![PageGroup::new("A", 0, 1), PageGroup::new("B", 2, 2)];
        assert!(validate_groups(&groups, 3).is_ok());
    }

    #[test]
    fn validate_rejects_overflow() {
        let groups = vec![PageGroup::new("A", 0, 3)];
        match validate_groups(&groups, 3).unwrap_err() {
            SplitError::PageOutOfRange { page, total } => {
                assert_eq!(page, 4);
                assert_eq!(total, 3);
            }
            other => panic!("expected PageOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_inverted_group() {
        let groups = vec![PageGroup::new("A", 2, 1)];
        assert!(matches!(
            validate_groups(&groups, 5),
            Err(SplitError::Internal(_))
        ));
    }

    #[test]
    fn directory_sink_creates_nested_dir_and_writes() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().join("a/b/out");
        let mut sink = DirectorySink::new(&dir);
        sink.prepare().unwrap();
        assert!(dir.is_dir());

        let group = PageGroup::new("Bail", 1, 2);
        let result = sink
            .accept("02-bail.pdf".into(), &group, b"%PDF-fake".to_vec())
            .unwrap();

        assert_eq!(result.output_path, dir.join("02-bail.pdf"));
        assert_eq!(result.group, group);
        assert_eq!(std::fs::read(&result.output_path).unwrap(), b"%PDF-fake");
        // No stray temp files left next to the output.
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn directory_sink_overwrites_existing_file() {
        let scratch = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(scratch.path());
        sink.prepare().unwrap();
        let group = PageGroup::new("Bail", 0, 0);

        sink.accept("01-bail.pdf".into(), &group, b"old".to_vec()).unwrap();
        sink.accept("01-bail.pdf".into(), &group, b"new".to_vec()).unwrap();

        assert_eq!(std::fs::read(scratch.path().join("01-bail.pdf")).unwrap(), b"new");
    }

    #[test]
    fn directory_sink_reports_unwritable_destination() {
        let scratch = tempfile::tempdir().unwrap();
        let blocker = scratch.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        // A regular file where a directory is expected.
        let mut sink = DirectorySink::new(blocker.join("out"));
        let err = sink.prepare().unwrap_err();
        assert!(matches!(err, SplitError::OutputWriteFailed { .. }), "got {err:?}");
    }

    #[test]
    fn memory_sink_keeps_name_and_bytes() {
        let mut sink = MemorySink;
        let file = sink
            .accept("01-x.pdf".into(), &PageGroup::new("x", 0, 0), vec![1, 2, 3])
            .unwrap();
        assert_eq!(file, NamedFile::new("01-x.pdf", vec![1, 2, 3]));
    }
}

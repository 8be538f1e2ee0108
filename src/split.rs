//! Split entry points.
//!
//! Every operation goes through [`run_pipeline`]: bind pdfium, load the
//! source once, detect titles, group them, export each group into an
//! [`OutputSink`]. The on-disk and in-memory variants differ only in the
//! sink they pass, so the CLI and embedding callers cannot drift apart.
//!
//! All functions here block. The `*_async` wrappers move the same work onto
//! tokio's blocking pool, since pdfium must not run on an async worker.

use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::output::{ArchiveOutput, ExportResult, NamedFile, PageGroup};
use crate::pipeline::export::{self, DirectorySink, MemorySink, OutputSink};
use crate::pipeline::input::PdfSource;
use crate::pipeline::{archive, engine, group, titles};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Detected title of every page, cover override applied.
pub fn page_titles(source: &PdfSource, config: &SplitConfig) -> Result<Vec<String>, SplitError> {
    let pdfium = engine::shared()?;
    let document = source.open(pdfium, config.password.as_deref())?;
    detect_titles(&document, &source.describe(), config)
}

/// Titles grouped into consecutive runs.
pub fn page_groups(source: &PdfSource, config: &SplitConfig) -> Result<Vec<PageGroup>, SplitError> {
    let titles = page_titles(source, config)?;
    Ok(group::group_consecutive_pages(&titles))
}

/// Full pipeline: detect groups in `source` and export them into `sink`.
pub fn run_pipeline<S: OutputSink>(
    source: &PdfSource,
    sink: &mut S,
    config: &SplitConfig,
) -> Result<Vec<S::Item>, SplitError> {
    let origin = source.describe();
    let pdfium = engine::shared()?;
    let document = source.open(pdfium, config.password.as_deref())?;

    let total_pages = document.pages().len() as usize;
    info!("Loaded {}: {} pages", origin, total_pages);
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_loaded(total_pages);
    }

    let titles = detect_titles(&document, &origin, config)?;
    let groups = group::group_consecutive_pages(&titles);
    info!("Detected {} document(s) in {}", groups.len(), origin);
    if let Some(ref cb) = config.progress_callback {
        cb.on_groups_detected(&groups);
    }

    let items = export::export_groups(pdfium, &document, &origin, &groups, sink, config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_split_complete(items.len());
    }
    Ok(items)
}

/// Export already-computed `groups` of `source` into `sink`.
///
/// For callers that inspect or edit the groups before exporting.
pub fn export_with<S: OutputSink>(
    source: &PdfSource,
    groups: &[PageGroup],
    sink: &mut S,
    config: &SplitConfig,
) -> Result<Vec<S::Item>, SplitError> {
    let pdfium = engine::shared()?;
    let document = source.open(pdfium, config.password.as_deref())?;
    export::export_groups(pdfium, &document, &source.describe(), groups, sink, config)
}

/// Split the PDF at `pdf_path` into one file per document.
///
/// Files go to `output_dir`, or to [`default_output_dir`] when `None`. The
/// directory is created if needed.
pub fn split_to_dir(
    pdf_path: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &SplitConfig,
) -> Result<Vec<ExportResult>, SplitError> {
    let pdf_path = pdf_path.as_ref();
    let source = PdfSource::from_path(pdf_path)?;
    let dest = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(pdf_path));

    run_pipeline(&source, &mut DirectorySink::new(dest), config)
}

/// Split an in-memory PDF into named in-memory PDFs.
pub fn split_bytes(pdf_bytes: &[u8], config: &SplitConfig) -> Result<Vec<NamedFile>, SplitError> {
    let source = PdfSource::from_bytes(pdf_bytes);
    run_pipeline(&source, &mut MemorySink, config)
}

/// Split an in-memory PDF and zip the results.
///
/// The archive is named after `zip_basename`, falling back to
/// [`SplitConfig::zip_basename`].
pub fn split_bytes_to_zip(
    pdf_bytes: &[u8],
    zip_basename: Option<&str>,
    config: &SplitConfig,
) -> Result<(Vec<NamedFile>, ArchiveOutput), SplitError> {
    let files = split_bytes(pdf_bytes, config)?;
    let basename = zip_basename.unwrap_or(&config.zip_basename);
    let zip = archive::build_zip(&files, basename, config.max_slug_len)?;
    Ok((files, zip))
}

/// `<parent>/<stem>_extracted` next to `pdf_path`.
pub fn default_output_dir(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let parent = pdf_path.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{stem}_extracted"))
}

/// [`split_to_dir`] on tokio's blocking pool.
pub async fn split_to_dir_async(
    pdf_path: PathBuf,
    output_dir: Option<PathBuf>,
    config: SplitConfig,
) -> Result<Vec<ExportResult>, SplitError> {
    tokio::task::spawn_blocking(move || split_to_dir(&pdf_path, output_dir.as_deref(), &config))
        .await
        .map_err(|e| SplitError::Internal(format!("Split task panicked: {e}")))?
}

/// [`split_bytes_to_zip`] on tokio's blocking pool.
pub async fn split_bytes_to_zip_async(
    pdf_bytes: Vec<u8>,
    zip_basename: Option<String>,
    config: SplitConfig,
) -> Result<(Vec<NamedFile>, ArchiveOutput), SplitError> {
    tokio::task::spawn_blocking(move || {
        split_bytes_to_zip(&pdf_bytes, zip_basename.as_deref(), &config)
    })
    .await
    .map_err(|e| SplitError::Internal(format!("Split task panicked: {e}")))?
}

fn detect_titles(
    document: &PdfDocument<'_>,
    origin: &str,
    config: &SplitConfig,
) -> Result<Vec<String>, SplitError> {
    let mut titles = titles::extract_titles(document, config.title_rule.as_ref(), origin)?;
    titles::apply_cover_title(&mut titles, &config.cover_title);
    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_dir_sits_next_to_pdf() {
        assert_eq!(
            default_output_dir(Path::new("/home/jean/Dossier Jean.pdf")),
            PathBuf::from("/home/jean/Dossier Jean_extracted")
        );
    }

    #[test]
    fn default_output_dir_for_bare_filename() {
        assert_eq!(
            default_output_dir(Path::new("dossier.pdf")),
            PathBuf::from("dossier_extracted")
        );
    }

    #[test]
    fn split_to_dir_checks_source_before_binding_pdfium() {
        let scratch = tempfile::tempdir().unwrap();
        let missing = scratch.path().join("nope.pdf");

        let err = split_to_dir(&missing, None, &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, SplitError::SourceNotFound { .. }), "got {err:?}");
        assert!(!default_output_dir(&missing).exists());
    }

    #[tokio::test]
    async fn async_wrapper_propagates_source_errors() {
        let scratch = tempfile::tempdir().unwrap();
        let not_pdf = scratch.path().join("notes.pdf");
        std::fs::write(&not_pdf, b"hello world").unwrap();

        let err = split_to_dir_async(not_pdf, None, SplitConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SplitError::NotAPdf { .. }), "got {err:?}");
    }
}

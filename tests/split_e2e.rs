//! End-to-end tests for dossier-split.
//!
//! The fixtures are built at test time with pdfium itself: each page gets the
//! three DossierFacile header lines followed by a document label. Tests skip
//! when no pdfium library can be bound (set `PDFIUM_LIB_PATH`, or run the
//! `dossier-split` binary once to populate the cache).
//!
//! Run with:
//!   cargo test --test split_e2e -- --nocapture

use dossier_split::pipeline::engine;
use dossier_split::{
    export_with, page_groups, page_titles, split_bytes, split_bytes_to_zip, split_to_dir,
    MemorySink, PageGroup, PdfSource, SplitConfig, SplitError, SplitProgressCallback,
    COVER_PAGE_TITLE, UNKNOWN_TITLE,
};
use pdfium_render::prelude::*;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

const HEADER: [&str; 3] = ["DossierFacile", "Dossier de Jean Dupont", "Locataire"];

/// Skip this test when pdfium cannot be bound on this machine.
macro_rules! skip_unless_pdfium {
    () => {{
        match engine::shared() {
            Ok(pdfium) => pdfium,
            Err(e) => {
                println!("SKIP — pdfium unavailable: {e}");
                return;
            }
        }
    }};
}

/// A page carrying the DossierFacile header and `label` as its 4th line.
fn labelled(label: &str) -> Vec<String> {
    HEADER
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(label.to_string()))
        .collect()
}

/// Build a PDF with one page per entry, one text line per string.
fn build_pdf(pdfium: &Pdfium, pages: &[Vec<String>]) -> Vec<u8> {
    let mut document = pdfium.create_new_pdf().unwrap();
    let font = document.fonts_mut().helvetica();

    for lines in pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .unwrap();
        for (i, line) in lines.iter().enumerate() {
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(72.0),
                    PdfPoints::new(770.0 - 28.0 * i as f32),
                    line,
                    font,
                    PdfPoints::new(12.0),
                )
                .unwrap();
        }
    }

    document.save_to_bytes().unwrap()
}

/// Cover sheet, then Bail ×2, Avis d'imposition ×2, Bail ×1.
fn dossier_fixture(pdfium: &Pdfium) -> Vec<u8> {
    build_pdf(
        pdfium,
        &[
            labelled("Sommaire"),
            labelled("Bail"),
            labelled("Bail"),
            labelled("Avis d'imposition"),
            labelled("Avis d'imposition"),
            labelled("Bail"),
        ],
    )
}

fn page_count(pdfium: &Pdfium, bytes: &[u8]) -> usize {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .unwrap()
        .pages()
        .len() as usize
}

// ── Title detection ──────────────────────────────────────────────────────────

#[test]
fn titles_come_from_fourth_line_with_cover_override() {
    let pdfium = skip_unless_pdfium!();
    let source = PdfSource::from_bytes(dossier_fixture(pdfium));

    let titles = page_titles(&source, &SplitConfig::default()).unwrap();
    assert_eq!(
        titles,
        vec![
            COVER_PAGE_TITLE,
            "Bail",
            "Bail",
            "Avis d'imposition",
            "Avis d'imposition",
            "Bail",
        ]
    );
}

#[test]
fn short_and_blank_pages_are_unknown() {
    let pdfium = skip_unless_pdfium!();
    let bytes = build_pdf(
        pdfium,
        &[
            labelled("Sommaire"),
            HEADER.iter().map(|s| s.to_string()).collect(),
            Vec::new(),
        ],
    );

    let titles = page_titles(&PdfSource::from_bytes(bytes), &SplitConfig::default()).unwrap();
    assert_eq!(titles, vec![COVER_PAGE_TITLE, UNKNOWN_TITLE, UNKNOWN_TITLE]);
}

#[test]
fn single_page_pdf_is_one_cover_group() {
    let pdfium = skip_unless_pdfium!();
    let bytes = build_pdf(pdfium, &[labelled("Pièce d'identité")]);

    let groups = page_groups(&PdfSource::from_bytes(bytes), &SplitConfig::default()).unwrap();
    assert_eq!(groups, vec![PageGroup::new(COVER_PAGE_TITLE, 0, 0)]);
}

#[test]
fn non_adjacent_runs_stay_separate() {
    let pdfium = skip_unless_pdfium!();
    let source = PdfSource::from_bytes(dossier_fixture(pdfium));

    let groups = page_groups(&source, &SplitConfig::default()).unwrap();
    assert_eq!(
        groups,
        vec![
            PageGroup::new(COVER_PAGE_TITLE, 0, 0),
            PageGroup::new("Bail", 1, 2),
            PageGroup::new("Avis d'imposition", 3, 4),
            PageGroup::new("Bail", 5, 5),
        ]
    );
}

// ── Export ───────────────────────────────────────────────────────────────────

#[test]
fn split_bytes_names_and_page_counts() {
    let pdfium = skip_unless_pdfium!();
    let files = split_bytes(&dossier_fixture(pdfium), &SplitConfig::default()).unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "01-page-de-garde-dossierfacile.pdf",
            "02-bail.pdf",
            "03-avis-dimposition.pdf",
            "04-bail.pdf",
        ]
    );

    let counts: Vec<usize> = files
        .iter()
        .map(|f| page_count(pdfium, &f.content))
        .collect();
    assert_eq!(counts, vec![1, 2, 2, 1]);
    assert_eq!(counts.iter().sum::<usize>(), 6);
}

#[test]
fn exported_pages_keep_their_text() {
    let pdfium = skip_unless_pdfium!();
    let files = split_bytes(&dossier_fixture(pdfium), &SplitConfig::default()).unwrap();

    let avis = pdfium
        .load_pdf_from_byte_slice(&files[2].content, None)
        .unwrap();
    for page in avis.pages().iter() {
        let text = page.text().unwrap().all();
        assert!(text.contains("Avis d'imposition"), "page text: {text:?}");
    }
}

#[test]
fn split_to_dir_writes_files_into_new_directory() {
    let pdfium = skip_unless_pdfium!();
    let scratch = tempfile::tempdir().unwrap();
    let pdf_path = scratch.path().join("DossierFacile-Jean.pdf");
    std::fs::write(&pdf_path, dossier_fixture(pdfium)).unwrap();
    let out = scratch.path().join("nested").join("out");

    let results = split_to_dir(&pdf_path, Some(&out), &SplitConfig::default()).unwrap();
    assert_eq!(results.len(), 4);
    for r in &results {
        assert_eq!(r.output_path.parent().unwrap(), out);
        let bytes = std::fs::read(&r.output_path).unwrap();
        assert_eq!(page_count(pdfium, &bytes), r.group.num_pages());
    }

    let mut on_disk: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    on_disk.sort();
    assert_eq!(
        on_disk,
        vec![
            "01-page-de-garde-dossierfacile.pdf",
            "02-bail.pdf",
            "03-avis-dimposition.pdf",
            "04-bail.pdf",
        ]
    );
}

#[test]
fn split_to_dir_defaults_next_to_source() {
    let pdfium = skip_unless_pdfium!();
    let scratch = tempfile::tempdir().unwrap();
    let pdf_path = scratch.path().join("dossier.pdf");
    std::fs::write(&pdf_path, dossier_fixture(pdfium)).unwrap();

    let results = split_to_dir(&pdf_path, None, &SplitConfig::default()).unwrap();
    let expected = scratch.path().join("dossier_extracted");
    assert!(results.iter().all(|r| r.output_path.starts_with(&expected)));
}

#[test]
fn export_with_rejects_groups_past_the_end() {
    let pdfium = skip_unless_pdfium!();
    let source = PdfSource::from_bytes(dossier_fixture(pdfium));
    let groups = vec![PageGroup::new("Bail", 4, 9)];

    let err = export_with(&source, &groups, &mut MemorySink, &SplitConfig::default()).unwrap_err();
    assert!(
        matches!(err, SplitError::PageOutOfRange { total: 6, .. }),
        "got {err:?}"
    );
}

// ── Archive ──────────────────────────────────────────────────────────────────

#[test]
fn zip_holds_every_file_in_order() {
    let pdfium = skip_unless_pdfium!();
    let (files, zip) = split_bytes_to_zip(
        &dossier_fixture(pdfium),
        Some("DossierFacile_extracted"),
        &SplitConfig::default(),
    )
    .unwrap();
    assert_eq!(zip.filename, "dossierfacile_extracted.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(zip.content)).unwrap();
    assert_eq!(archive.len(), files.len());
    for (i, file) in files.iter().enumerate() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), file.filename);
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, file.content);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn zip_async_matches_blocking_call() {
    let pdfium = skip_unless_pdfium!();
    let bytes = dossier_fixture(pdfium);

    let (files, zip) =
        dossier_split::split_bytes_to_zip_async(bytes, None, SplitConfig::default())
            .await
            .unwrap();
    assert_eq!(files.len(), 4);
    assert_eq!(zip.filename, "extracted.zip");
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[test]
fn corrupt_buffer_is_corrupt_pdf() {
    let _ = skip_unless_pdfium!();
    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.extend_from_slice(&[0u8; 64]);

    let err = split_bytes(&bytes, &SplitConfig::default()).unwrap_err();
    assert!(matches!(err, SplitError::CorruptPdf { .. }), "got {err:?}");
    assert!(!err.is_source_error());
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    loaded: AtomicUsize,
    exported: Mutex<Vec<String>>,
    completed: AtomicUsize,
}

impl SplitProgressCallback for Recorder {
    fn on_document_loaded(&self, total_pages: usize) {
        self.loaded.store(total_pages, Ordering::SeqCst);
    }

    fn on_group_exported(&self, _index: usize, _total: usize, filename: &str, _group: &PageGroup) {
        self.exported.lock().unwrap().push(filename.to_string());
    }

    fn on_split_complete(&self, total_files: usize) {
        self.completed.store(total_files, Ordering::SeqCst);
    }
}

#[test]
fn progress_callback_sees_every_file() {
    let pdfium = skip_unless_pdfium!();
    let recorder = Arc::new(Recorder::default());
    let config = SplitConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let files = split_bytes(&dossier_fixture(pdfium), &config).unwrap();

    assert_eq!(recorder.loaded.load(Ordering::SeqCst), 6);
    assert_eq!(recorder.completed.load(Ordering::SeqCst), files.len());
    let exported = recorder.exported.lock().unwrap().clone();
    let names: Vec<String> = files.into_iter().map(|f| f.filename).collect();
    assert_eq!(exported, names);
}

#[test]
fn custom_cover_title_names_first_file() {
    let pdfium = skip_unless_pdfium!();
    let config = SplitConfig::builder()
        .cover_title("Couverture")
        .build()
        .unwrap();

    let files = split_bytes(&dossier_fixture(pdfium), &config).unwrap();
    assert_eq!(files[0].filename, "01-couverture.pdf");
}

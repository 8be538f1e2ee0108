//! # dossier-split
//!
//! Split the single PDF exported by DossierFacile into one PDF per
//! supporting document (ID card, payslips, tax notice, ...), ready to be
//! uploaded one by one to letting platforms.
//!
//! ## How documents are found
//!
//! DossierFacile prints a three-line header on every page, followed by the
//! label of the document the page belongs to. The pipeline reads that label
//! from each page's text layer, treats the first page as the generated cover
//! sheet, and cuts the export wherever the label changes:
//!
//! ```text
//! PDF (path or bytes)
//!  │
//!  ├─ 1. Input    validate path / wrap buffer
//!  ├─ 2. Titles   4th text line of each page; page 1 → "Page de garde DossierFacile"
//!  ├─ 3. Group    consecutive identical titles → one group
//!  ├─ 4. Export   one PDF per group: NN-<slug>.pdf, to a directory or memory
//!  └─ 5. Archive  optional ZIP of the in-memory files
//! ```
//!
//! No OCR is involved: a page without a text layer gets the title
//! `"unknown"`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dossier_split::{split_to_dir, SplitConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let results = split_to_dir("DossierFacile.pdf", None, &SplitConfig::default())?;
//!     for r in &results {
//!         println!("{} ({} pages)", r.output_path.display(), r.group.num_pages());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! In-memory, e.g. behind an upload form:
//!
//! ```rust,no_run
//! use dossier_split::{split_bytes_to_zip, SplitConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let upload: Vec<u8> = std::fs::read("DossierFacile.pdf")?;
//! let (files, zip) = split_bytes_to_zip(&upload, Some("DossierFacile_extracted"), &SplitConfig::default())?;
//! println!("{} files → {} ({} bytes)", files.len(), zip.filename, zip.content.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## PDF engine
//!
//! Text extraction and page import use pdfium through `pdfium-render`. The
//! library is found via `PDFIUM_LIB_PATH`, the `pdfium-auto` cache, or the
//! system loader. The `dossier-split` binary downloads it on first run.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `dossier-split` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod split;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SplitConfig, SplitConfigBuilder};
pub use error::SplitError;
pub use output::{ArchiveOutput, ExportResult, NamedFile, PageGroup, SplitFile, SplitSummary};
pub use pipeline::archive::build_zip;
pub use pipeline::export::{DirectorySink, MemorySink, OutputSink};
pub use pipeline::group::group_consecutive_pages;
pub use pipeline::input::PdfSource;
pub use pipeline::slug::{group_filename, slugify};
pub use pipeline::titles::{FixedLineRule, TitleRule, COVER_PAGE_TITLE, UNKNOWN_TITLE};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use split::{
    default_output_dir, export_with, page_groups, page_titles, run_pipeline, split_bytes,
    split_bytes_to_zip, split_bytes_to_zip_async, split_to_dir, split_to_dir_async,
};

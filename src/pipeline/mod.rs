//! Pipeline stages for splitting a PDF export.
//!
//! Each submodule implements one step and is testable on its own; only
//! [`input`], [`titles`] and [`export`] touch pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ titles ──▶ group ──▶ export ──▶ archive
//! (path/bytes) (text layer) (runs) (sink)   (zip, optional)
//! ```
//!
//! 1. [`input`]   — validate a path or wrap a byte buffer as a [`input::PdfSource`]
//! 2. [`titles`]  — one title per page through a [`titles::TitleRule`], then
//!    the cover-page override
//! 3. [`group`]   — run-length encode the titles into page groups
//! 4. [`export`]  — rebuild one PDF per group and hand it to an
//!    [`export::OutputSink`] (directory or memory); names come from [`slug`]
//! 5. [`archive`] — zip in-memory files for a single download
//!
//! [`engine`] binds the pdfium library for steps 1–4.

pub mod archive;
pub mod engine;
pub mod export;
pub mod group;
pub mod input;
pub mod slug;
pub mod titles;

//! Error type for the dossier-split library.
//!
//! Every failure is fatal to the invocation that hit it: the pipeline never
//! retries, never skips a page and never returns partial output. Variants are
//! grouped by the stage that raises them so presentation layers can map them
//! to a message and an exit status without string matching.
//!
//! | Stage | Variants |
//! |-------|----------|
//! | source checks (before any PDF work) | `SourceNotFound`, `SourceInvalid`, `PermissionDenied`, `NotAPdf` |
//! | decoding | `CorruptPdf`, `PasswordRequired`, `WrongPassword`, `PageOutOfRange` |
//! | destination | `OutputWriteFailed` |
//! | packaging | `Archive` |

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// Nothing exists at the given path.
    #[error("PDF file not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// Something exists at the path but cannot be used as a source
    /// (a directory, a socket, ...).
    #[error("'{path}' is not a usable PDF source: {reason}")]
    SourceInvalid { path: PathBuf, reason: String },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file was read but does not start with the `%PDF` marker.
    #[error("File is not a PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// pdfium could not parse the document or one of its pages.
    /// `origin` is a path or an in-memory buffer description.
    #[error("PDF {origin} could not be decoded: {detail}")]
    CorruptPdf { origin: String, detail: String },

    #[error("PDF {origin} is encrypted and requires a password")]
    PasswordRequired { origin: String },

    #[error("Wrong password for PDF {origin}")]
    WrongPassword { origin: String },

    /// A group refers to a page the document does not have.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Destination errors ────────────────────────────────────────────────
    /// The output directory or one of the output files could not be written.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Packaging errors ──────────────────────────────────────────────────
    #[error("Failed to build ZIP archive: {detail}")]
    Archive { detail: String },

    // ── Engine / config ───────────────────────────────────────────────────
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is downloaded automatically by the dossier-split CLI on first run.\n\
Library callers can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Call pdfium_auto::ensure_library() once before splitting.\n"
    )]
    PdfiumBindingFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SplitError {
    /// `true` for failures detected before the PDF engine was involved.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            SplitError::SourceNotFound { .. }
                | SplitError::SourceInvalid { .. }
                | SplitError::PermissionDenied { .. }
                | SplitError::NotAPdf { .. }
        )
    }
}

impl From<zip::result::ZipError> for SplitError {
    fn from(e: zip::result::ZipError) -> Self {
        SplitError::Archive {
            detail: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_the_path() {
        let e = SplitError::SourceNotFound {
            path: PathBuf::from("/tmp/dossier.pdf"),
        };
        assert!(e.to_string().contains("/tmp/dossier.pdf"));
        assert!(e.is_source_error());
    }

    #[test]
    fn decode_errors_are_not_source_errors() {
        let e = SplitError::CorruptPdf {
            origin: "<memory: 12 bytes>".into(),
            detail: "FormatError".into(),
        };
        assert!(!e.is_source_error());
        assert!(e.to_string().contains("<memory: 12 bytes>"));
    }

    #[test]
    fn output_write_failed_keeps_io_source() {
        use std::error::Error as _;

        let e = SplitError::OutputWriteFailed {
            path: PathBuf::from("/ro/out"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/ro/out"));
    }

    #[test]
    fn page_out_of_range_display() {
        let e = SplitError::PageOutOfRange { page: 12, total: 10 };
        let msg = e.to_string();
        assert!(msg.contains("Page 12"), "got: {msg}");
        assert!(msg.contains("10 pages"), "got: {msg}");
    }

    #[test]
    fn zip_errors_become_archive_errors() {
        let e: SplitError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(e, SplitError::Archive { .. }));
    }
}

//! Source resolution: the PDF to split, on disk or in memory.
//!
//! Path sources are checked up front (exists, regular file, readable, a
//! `%PDF` header within the first KiB, as pdfium accepts) so that an
//! obviously wrong argument fails before the PDF engine is even bound. In-memory buffers are handed to pdfium as-is; a
//! malformed buffer surfaces as [`SplitError::CorruptPdf`].

use crate::error::SplitError;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// pdfium looks for the `%PDF` header this far into the file.
const HEADER_SEARCH_LEN: u64 = 1024;

/// The PDF export being split.
#[derive(Debug, Clone)]
pub enum PdfSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfSource {
    /// Validate `path` and wrap it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SplitError> {
        let path = path.as_ref().to_path_buf();
        check_local(&path)?;
        debug!("Resolved local PDF: {}", path.display());
        Ok(PdfSource::File(path))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        PdfSource::Bytes(bytes.into())
    }

    /// Human-readable origin used in error messages.
    pub fn describe(&self) -> String {
        match self {
            PdfSource::File(path) => format!("'{}'", path.display()),
            PdfSource::Bytes(bytes) => format!("<memory: {} bytes>", bytes.len()),
        }
    }

    /// Load the document with `pdfium`.
    pub fn open<'a>(
        &'a self,
        pdfium: &'a Pdfium,
        password: Option<&'a str>,
    ) -> Result<PdfDocument<'a>, SplitError> {
        let loaded = match self {
            PdfSource::File(path) => pdfium.load_pdf_from_file(path, password),
            PdfSource::Bytes(bytes) => pdfium.load_pdf_from_byte_slice(bytes, password),
        };
        loaded.map_err(|e| self.classify_load_error(e, password.is_some()))
    }

    fn classify_load_error(&self, e: PdfiumError, had_password: bool) -> SplitError {
        let origin = self.describe();
        let detail = format!("{e:?}");
        if detail.contains("Password") || detail.contains("password") {
            if had_password {
                SplitError::WrongPassword { origin }
            } else {
                SplitError::PasswordRequired { origin }
            }
        } else {
            SplitError::CorruptPdf { origin, detail }
        }
    }
}

fn check_local(path: &Path) -> Result<(), SplitError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SplitError::SourceNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SplitError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(SplitError::SourceInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    if !meta.is_file() {
        return Err(SplitError::SourceInvalid {
            path: path.to_path_buf(),
            reason: "not a regular file".into(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => SplitError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SplitError::SourceInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let mut head = Vec::new();
    file.take(HEADER_SEARCH_LEN)
        .read_to_end(&mut head)
        .map_err(|e| SplitError::SourceInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    // Files shorter than the magic are left for pdfium to reject.
    if head.len() >= 4 && !head.windows(4).any(|w| w == b"%PDF") {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[..4]);
        return Err(SplitError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    Ok(())
}

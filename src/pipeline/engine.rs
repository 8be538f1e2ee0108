//! Binding the pdfium library.
//!
//! Dropping a `Pdfium` handle tears the library down for every handle in the
//! process, so the pipeline binds once and shares the handle. The `sync`
//! feature makes `Pdfium` shareable; `thread_safe` serialises calls into it.
//! The library file itself is resolved by `pdfium-auto` (env override, then
//! cache); when neither has one, the system loader is tried. Downloading is left to the caller; the CLI does it
//! before the first split.

use crate::error::SplitError;
use pdfium_render::prelude::*;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::debug;

static ENGINE: OnceLock<Pdfium> = OnceLock::new();
static BINDING: Mutex<()> = Mutex::new(());

/// The process-wide pdfium handle, bound on first use.
///
/// A failed bind is not remembered; the next call tries again.
pub fn shared() -> Result<&'static Pdfium, SplitError> {
    if let Some(pdfium) = ENGINE.get() {
        return Ok(pdfium);
    }

    let _guard = BINDING.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(pdfium) = ENGINE.get() {
        return Ok(pdfium);
    }
    let pdfium = bind()?;
    Ok(ENGINE.get_or_init(|| pdfium))
}

fn bind() -> Result<Pdfium, SplitError> {
    if let Some(library) = pdfium_auto::locate() {
        debug!(
            "Binding pdfium from {} ({:?})",
            library.path.display(),
            library.origin
        );
        return pdfium_auto::bind(&library.path)
            .map_err(|e| SplitError::PdfiumBindingFailed(e.to_string()));
    }

    debug!("No cached pdfium; trying the system library");
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| SplitError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Convert a 0-based page index to pdfium's index type.
pub(crate) fn page_index(idx: usize) -> Result<PdfPageIndex, SplitError> {
    PdfPageIndex::try_from(idx)
        .map_err(|_| SplitError::Internal(format!("page index {idx} exceeds pdfium's range")))
}

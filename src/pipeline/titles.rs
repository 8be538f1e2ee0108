//! Page-title detection.
//!
//! DossierFacile stamps every page with a three-line header followed by the
//! label of the supporting document the page belongs to. Reading that label
//! back out of the text layer is a positional rule, not text analysis, so it
//! sits behind [`TitleRule`]: a different exporter layout only needs another
//! rule, not a change to the page loop.
//!
//! The cover sheet is handled separately by [`apply_cover_title`] after
//! every page has been classified.

use crate::error::SplitError;
use pdfium_render::prelude::*;
use tracing::debug;

/// Title given to pages whose label line is missing or blank.
pub const UNKNOWN_TITLE: &str = "unknown";

/// Title forced onto page 1, the generated cover sheet.
pub const COVER_PAGE_TITLE: &str = "Page de garde DossierFacile";

/// Turns one page's extracted text into its title.
pub trait TitleRule: Send + Sync {
    fn title_for(&self, page_text: &str) -> String;
}

/// Takes the title from a fixed line of the page text.
///
/// Lines are trimmed before they are counted. A page with too few lines, or
/// whose label line is blank, gets [`UNKNOWN_TITLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLineRule {
    line_index: usize,
}

impl FixedLineRule {
    /// Rule reading the 0-based line `line_index`.
    pub fn new(line_index: usize) -> Self {
        Self { line_index }
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }
}

impl Default for FixedLineRule {
    /// The DossierFacile layout: label on the 4th line.
    fn default() -> Self {
        Self::new(3)
    }
}

impl TitleRule for FixedLineRule {
    fn title_for(&self, page_text: &str) -> String {
        page_text
            .lines()
            .map(str::trim)
            .nth(self.line_index)
            .filter(|line| !line.is_empty())
            .unwrap_or(UNKNOWN_TITLE)
            .to_string()
    }
}

/// Overwrite the first title with `cover_title`. No-op on an empty slice.
pub fn apply_cover_title(titles: &mut [String], cover_title: &str) {
    if let Some(first) = titles.first_mut() {
        *first = cover_title.to_string();
    }
}

/// Classify every page of `document` with `rule`, in page order.
///
/// Returns raw per-page titles; the cover override is not applied here.
pub fn extract_titles(
    document: &PdfDocument<'_>,
    rule: &dyn TitleRule,
    origin: &str,
) -> Result<Vec<String>, SplitError> {
    let pages = document.pages();
    let mut titles = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| SplitError::CorruptPdf {
            origin: origin.to_string(),
            detail: format!("text layer of page {}: {e:?}", idx + 1),
        })?;
        let title = rule.title_for(&text.all());
        debug!("Page {} → {:?}", idx + 1, title);
        titles.push(title);
    }

    Ok(titles)
}

//! Progress-callback trait for split events.
//!
//! Inject an [`Arc<dyn SplitProgressCallback>`] via
//! [`crate::config::SplitConfigBuilder::progress_callback`] to be told when
//! the source has been read, how it was grouped, and as each file is
//! produced. The library itself prints nothing; the CLI implements this
//! trait to draw its progress bar.
//!
//! # Example
//!
//! ```rust
//! use dossier_split::{PageGroup, SplitConfig, SplitProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl SplitProgressCallback for Counter {
//!     fn on_group_exported(&self, _index: usize, _total: usize, filename: &str, _group: &PageGroup) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("wrote {filename}");
//!     }
//! }
//!
//! let config = SplitConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::PageGroup;
use std::sync::Arc;

/// Called by the split pipeline as it runs.
///
/// All methods default to no-ops. Implementations must be `Send + Sync`
/// because the async entry points run the pipeline on a blocking worker
/// thread.
pub trait SplitProgressCallback: Send + Sync {
    /// The source was loaded and has `total_pages` pages.
    fn on_document_loaded(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Titles were detected and grouped; export is about to start.
    fn on_groups_detected(&self, groups: &[PageGroup]) {
        let _ = groups;
    }

    /// Group `index` (1-based) of `total` was written as `filename`.
    fn on_group_exported(&self, index: usize, total: usize, filename: &str, group: &PageGroup) {
        let _ = (index, total, filename, group);
    }

    /// Every group was exported.
    fn on_split_complete(&self, total_files: usize) {
        let _ = total_files;
    }
}

/// Callback that ignores every event.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Shared callback handle stored in [`crate::config::SplitConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;

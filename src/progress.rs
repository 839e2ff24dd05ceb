//! Progress-callback trait for per-document and per-figure events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the driver walks documents, pages and figures.
//!
//! # Example
//!
//! ```rust
//! use scan_figures::{ExtractionConfig, ExtractionProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_figure_saved(&self, chapter: &str, page_num: usize, figure: usize, path: &Path) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{chapter}: page {page_num} figure {figure} → {}", path.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { saved: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the extraction driver as it processes documents.
///
/// Implementations must be `Send + Sync`: the async entry point runs the
/// driver on tokio's blocking pool, so events arrive on a thread other than
/// the caller's. All methods have default no-op implementations so callers
/// only override what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the source directory has been listed.
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document has been opened.
    ///
    /// # Arguments
    /// * `chapter`     — chapter name (file stem)
    /// * `total_pages` — pages that will be processed after page selection
    fn on_document_start(&self, chapter: &str, total_pages: usize) {
        let _ = (chapter, total_pages);
    }

    /// Called after each figure file is written.
    ///
    /// # Arguments
    /// * `page_num` — 1-indexed page number
    /// * `figure`   — 1-indexed figure number on that page
    /// * `path`     — file that was written
    fn on_figure_saved(&self, chapter: &str, page_num: usize, figure: usize, path: &Path) {
        let _ = (chapter, page_num, figure, path);
    }

    /// Called once per selected page after it has been handled, including
    /// pages skipped because they failed to render.
    ///
    /// # Arguments
    /// * `figures` — figures found on the page (including any that failed to write)
    fn on_page_complete(&self, chapter: &str, page_num: usize, figures: usize) {
        let _ = (chapter, page_num, figures);
    }

    /// Called when a page is skipped or a figure on it cannot be written.
    fn on_page_error(&self, chapter: &str, page_num: usize, error: &str) {
        let _ = (chapter, page_num, error);
    }

    /// Called when a document has been fully processed.
    fn on_document_complete(&self, chapter: &str, figures_saved: usize) {
        let _ = (chapter, figures_saved);
    }

    /// Called when a document could not be processed at all.
    fn on_document_error(&self, chapter: &str, error: &str) {
        let _ = (chapter, error);
    }

    /// Called once after all documents have been attempted.
    fn on_run_complete(&self, documents: usize, figures_saved: usize) {
        let _ = (documents, figures_saved);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

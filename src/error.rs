//! Error types for the scan-figures library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`ScanFigError`] — **Fatal** for the scope that returns it. From the
//!   top-level `extract_directory*` functions it aborts the run (missing
//!   source directory, pdfium unavailable, invalid configuration). From
//!   [`crate::extract::extract_chapter`] it aborts one document only; the
//!   driver records it on the document's report and moves on.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to render or a
//!   single figure failed to write. Stored inside
//!   [`crate::output::DocumentReport`] so the rest of the document is kept.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scan-figures library.
#[derive(Debug, Error)]
pub enum ScanFigError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The source directory does not exist.
    #[error("Source directory not found: '{path}'\nCheck the path exists and is a directory.")]
    SourceDirNotFound { path: PathBuf },

    /// The source directory exists but could not be listed.
    #[error("Failed to read source directory '{path}': {source}")]
    SourceDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output root or a chapter directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create, write or rename a figure file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JPEG encoder rejected the figure.
    #[error("Failed to encode figure '{path}': {detail}")]
    ImageEncodeFailed { path: PathBuf, detail: String },

    /// The run finished but some documents, pages or figures failed.
    ///
    /// Returned by [`crate::output::ExtractionReport::into_result`] when
    /// the caller wants to treat any failure as an error.
    #[error("{failed} failure(s) across {documents} document(s) during extraction")]
    PartialFailure { failed: usize, documents: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page or figure.
///
/// Stored on [`crate::output::DocumentReport`]. The document continues with
/// its next page (or next figure) after one of these.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed; the page was skipped.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// A figure was extracted but could not be written.
    #[error("Page {page}, figure {figure}: write to '{path}' failed: {detail}")]
    FigureWriteFailed {
        page: usize,
        figure: usize,
        path: PathBuf,
        detail: String,
    },
}

impl PageError {
    /// 1-based page number the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } => *page,
            PageError::FigureWriteFailed { page, .. } => *page,
        }
    }
}

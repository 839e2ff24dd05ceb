//! # scan-figures
//!
//! Extract figures and diagrams from scanned PDF chapters.
//!
//! Scanned textbooks are just page images: there is no embedded vector
//! artwork to pull out. This crate rasterises each page, straightens it,
//! looks for figure-sized blocks of ink, trims the caption text underneath
//! each one and saves what is left as a JPEG.
//!
//! ## Pipeline Overview
//!
//! ```text
//! chapter_pdfs/*.pdf
//!  │
//!  ├─ 1. Input    list *.pdf files, sorted; check %PDF magic
//!  ├─ 2. Render   rasterise each page at 200 DPI via pdfium
//!  ├─ 3. Deskew   Canny → probabilistic Hough → median angle → rotate
//!  ├─ 4. Regions  blur → Canny → 40×5 closing → largest contours → filters
//!  ├─ 5. Caption  Otsu → dilate → keep dominant blobs → union box
//!  └─ 6. Output   extracted_scans/<chapter>/page_N_fig_K.jpg
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan_figures::{extract_directory, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // ./chapter_pdfs → ./extracted_scans
//!     let config = ExtractionConfig::default();
//!     let report = extract_directory(&config).await?;
//!     eprintln!(
//!         "{} figure(s) from {} document(s)",
//!         report.stats.figures_saved,
//!         report.documents.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Pages that are already rasterised can be fed straight to
//! [`extract_page_figures`] or [`extract_chapter_from_images`] without
//! pdfium.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scan-figures` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! scan-figures = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Rendering needs the pdfium shared library at runtime. It is looked up at
//! [`ExtractionConfig::pdfium_library`] when set, then in the working
//! directory, then on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CaptionConfig, DeskewConfig, ExtractionConfig, ExtractionConfigBuilder, PageSelection,
    RegionConfig, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR,
};
pub use error::{PageError, ScanFigError};
pub use extract::{
    extract_chapter, extract_chapter_from_images, extract_directory, extract_directory_sync,
    extract_page_figures, figure_file_name, Figure, PageFigures,
};
pub use output::{DocumentReport, ExtractionReport, ExtractionStats, SavedFigure};
pub use pipeline::geometry::Rect;
pub use pipeline::input::ChapterSource;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};

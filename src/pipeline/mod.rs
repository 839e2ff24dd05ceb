//! Pipeline stages for figure extraction.
//!
//! Each submodule implements one transformation step and is testable on
//! synthetic images without pdfium. Only [`render`] touches a PDF.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ deskew ──▶ regions ──▶ caption ──▶ encode
//! (*.pdf)   (pdfium)   (Hough)    (closing)   (Otsu)      (JPEG)
//! ```
//!
//! 1. [`input`]   — list `*.pdf` files in the source directory, check magic bytes
//! 2. [`render`]  — bind pdfium, open a document, rasterise one page at a time
//! 3. [`deskew`]  — estimate page skew from near-axis line segments and rotate
//! 4. [`regions`] — find figure-sized blocks and crop them with padding
//! 5. [`caption`] — shrink each crop to its dominant blobs, dropping caption text
//! 6. [`encode`]  — write the result as a JPEG, atomically
//!
//! The image primitives the stages share live in [`geometry`],
//! [`morphology`], [`contours`] and [`hough`].

pub mod caption;
pub mod contours;
pub mod deskew;
pub mod encode;
pub mod geometry;
pub mod hough;
pub mod input;
pub mod morphology;
pub mod regions;
pub mod render;

//! PDF rasterisation: bind pdfium, open documents, render pages to RGB.
//!
//! pdfium is a blocking C library. Everything here is synchronous; the
//! async entry point in [`crate::extract`] moves the whole run onto
//! tokio's blocking pool instead of wrapping each call.

use crate::error::{PageError, ScanFigError};
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Bind to a pdfium shared library.
///
/// Lookup order: `library` (a file, or a directory holding the platform
/// library), then the working directory, then the system library path.
pub fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, ScanFigError> {
    if let Some(path) = library {
        let file = if path.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(path)
        } else {
            path.to_path_buf()
        };
        let bindings = Pdfium::bind_to_library(&file).map_err(|e| {
            ScanFigError::PdfiumBindingFailed(format!("{}: {:?}", file.display(), e))
        })?;
        info!("Bound pdfium from {}", file.display());
        return Ok(Pdfium::new(bindings));
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ScanFigError::PdfiumBindingFailed(format!("{:?}", e)))?;
    debug!("Bound pdfium from working directory or system path");
    Ok(Pdfium::new(bindings))
}

/// Open a PDF, mapping password and parse failures to typed errors.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ScanFigError> {
    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ScanFigError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ScanFigError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ScanFigError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;
    info!(
        "PDF loaded: {} ({} pages)",
        pdf_path.display(),
        document.pages().len()
    );
    Ok(document)
}

/// Number of pages in an open document.
pub fn page_count(document: &PdfDocument<'_>) -> usize {
    document.pages().len() as usize
}

/// Render one page (0-indexed) at `scale` × its size in points.
///
/// Whatever pixel layout pdfium hands back is converted to 3-channel RGB.
pub fn render_page(
    document: &PdfDocument<'_>,
    index: usize,
    scale: f32,
) -> Result<RgbImage, PageError> {
    let page_num = index + 1;
    let failed = |detail: String| PageError::RenderFailed {
        page: page_num,
        detail,
    };

    let page_index = u16::try_from(index).map_err(|_| failed("page index out of range".into()))?;
    let page = document
        .pages()
        .get(page_index)
        .map_err(|e| failed(format!("{:?}", e)))?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| failed(format!("{:?}", e)))?;

    let image = bitmap.as_image().to_rgb8();
    debug!(
        "Rendered page {} → {}x{} px",
        page_num,
        image.width(),
        image.height()
    );
    Ok(image)
}

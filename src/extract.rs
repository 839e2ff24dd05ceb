//! Extraction driver: directory → documents → pages → figures → files.
//!
//! Processing is strictly sequential: one document, one page, one region at
//! a time. Only the current page raster is held in memory. Failures are
//! scoped as tightly as possible: a broken document is recorded on its
//! [`DocumentReport`] and the run moves to the next one; a page that fails
//! to render or a figure that fails to write becomes a [`PageError`] and the
//! document carries on.

use crate::config::ExtractionConfig;
use crate::error::{PageError, ScanFigError};
use crate::output::{DocumentReport, ExtractionReport, ExtractionStats, SavedFigure};
use crate::pipeline::caption::strip_caption;
use crate::pipeline::deskew::deskew;
use crate::pipeline::encode::write_jpeg;
use crate::pipeline::geometry::Rect;
use crate::pipeline::input::{discover_pdfs, validate_pdf, ChapterSource};
use crate::pipeline::regions::{crop_region, detect_regions, CandidateRegion};
use crate::pipeline::render::{bind_pdfium, open_document, page_count, render_page};
use crate::progress::{ExtractionProgressCallback, NoopProgressCallback};
use image::RgbImage;
use pdfium_render::prelude::Pdfium;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

static NOOP_PROGRESS: NoopProgressCallback = NoopProgressCallback;

/// One cleaned figure, ready to be written.
#[derive(Debug, Clone)]
pub struct Figure {
    /// 1-based index among the page's accepted regions.
    pub index: usize,
    pub region: CandidateRegion,
    /// Padded crop rectangle on the page.
    pub crop_bounds: Rect,
    /// Final figure rectangle on the page (the crop itself when caption
    /// stripping found nothing to keep).
    pub figure_bounds: Rect,
    pub image: RgbImage,
}

/// Figures found on one page.
#[derive(Debug, Clone)]
pub struct PageFigures {
    /// Skew corrected before detection, degrees.
    pub skew_degrees: Option<f32>,
    pub figures: Vec<Figure>,
}

/// Run the image pipeline on one rendered page: deskew, detect candidate
/// regions, crop each one and strip its caption.
pub fn extract_page_figures(page: RgbImage, config: &ExtractionConfig) -> PageFigures {
    let (page, skew_degrees) = if config.deskew.enabled {
        let d = deskew(page, &config.deskew);
        (d.image, d.angle)
    } else {
        (page, None)
    };

    let figures = detect_regions(&page, &config.regions)
        .into_iter()
        .map(|region| {
            let crop = crop_region(&page, &region, config.regions.crop_padding);
            let strip = strip_caption(&crop.image, &config.caption);
            let figure_bounds = strip
                .bounds
                .map(|b| b.translate(crop.bounds.x, crop.bounds.y))
                .unwrap_or(crop.bounds);
            Figure {
                index: region.index,
                region,
                crop_bounds: crop.bounds,
                figure_bounds,
                image: strip.image,
            }
        })
        .collect();

    PageFigures {
        skew_degrees,
        figures,
    }
}

/// `page_<N>_fig_<K>.jpg`, both 1-based.
pub fn figure_file_name(page_num: usize, figure_index: usize) -> String {
    format!("page_{}_fig_{}.jpg", page_num, figure_index)
}

/// Extract every figure of one chapter PDF into `<output>/<chapter>/`.
///
/// Never returns an error: document-level failures are recorded in
/// [`DocumentReport::error`].
pub fn extract_chapter(
    pdfium: &Pdfium,
    source: &ChapterSource,
    config: &ExtractionConfig,
) -> DocumentReport {
    let progress = progress(config);
    let mut report = DocumentReport::new(
        &source.chapter,
        source.path.clone(),
        config.output_dir.join(&source.chapter),
    );
    info!("Processing scan: {}", source.path.display());

    if let Err(e) = create_dir(&report.output_dir) {
        return fail_document(report, e, progress);
    }
    if let Err(e) = validate_pdf(&source.path) {
        return fail_document(report, e, progress);
    }
    let document = match open_document(pdfium, &source.path, config.password.as_deref()) {
        Ok(d) => d,
        Err(e) => return fail_document(report, e, progress),
    };

    report.page_count = page_count(&document);
    let indices = config.pages.to_indices(report.page_count);
    let scale = config.render_scale();
    let pages = indices
        .iter()
        .map(|&idx| (idx, render_page(&document, idx, scale)));
    process_pages(&mut report, pages, config);
    report
}

/// Extract figures from pages that are already rasterised.
///
/// `pages` yields `(0-based page index, rendered page)`; `page_count` is the
/// document's total page count for the report. Same output layout and
/// error handling as [`extract_chapter`].
pub fn extract_chapter_from_images<I>(
    source: &ChapterSource,
    page_count: usize,
    pages: I,
    config: &ExtractionConfig,
) -> DocumentReport
where
    I: IntoIterator<Item = (usize, Result<RgbImage, PageError>)>,
    I::IntoIter: ExactSizeIterator,
{
    let progress = progress(config);
    let mut report = DocumentReport::new(
        &source.chapter,
        source.path.clone(),
        config.output_dir.join(&source.chapter),
    );
    if let Err(e) = create_dir(&report.output_dir) {
        return fail_document(report, e, progress);
    }
    report.page_count = page_count;
    process_pages(&mut report, pages, config);
    report
}

/// Extract figures from every PDF in `config.source_dir` (blocking).
///
/// # Errors
/// Only run-level failures are returned: the source directory is missing
/// or unreadable, the output root cannot be created, or pdfium cannot be
/// bound. Everything else is reported inside the [`ExtractionReport`].
pub fn extract_directory_sync(config: &ExtractionConfig) -> Result<ExtractionReport, ScanFigError> {
    let start = Instant::now();
    let progress = progress(config);

    let sources = discover_pdfs(&config.source_dir)?;
    create_dir(&config.output_dir)?;
    info!(
        "Found {} PDF(s) in {}",
        sources.len(),
        config.source_dir.display()
    );
    progress.on_run_start(sources.len());

    let mut documents = Vec::with_capacity(sources.len());
    if !sources.is_empty() {
        let pdfium = bind_pdfium(config.pdfium_library.as_deref())?;
        for source in &sources {
            documents.push(extract_chapter(&pdfium, source, config));
        }
    }

    let stats = ExtractionStats::from_documents(&documents, start.elapsed().as_millis() as u64);
    info!(
        "Extraction complete: {} figure(s) from {} document(s) in {}ms",
        stats.figures_saved,
        documents.len(),
        stats.total_duration_ms
    );
    progress.on_run_complete(documents.len(), stats.figures_saved);
    Ok(ExtractionReport { documents, stats })
}

/// Async wrapper around [`extract_directory_sync`].
///
/// pdfium is not async-safe, so the whole run executes on tokio's blocking
/// pool and this future resolves when it finishes.
pub async fn extract_directory(config: &ExtractionConfig) -> Result<ExtractionReport, ScanFigError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || extract_directory_sync(&config))
        .await
        .map_err(|e| ScanFigError::Internal(format!("Extraction task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn progress(config: &ExtractionConfig) -> &dyn ExtractionProgressCallback {
    config.progress_callback.as_deref().unwrap_or(&NOOP_PROGRESS)
}

fn create_dir(path: &Path) -> Result<(), ScanFigError> {
    std::fs::create_dir_all(path).map_err(|source| ScanFigError::OutputDirFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn fail_document(
    mut report: DocumentReport,
    error: ScanFigError,
    progress: &dyn ExtractionProgressCallback,
) -> DocumentReport {
    warn!("Skipping {}: {}", report.source.display(), error);
    let message = error.to_string();
    progress.on_document_error(&report.chapter, &message);
    report.error = Some(message);
    report
}

fn process_pages<I>(report: &mut DocumentReport, pages: I, config: &ExtractionConfig)
where
    I: IntoIterator<Item = (usize, Result<RgbImage, PageError>)>,
    I::IntoIter: ExactSizeIterator,
{
    let progress = progress(config);
    let pages = pages.into_iter();
    progress.on_document_start(&report.chapter, pages.len());

    for (idx, rendered) in pages {
        let page_num = idx + 1;
        let page = match rendered {
            Ok(page) => page,
            Err(e) => {
                warn!("{}: {}", report.chapter, e);
                progress.on_page_error(&report.chapter, page_num, &e.to_string());
                progress.on_page_complete(&report.chapter, page_num, 0);
                report.page_errors.push(e);
                continue;
            }
        };
        report.pages_rendered += 1;

        let found = extract_page_figures(page, config);
        debug!(
            "Page {}: skew {:?}, {} figure(s)",
            page_num,
            found.skew_degrees,
            found.figures.len()
        );
        let figure_count = found.figures.len();
        report.candidates_found += figure_count;

        for figure in found.figures {
            let path = report
                .output_dir
                .join(figure_file_name(page_num, figure.index));
            match write_jpeg(&figure.image, &path, config.jpeg_quality) {
                Ok(()) => {
                    info!("  ✓ Page {}: saved figure {}", page_num, figure.index);
                    progress.on_figure_saved(&report.chapter, page_num, figure.index, &path);
                    report.figures.push(SavedFigure {
                        page_num,
                        figure_index: figure.index,
                        path,
                        region: figure.region.bounds,
                        figure_bounds: figure.figure_bounds,
                        skew_degrees: found.skew_degrees,
                    });
                }
                Err(e) => {
                    let err = PageError::FigureWriteFailed {
                        page: page_num,
                        figure: figure.index,
                        path,
                        detail: e.to_string(),
                    };
                    warn!("{}: {}", report.chapter, err);
                    progress.on_page_error(&report.chapter, page_num, &err.to_string());
                    report.page_errors.push(err);
                }
            }
        }
        progress.on_page_complete(&report.chapter, page_num, figure_count);
    }

    progress.on_document_complete(&report.chapter, report.figures.len());
}

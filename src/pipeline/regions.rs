//! Candidate figure-region detection.
//!
//! Edges of the (deskewed) page are smeared horizontally by a wide, short
//! closing so that a figure, its border and the caption line under it fuse
//! into one blob while separate paragraphs stay apart. The largest outer
//! contours are then filtered by position, size and shape.

use super::contours::external_blobs;
use super::geometry::Rect;
use super::morphology::close_rect;
use crate::config::RegionConfig;
use image::{imageops, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An accepted region on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRegion {
    /// 1-based position among accepted regions, largest contour first.
    pub index: usize,
    /// Bounding box of the contour, in page pixels.
    pub bounds: Rect,
    /// Area enclosed by the contour, px².
    pub contour_area: f64,
    pub aspect_ratio: f64,
    /// Distance from `bounds` to the nearest page edge, px.
    pub edge_distance: u32,
}

/// A padded copy of page pixels around a candidate.
#[derive(Debug, Clone)]
pub struct Crop {
    /// Crop rectangle in page coordinates.
    pub bounds: Rect,
    pub image: RgbImage,
}

/// Why a contour was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NearEdge,
    Area,
    Aspect,
}

/// Find candidate figure regions on `page`, at most `config.max_candidates`,
/// ordered by descending contour area.
pub fn detect_regions(page: &RgbImage, config: &RegionConfig) -> Vec<CandidateRegion> {
    let (page_w, page_h) = page.dimensions();
    let gray = imageops::grayscale(page);
    let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
    // canny blurs again internally (σ 1.4), so the effective smoothing is
    // stronger than blur_sigma alone
    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let closed = close_rect(
        &edges,
        config.close_kernel_width,
        config.close_kernel_height,
        config.close_iterations,
    );

    let mut blobs = external_blobs(&closed);
    blobs.sort_by(|a, b| b.area.total_cmp(&a.area));
    blobs.truncate(config.max_candidates);

    let mut accepted = Vec::new();
    for blob in blobs {
        match check(&blob.bounds, blob.area, page_w, page_h, config) {
            Ok(()) => accepted.push(CandidateRegion {
                index: accepted.len() + 1,
                bounds: blob.bounds,
                contour_area: blob.area,
                aspect_ratio: blob.bounds.aspect_ratio(),
                edge_distance: blob.bounds.edge_distance(page_w, page_h),
            }),
            Err(reason) => debug!(
                "Region {:?} (area {:.0}) rejected: {:?}",
                blob.bounds, blob.area, reason
            ),
        }
    }
    debug!("Regions: {} accepted", accepted.len());
    accepted
}

/// Copy `page` pixels inside the candidate box grown by `padding`, clamped
/// to the page.
pub fn crop_region(page: &RgbImage, region: &CandidateRegion, padding: u32) -> Crop {
    let (page_w, page_h) = page.dimensions();
    let bounds = region.bounds.padded(padding, page_w, page_h);
    let image = imageops::crop_imm(page, bounds.x, bounds.y, bounds.width, bounds.height)
        .to_image();
    Crop { bounds, image }
}

fn check(
    bounds: &Rect,
    area: f64,
    page_w: u32,
    page_h: u32,
    config: &RegionConfig,
) -> Result<(), Rejection> {
    let (w, h) = (page_w as f64, page_h as f64);
    let margin = config.edge_margin_ratio;
    let near_edge = (bounds.x as f64) < w * margin
        || (bounds.y as f64) < h * margin
        || (bounds.right() as f64) > w * (1.0 - margin)
        || (bounds.bottom() as f64) > h * (1.0 - margin);
    if near_edge {
        return Err(Rejection::NearEdge);
    }
    if !(area > config.min_area && area < w * h * config.max_area_ratio) {
        return Err(Rejection::Area);
    }
    let aspect = bounds.aspect_ratio();
    if !(aspect > config.min_aspect_ratio && aspect < config.max_aspect_ratio) {
        return Err(Rejection::Aspect);
    }
    Ok(())
}

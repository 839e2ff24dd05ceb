//! Page skew estimation and correction.
//!
//! Long straight edges on a scanned page (text baselines, table rules,
//! figure borders) are near-horizontal or near-vertical when the page is
//! straight. The median deviation of those edges from the nearest axis is
//! taken as the page skew and undone by rotating about the page centre.

use super::hough::{detect_segments, LineSegment};
use crate::config::DeskewConfig;
use image::{imageops, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use tracing::debug;

/// A page after skew correction.
#[derive(Debug, Clone)]
pub struct Deskewed {
    pub image: RgbImage,
    /// Estimated skew in degrees (positive = page content tilted clockwise),
    /// or `None` when no usable line was found.
    pub angle: Option<f32>,
}

/// Estimate the skew of `page` in degrees.
///
/// Returns `None` when no detected segment lies within the tolerance window
/// around 0° or ±90°.
pub fn estimate_skew(page: &RgbImage, config: &DeskewConfig) -> Option<f32> {
    let gray = imageops::grayscale(page);
    // Rec. 709 luma, and canny pre-blurs (σ 1.4): the 50/150 thresholds are
    // close to, not identical with, an OpenCV-style BT.601 + raw Canny pass
    let edges = canny(&gray, config.canny_low, config.canny_high);
    let segments = detect_segments(
        &edges,
        config.hough_vote_threshold,
        config.min_line_length,
        config.max_line_gap,
    );

    let mut angles: Vec<f32> = segments
        .iter()
        .filter_map(|s| axis_deviation(s, config.angle_tolerance_deg))
        .collect();
    debug!(
        "Deskew: {} segments, {} near an axis",
        segments.len(),
        angles.len()
    );
    median(&mut angles)
}

/// Straighten `page`. Output dimensions always equal input dimensions.
pub fn deskew(page: RgbImage, config: &DeskewConfig) -> Deskewed {
    let angle = estimate_skew(&page, config);
    let image = match angle {
        Some(a) if a != 0.0 => {
            debug!("Deskew: rotating by {a:.3}°");
            // positive theta rotates clockwise; undo a clockwise tilt
            rotate_about_center(
                &page,
                -a.to_radians(),
                Interpolation::Bicubic,
                Rgb([255, 255, 255]),
            )
        }
        _ => page,
    };
    Deskewed { image, angle }
}

/// Signed deviation of a segment from the closest axis, if within tolerance.
fn axis_deviation(segment: &LineSegment, tolerance: f32) -> Option<f32> {
    let angle = segment.angle_degrees();
    if angle > -tolerance && angle < tolerance {
        Some(angle)
    } else if angle > 90.0 - tolerance && angle < 90.0 + tolerance {
        Some(angle - 90.0)
    } else if angle > -90.0 - tolerance && angle < -90.0 + tolerance {
        Some(angle + 90.0)
    } else {
        None
    }
}

/// Median, averaging the two middle values of an even-length input.
fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

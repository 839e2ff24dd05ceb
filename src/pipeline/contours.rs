//! External contours of a binary mask, reduced to area + bounding box.
//!
//! Both the region detector and the caption stripper treat one outer
//! contour as "one visual object". Holes and contours nested inside holes
//! are ignored: only top-level outer borders count.
//!
//! The tracer reports a region touching the left column as a hole, so the
//! mask is traced with a one-pixel background frame around it.

use super::geometry::Rect;
use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// One external contour of a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Area enclosed by the contour polygon (shoelace), in px².
    ///
    /// A contour is traced through the centres of its border pixels, so a
    /// solid `w × h` rectangle encloses `(w - 1) × (h - 1)`.
    pub area: f64,
    /// Upright bounding box of the contour pixels.
    pub bounds: Rect,
}

/// Outermost contours of every connected foreground region (non-zero pixels).
///
/// Returned in the tracer's raster order: by the row, then column, of each
/// contour's first pixel.
pub fn external_blobs(mask: &GrayImage) -> Vec<Blob> {
    let (w, h) = mask.dimensions();
    let mut framed = GrayImage::new(w + 2, h + 2);
    imageops::replace(&mut framed, mask, 1, 1);

    find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let points: Vec<Point<i32>> = c
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            Blob {
                area: polygon_area(&points),
                bounds: bounding_rect(&points),
            }
        })
        .collect()
}

/// Area of a closed polygon by the shoelace formula.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area: i64 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

/// Smallest upright box containing every point, inclusive of the border pixels.
///
/// `points` must be non-empty and lie in image coordinates.
pub fn bounding_rect(points: &[Point<i32>]) -> Rect {
    let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
    let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let x = min_x.max(0) as u32;
    let y = min_y.max(0) as u32;
    Rect::new(x, y, (max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32)
}

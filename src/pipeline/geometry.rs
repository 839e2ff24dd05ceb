//! Axis-aligned pixel rectangles shared by the region and caption stages.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in pixel coordinates, origin at the top-left.
///
/// `x + width` and `y + height` are exclusive, so a `Rect` can be passed
/// straight to `image::imageops::crop_imm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width × height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// `width / height`; zero-height boxes report infinity.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            f64::INFINITY
        } else {
            self.width as f64 / self.height as f64
        }
    }

    /// Grow by `pad` on every side, clamped to a `bound_w × bound_h` image.
    pub fn padded(&self, pad: u32, bound_w: u32, bound_h: u32) -> Rect {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = self.right().saturating_add(pad).min(bound_w);
        let y1 = self.bottom().saturating_add(pad).min(bound_h);
        Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shift by a non-negative offset, e.g. from crop to page coordinates.
    pub fn translate(&self, dx: u32, dy: u32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest distance from the box to any edge of a `page_w × page_h` page.
    pub fn edge_distance(&self, page_w: u32, page_h: u32) -> u32 {
        let left = self.x;
        let top = self.y;
        let right = page_w.saturating_sub(self.right());
        let bottom = page_h.saturating_sub(self.bottom());
        left.min(top).min(right).min(bottom)
    }
}

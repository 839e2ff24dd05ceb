//! Progressive probabilistic Hough transform for line segments.
//!
//! Accumulator geometry is ρ = 1 px, θ = 1° over `[0, π)`. Edge points are
//! visited in a fixed scatter order instead of a random one, so the same
//! edge map always produces the same segments. Each visited point votes;
//! when its best line reaches the vote threshold the line is walked in
//! both directions (tolerating up to `max_gap` missing pixels), the pixels
//! on it are removed from further consideration and, if the walk was long
//! enough, their votes are withdrawn and the segment is emitted.

use image::GrayImage;

const NUM_ANGLES: usize = 180;
const SHIFT: i32 = 16;

/// A detected segment, endpoints in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl LineSegment {
    /// `atan2(dy, dx)` in degrees, in `(-180, 180]`.
    pub fn angle_degrees(&self) -> f32 {
        let dx = (self.end.0 - self.start.0) as f32;
        let dy = (self.end.1 - self.start.1) as f32;
        dy.atan2(dx).to_degrees()
    }

    /// Extent along the dominant axis.
    pub fn extent(&self) -> i32 {
        (self.end.0 - self.start.0)
            .abs()
            .max((self.end.1 - self.start.1).abs())
    }
}

/// Segments supported by the non-zero pixels of `edges`.
///
/// A segment is kept when its extent along x or along y reaches
/// `min_len`. Segments come out in the order they were found.
pub fn detect_segments(
    edges: &GrayImage,
    vote_threshold: u32,
    min_len: u32,
    max_gap: u32,
) -> Vec<LineSegment> {
    let (w, h) = edges.dimensions();
    let (width, height) = (w as i32, h as i32);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let num_rho = 2 * (width + height) as usize + 1;
    let rho_offset = ((num_rho - 1) / 2) as i32;
    let trig: Vec<(f32, f32)> = (0..NUM_ANGLES)
        .map(|n| {
            let theta = (n as f32).to_radians();
            (theta.cos(), theta.sin())
        })
        .collect();
    let rho_index = |x: i32, y: i32, n: usize| -> usize {
        let (c, s) = trig[n];
        let r = (x as f32 * c + y as f32 * s).round() as i32 + rho_offset;
        n * num_rho + r as usize
    };

    let mut mask = vec![false; (w * h) as usize];
    let mut points = Vec::new();
    for (x, y, p) in edges.enumerate_pixels() {
        if p.0[0] > 0 {
            mask[(y * w + x) as usize] = true;
            points.push((x as i32, y as i32));
        }
    }

    let mut accum = vec![0i32; NUM_ANGLES * num_rho];
    let threshold = vote_threshold as i32;
    let min_len = min_len as i32;
    let max_gap = max_gap as i32;
    let mut segments = Vec::new();

    for idx in scatter_order(points.len()) {
        let (px, py) = points[idx];
        if !mask[(py * width + px) as usize] {
            continue;
        }

        let mut max_val = threshold - 1;
        let mut max_n = 0;
        for n in 0..NUM_ANGLES {
            let cell = &mut accum[rho_index(px, py, n)];
            *cell += 1;
            if *cell > max_val {
                max_val = *cell;
                max_n = n;
            }
        }
        if max_val < threshold {
            continue;
        }

        // Walk direction along the winning line, in 16.16 fixed point on
        // the minor axis.
        let (cos_t, sin_t) = trig[max_n];
        let (a, b) = (-sin_t, cos_t);
        let (mut x0, mut y0) = (px, py);
        let (dx0, dy0, x_major) = if a.abs() > b.abs() {
            y0 = (y0 << SHIFT) + (1 << (SHIFT - 1));
            let dy = (b * (1 << SHIFT) as f32 / a.abs()).round() as i32;
            (if a > 0.0 { 1 } else { -1 }, dy, true)
        } else {
            x0 = (x0 << SHIFT) + (1 << (SHIFT - 1));
            let dx = (a * (1 << SHIFT) as f32 / b.abs()).round() as i32;
            (dx, if b > 0.0 { 1 } else { -1 }, false)
        };
        let to_pixel = |x: i32, y: i32| -> (i32, i32) {
            if x_major {
                (x, y >> SHIFT)
            } else {
                (x >> SHIFT, y)
            }
        };

        let mut line_end = [(px, py); 2];
        for (k, end) in line_end.iter_mut().enumerate() {
            let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
            let (mut x, mut y) = (x0, y0);
            let mut gap = 0;
            loop {
                let (j, i) = to_pixel(x, y);
                if j < 0 || j >= width || i < 0 || i >= height {
                    break;
                }
                if mask[(i * width + j) as usize] {
                    gap = 0;
                    *end = (j, i);
                } else {
                    gap += 1;
                    if gap > max_gap {
                        break;
                    }
                }
                x += dx;
                y += dy;
            }
        }

        let good_line = (line_end[1].0 - line_end[0].0).abs() >= min_len
            || (line_end[1].1 - line_end[0].1).abs() >= min_len;

        for (k, &end) in line_end.iter().enumerate() {
            let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
            let (mut x, mut y) = (x0, y0);
            loop {
                let (j, i) = to_pixel(x, y);
                let at = (i * width + j) as usize;
                if mask[at] {
                    if good_line {
                        for n in 0..NUM_ANGLES {
                            accum[rho_index(j, i, n)] -= 1;
                        }
                    }
                    mask[at] = false;
                }
                if (j, i) == end {
                    break;
                }
                x += dx;
                y += dy;
            }
        }

        if good_line {
            segments.push(LineSegment {
                start: line_end[0],
                end: line_end[1],
            });
        }
    }

    segments
}

/// A permutation of `0..n` that jumps around the raster instead of
/// sweeping it, so early votes come from all over the page.
fn scatter_order(n: usize) -> impl Iterator<Item = usize> {
    let mut stride = ((n as f64 * 0.618_033_988_7) as usize) | 1;
    while n > 1 && gcd(stride, n) != 1 {
        stride += 2;
    }
    (0..n).map(move |k| (k * stride) % n.max(1))
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

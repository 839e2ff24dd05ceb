//! Binary morphology with rectangular structuring elements.
//!
//! `imageproc::morphology::grayscale_close` with a rectangular `Mask` gives
//! the same result but visits every kernel cell per pixel, 200 for the
//! region detector's 40×5 kernel on a full 200 DPI page. A rectangle is
//! separable, so here each operation is a row pass followed by a column
//! pass, and each pass is a sliding-window count over a prefix sum: O(1)
//! per pixel regardless of kernel size.
//!
//! The anchor sits at `(width / 2, height / 2)`. Erosion uses the
//! reflected window of dilation so that closing is extensive even for
//! even-sized kernels. Pixels outside the image never cause erosion and
//! never cause dilation.

use image::{GrayImage, Luma};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Dilate,
    Erode,
}

/// Dilate the non-zero pixels of `mask` with a `width × height` rectangle.
pub fn dilate_rect(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    apply(mask, width, height, Op::Dilate)
}

/// Erode the non-zero pixels of `mask` with a `width × height` rectangle.
pub fn erode_rect(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    apply(mask, width, height, Op::Erode)
}

/// Morphological closing: `iterations` dilations followed by as many erosions.
pub fn close_rect(mask: &GrayImage, width: u32, height: u32, iterations: u32) -> GrayImage {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = dilate_rect(&out, width, height);
    }
    for _ in 0..iterations {
        out = erode_rect(&out, width, height);
    }
    out
}

fn apply(mask: &GrayImage, width: u32, height: u32, op: Op) -> GrayImage {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return mask.clone();
    }
    let mut fg: Vec<bool> = mask.pixels().map(|p| p.0[0] > 0).collect();
    let (w, h) = (w as usize, h as usize);

    // rows
    if width > 1 {
        let mut line = vec![false; w];
        let mut out = vec![false; w];
        for y in 0..h {
            line.copy_from_slice(&fg[y * w..(y + 1) * w]);
            sweep(&line, width as usize, op, &mut out);
            fg[y * w..(y + 1) * w].copy_from_slice(&out);
        }
    }

    // columns
    if height > 1 {
        let mut line = vec![false; h];
        let mut out = vec![false; h];
        for x in 0..w {
            for y in 0..h {
                line[y] = fg[y * w + x];
            }
            sweep(&line, height as usize, op, &mut out);
            for y in 0..h {
                fg[y * w + x] = out[y];
            }
        }
    }

    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        if fg[y as usize * w + x as usize] {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// One 1-D pass with a window of `k` samples anchored at `k / 2`.
fn sweep(line: &[bool], k: usize, op: Op, out: &mut [bool]) {
    let n = line.len();
    let (before, after) = match op {
        Op::Dilate => (k - 1 - k / 2, k / 2),
        Op::Erode => (k / 2, k - 1 - k / 2),
    };
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0usize);
    for &v in line {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as usize);
    }
    for (i, slot) in out.iter_mut().enumerate() {
        let lo = i.saturating_sub(before);
        let hi = (i + after).min(n - 1);
        let count = prefix[hi + 1] - prefix[lo];
        *slot = match op {
            Op::Dilate => count > 0,
            Op::Erode => count == hi + 1 - lo,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as DrawRect;

    fn count_fg(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn dilate_single_pixel_grows_to_kernel() {
        let mut mask = GrayImage::new(50, 20);
        mask.put_pixel(25, 10, Luma([255]));
        let out = dilate_rect(&mask, 40, 5);
        // anchor (20, 2): covers x 25-20..=25+19, y 10-2..=10+2
        assert_eq!(count_fg(&out), 40 * 5);
        assert_eq!(out.get_pixel(5, 8).0[0], 255);
        assert_eq!(out.get_pixel(44, 12).0[0], 255);
        assert_eq!(out.get_pixel(4, 10).0[0], 0);
        assert_eq!(out.get_pixel(45, 10).0[0], 0);
        assert_eq!(out.get_pixel(25, 13).0[0], 0);
    }

    #[test]
    fn erode_removes_thin_features_but_keeps_border_touching_blocks() {
        let mut mask = GrayImage::new(40, 20);
        draw_filled_rect_mut(&mut mask, DrawRect::at(0, 0).of_size(40, 10), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(5, 15).of_size(30, 1), Luma([255]));
        let out = erode_rect(&mask, 5, 3);
        // the 1-px line disappears
        assert_eq!(out.get_pixel(20, 15).0[0], 0);
        // the block touching the top border keeps its top row
        assert_eq!(out.get_pixel(0, 0).0[0], 255);
        // its bottom row erodes by one (kernel reaches into row 10)
        assert_eq!(out.get_pixel(20, 9).0[0], 0);
        assert_eq!(out.get_pixel(20, 8).0[0], 255);
    }

    #[test]
    fn close_bridges_horizontal_gap_only() {
        let mut mask = GrayImage::new(200, 60);
        // two blocks side by side with a 30 px gap
        draw_filled_rect_mut(&mut mask, DrawRect::at(20, 10).of_size(60, 6), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(110, 10).of_size(60, 6), Luma([255]));
        // one block 20 px below
        draw_filled_rect_mut(&mut mask, DrawRect::at(20, 36).of_size(150, 6), Luma([255]));

        let closed = close_rect(&mask, 40, 5, 2);
        // horizontal gap filled
        assert_eq!(closed.get_pixel(95, 12).0[0], 255);
        // vertical gap left open
        assert_eq!(closed.get_pixel(95, 26).0[0], 0);
    }

    #[test]
    fn close_matches_imageproc_for_odd_kernel() {
        use imageproc::morphology::{grayscale_close, Mask};

        let mut mask = GrayImage::new(300, 120);
        draw_filled_rect_mut(&mut mask, DrawRect::at(60, 30).of_size(50, 8), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(130, 32).of_size(40, 3), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(90, 50).of_size(2, 30), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(200, 70).of_size(40, 20), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(210, 76).of_size(20, 6), Luma([0]));

        let kernel = GrayImage::from_pixel(41, 5, Luma([255]));
        let expected = grayscale_close(&mask, &Mask::from_image(&kernel, 20, 2));
        assert_eq!(close_rect(&mask, 41, 5, 1), expected);
    }

    #[test]
    fn close_is_extensive() {
        let mut mask = GrayImage::new(64, 64);
        draw_filled_rect_mut(&mut mask, DrawRect::at(10, 10).of_size(30, 7), Luma([255]));
        let closed = close_rect(&mask, 40, 5, 2);
        for (x, y, p) in mask.enumerate_pixels() {
            if p.0[0] > 0 {
                assert_eq!(closed.get_pixel(x, y).0[0], 255, "lost ({x},{y})");
            }
        }
    }
}

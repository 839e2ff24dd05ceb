//! Caption stripping inside a candidate crop.
//!
//! The dark pixels of the crop are binarised with Otsu's threshold and
//! lightly dilated, which fuses a figure's strokes into a few large blobs
//! while each caption word stays a small one. Blobs that are tiny next to
//! the largest are dropped; the figure is the padded union of the rest.

use super::contours::external_blobs;
use super::geometry::Rect;
use crate::config::CaptionConfig;
use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use tracing::debug;

/// The figure isolated from a crop.
#[derive(Debug, Clone)]
pub struct CaptionStrip {
    /// Kept box in crop coordinates; `None` when nothing was found and the
    /// crop is returned as is.
    pub bounds: Option<Rect>,
    pub image: RgbImage,
}

/// Remove caption text and other small marks around the main figure.
///
/// Never fails: a crop with no foreground comes back unchanged.
pub fn strip_caption(crop: &RgbImage, config: &CaptionConfig) -> CaptionStrip {
    let (w, h) = crop.dimensions();
    let gray = imageops::grayscale(crop);
    let mask = dark_mask(&gray);
    let fused = dilate(&mask, Norm::LInf, config.dilate_radius);

    let blobs = external_blobs(&fused);
    let Some(max_area) = blobs.iter().map(|b| b.area).reduce(f64::max) else {
        debug!("Caption: no foreground, keeping crop");
        return CaptionStrip {
            bounds: None,
            image: crop.clone(),
        };
    };

    let cutoff = max_area * config.keep_ratio;
    let kept: Vec<Rect> = blobs
        .iter()
        .filter(|b| b.area >= cutoff)
        .map(|b| b.bounds)
        .collect();
    let Some(union) = kept.iter().copied().reduce(|acc, r| acc.union(&r)) else {
        return CaptionStrip {
            bounds: None,
            image: crop.clone(),
        };
    };
    let bounds = union.padded(config.padding, w, h);
    debug!(
        "Caption: kept {}/{} blobs, figure {:?}",
        kept.len(),
        blobs.len(),
        bounds
    );

    let image =
        imageops::crop_imm(crop, bounds.x, bounds.y, bounds.width, bounds.height).to_image();
    CaptionStrip {
        bounds: Some(bounds),
        image,
    }
}

/// Pixels at or below the Otsu level become foreground (255).
fn dark_mask(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] <= level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as DrawRect;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn white(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    #[test]
    fn all_white_crop_is_returned_unchanged() {
        let crop = white(120, 80);
        let out = strip_caption(&crop, &CaptionConfig::default());
        assert_eq!(out.bounds, None);
        assert_eq!(out.image, crop);
    }

    #[test]
    fn caption_below_figure_is_dropped() {
        // 400×300 figure at (20, 20); a caption line 8 px below it
        let mut crop = white(440, 360);
        draw_filled_rect_mut(&mut crop, DrawRect::at(20, 20).of_size(400, 300), BLACK);
        for i in 0..15 {
            draw_filled_rect_mut(&mut crop, DrawRect::at(20 + i * 12, 328).of_size(8, 14), BLACK);
        }

        let out = strip_caption(&crop, &CaptionConfig::default());
        let bounds = out.bounds.expect("figure found");
        // dilation reach (2) plus padding (5) around the figure only
        assert_eq!(bounds, Rect::new(13, 13, 414, 314));
        assert_eq!(out.image.dimensions(), (414, 314));
        assert!(bounds.bottom() <= 328);
    }

    #[test]
    fn bounds_stay_inside_the_crop() {
        let mut crop = white(200, 150);
        // figure touching the crop border: padding must clamp
        draw_filled_rect_mut(&mut crop, DrawRect::at(0, 2).of_size(190, 140), BLACK);
        let out = strip_caption(&crop, &CaptionConfig::default());
        let bounds = out.bounds.expect("figure found");
        assert!(Rect::full(200, 150).contains(&bounds));
        assert_eq!(out.image.dimensions(), (bounds.width, bounds.height));
    }

    #[test]
    fn figure_on_left_edge_is_kept_and_caption_dropped() {
        let mut crop = white(440, 360);
        draw_filled_rect_mut(&mut crop, DrawRect::at(0, 20).of_size(400, 300), BLACK);
        for i in 0..15 {
            draw_filled_rect_mut(&mut crop, DrawRect::at(10 + i * 12, 328).of_size(8, 14), BLACK);
        }

        let out = strip_caption(&crop, &CaptionConfig::default());
        let bounds = out.bounds.expect("figure found");
        // left side clamps at the crop edge; right and vertical reach 2 + 5
        assert_eq!(bounds, Rect::new(0, 13, 407, 314));
        assert_eq!(out.image.dimensions(), (407, 314));
    }

    #[test]
    fn side_by_side_panels_are_both_kept() {
        let mut crop = white(420, 260);
        draw_filled_rect_mut(&mut crop, DrawRect::at(20, 30).of_size(160, 200), BLACK);
        draw_filled_rect_mut(&mut crop, DrawRect::at(230, 40).of_size(150, 180), BLACK);
        let out = strip_caption(&crop, &CaptionConfig::default());
        let bounds = out.bounds.expect("figure found");
        assert!(bounds.contains(&Rect::new(20, 30, 360, 200)), "{bounds:?}");
    }

    #[test]
    fn keep_ratio_boundary_is_inclusive() {
        let mut crop = white(300, 200);
        // after 5×5 dilation: 65×65 (area 64²) and 17×17 (area 16²), ratio 1/16
        draw_filled_rect_mut(&mut crop, DrawRect::at(20, 20).of_size(61, 61), BLACK);
        draw_filled_rect_mut(&mut crop, DrawRect::at(150, 20).of_size(13, 13), BLACK);
        let config = CaptionConfig {
            keep_ratio: 1.0 / 16.0,
            ..CaptionConfig::default()
        };
        let out = strip_caption(&crop, &config);
        let bounds = out.bounds.expect("figure found");
        assert!(bounds.right() >= 165, "{bounds:?}");

        let stricter = CaptionConfig {
            keep_ratio: 0.07,
            ..CaptionConfig::default()
        };
        let out = strip_caption(&crop, &stricter);
        assert!(out.bounds.expect("figure found").right() < 150);
    }
}

//! Configuration types for figure extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Every numeric threshold the pipeline
//! uses lives in one of three stage structs ([`DeskewConfig`],
//! [`RegionConfig`], [`CaptionConfig`]) so a run is fully described by the
//! config value passed in; there is no process-wide state.
//!
//! The defaults reproduce the tuning the pipeline was calibrated with on
//! 200 DPI scans of textbook chapters.

use crate::error::ScanFigError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default source directory scanned for chapter PDFs.
pub const DEFAULT_SOURCE_DIR: &str = "./chapter_pdfs";

/// Default root directory for extracted figures.
pub const DEFAULT_OUTPUT_DIR: &str = "./extracted_scans";

/// Configuration for a figure-extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use scan_figures::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .source_dir("./scans")
///     .output_dir("./figures")
///     .dpi(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory containing the chapter PDFs. Default: `./chapter_pdfs`.
    pub source_dir: PathBuf,

    /// Root directory for output; one sub-directory per chapter.
    /// Default: `./extracted_scans`.
    pub output_dir: PathBuf,

    /// Rendering DPI used when rasterising each page. Range: 72–600. Default: 200.
    ///
    /// Every pixel threshold in the stage configs (minimum region area,
    /// paddings, kernel sizes, Hough segment lengths) is calibrated for
    /// 200 DPI. Changing the DPI without rescaling them shifts what counts
    /// as a figure.
    pub dpi: u32,

    /// JPEG quality factor for saved figures. Range: 1–100. Default: 95.
    pub jpeg_quality: u8,

    /// Page selection applied to every document. Default: all pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit path to the pdfium shared library. If None, the library is
    /// looked up in the working directory, then on the system library path.
    pub pdfium_library: Option<PathBuf>,

    /// Skew estimation and correction.
    pub deskew: DeskewConfig,

    /// Candidate figure-region detection and cropping.
    pub regions: RegionConfig,

    /// Caption stripping inside each crop.
    pub caption: CaptionConfig,

    /// Optional progress callback; see [`crate::progress`].
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dpi: 200,
            jpeg_quality: 95,
            pages: PageSelection::default(),
            password: None,
            pdfium_library: None,
            deskew: DeskewConfig::default(),
            regions: RegionConfig::default(),
            caption: CaptionConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("source_dir", &self.source_dir)
            .field("output_dir", &self.output_dir)
            .field("dpi", &self.dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library", &self.pdfium_library)
            .field("deskew", &self.deskew)
            .field("regions", &self.regions)
            .field("caption", &self.caption)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor pdfium applies to a page (PDF user space is 72 units per inch).
    pub fn render_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn deskew(mut self, deskew: DeskewConfig) -> Self {
        self.config.deskew = deskew;
        self
    }

    pub fn regions(mut self, regions: RegionConfig) -> Self {
        self.config.regions = regions;
        self
    }

    pub fn caption(mut self, caption: CaptionConfig) -> Self {
        self.config.caption = caption;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ScanFigError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ScanFigError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(ScanFigError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        c.deskew.validate()?;
        c.regions.validate()?;
        c.caption.validate()?;
        Ok(self.config)
    }
}

// ── Stage configs ────────────────────────────────────────────────────────

/// Parameters of the skew estimator.
///
/// Segments are found with a progressive probabilistic Hough transform
/// (ρ = 1 px, θ = 1°) on the Canny edge map of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskewConfig {
    /// Run skew correction at all. Default: true.
    pub enabled: bool,
    /// Canny hysteresis low threshold, applied after imageproc's own σ 1.4 blur. Default: 50.
    pub canny_low: f32,
    /// Canny hysteresis high threshold. Default: 150.
    pub canny_high: f32,
    /// Accumulator votes a line needs before a segment is traced. Default: 100.
    pub hough_vote_threshold: u32,
    /// Minimum segment extent along x or y, in pixels. Default: 100.
    pub min_line_length: u32,
    /// Largest run of missing edge pixels bridged inside one segment. Default: 10.
    pub max_line_gap: u32,
    /// Half-width of the angular window around 0° and ±90°, in degrees. Default: 15.
    pub angle_tolerance_deg: f32,
}

impl Default for DeskewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 100,
            min_line_length: 100,
            max_line_gap: 10,
            angle_tolerance_deg: 15.0,
        }
    }
}

impl DeskewConfig {
    fn validate(&self) -> Result<(), ScanFigError> {
        if self.canny_low > self.canny_high {
            return Err(ScanFigError::InvalidConfig(format!(
                "deskew: canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.hough_vote_threshold == 0 {
            return Err(ScanFigError::InvalidConfig(
                "deskew: hough_vote_threshold must be ≥ 1".into(),
            ));
        }
        if !(self.angle_tolerance_deg > 0.0 && self.angle_tolerance_deg < 45.0) {
            return Err(ScanFigError::InvalidConfig(format!(
                "deskew: angle_tolerance_deg must be in (0, 45), got {}",
                self.angle_tolerance_deg
            )));
        }
        Ok(())
    }
}

/// Parameters of the candidate-region detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Gaussian blur sigma before edge detection (a 5×5 kernel equivalent). Default: 1.1.
    pub blur_sigma: f32,
    /// Canny hysteresis low threshold, applied after imageproc's own σ 1.4 blur. Default: 50.
    pub canny_low: f32,
    /// Canny hysteresis high threshold. Default: 150.
    pub canny_high: f32,
    /// Width of the closing rectangle. Default: 40.
    ///
    /// The kernel is deliberately wide and short: it bridges horizontal gaps
    /// (figure to caption line, broken figure borders) without merging
    /// vertically stacked blocks of body text.
    pub close_kernel_width: u32,
    /// Height of the closing rectangle. Default: 5.
    pub close_kernel_height: u32,
    /// Closing iterations (dilate n times, then erode n times). Default: 2.
    pub close_iterations: u32,
    /// Only the largest N contours are considered. Default: 8.
    pub max_candidates: usize,
    /// Boxes closer than this fraction of the page size to any edge are
    /// treated as margin noise. Default: 0.02.
    pub edge_margin_ratio: f64,
    /// Contour area must exceed this, in px². Default: 20 000.
    pub min_area: f64,
    /// Contour area must stay below this fraction of the page area. Default: 0.70.
    pub max_area_ratio: f64,
    /// Exclusive lower bound on `width / height`. Default: 0.2.
    pub min_aspect_ratio: f64,
    /// Exclusive upper bound on `width / height`. Default: 4.0.
    pub max_aspect_ratio: f64,
    /// Padding added around each accepted box before cropping. Default: 15.
    pub crop_padding: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            close_kernel_width: 40,
            close_kernel_height: 5,
            close_iterations: 2,
            max_candidates: 8,
            edge_margin_ratio: 0.02,
            min_area: 20_000.0,
            max_area_ratio: 0.70,
            min_aspect_ratio: 0.2,
            max_aspect_ratio: 4.0,
            crop_padding: 15,
        }
    }
}

impl RegionConfig {
    fn validate(&self) -> Result<(), ScanFigError> {
        if self.blur_sigma <= 0.0 {
            return Err(ScanFigError::InvalidConfig(format!(
                "regions: blur_sigma must be > 0, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(ScanFigError::InvalidConfig(format!(
                "regions: canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.close_kernel_width == 0 || self.close_kernel_height == 0 {
            return Err(ScanFigError::InvalidConfig(
                "regions: closing kernel must be at least 1×1".into(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(ScanFigError::InvalidConfig(
                "regions: max_candidates must be ≥ 1".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.edge_margin_ratio) {
            return Err(ScanFigError::InvalidConfig(format!(
                "regions: edge_margin_ratio must be in [0, 0.5), got {}",
                self.edge_margin_ratio
            )));
        }
        if !(self.max_area_ratio > 0.0 && self.max_area_ratio <= 1.0) {
            return Err(ScanFigError::InvalidConfig(format!(
                "regions: max_area_ratio must be in (0, 1], got {}",
                self.max_area_ratio
            )));
        }
        if self.min_aspect_ratio <= 0.0 || self.min_aspect_ratio >= self.max_aspect_ratio {
            return Err(ScanFigError::InvalidConfig(format!(
                "regions: aspect bounds must satisfy 0 < min < max, got ({}, {})",
                self.min_aspect_ratio, self.max_aspect_ratio
            )));
        }
        Ok(())
    }
}

/// Parameters of the caption stripper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Chebyshev radius of the dilation square: 2 gives a 5×5 kernel. Default: 2.
    ///
    /// Large enough to fuse a figure's own strokes into one blob, too small
    /// to bridge the gap between the figure and the caption text beneath it.
    pub dilate_radius: u8,
    /// Contours smaller than this fraction of the largest one are discarded. Default: 0.05.
    pub keep_ratio: f64,
    /// Padding around the union box of the kept contours. Default: 5.
    pub padding: u32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            dilate_radius: 2,
            keep_ratio: 0.05,
            padding: 5,
        }
    }
}

impl CaptionConfig {
    fn validate(&self) -> Result<(), ScanFigError> {
        if !(self.keep_ratio > 0.0 && self.keep_ratio <= 1.0) {
            return Err(ScanFigError::InvalidConfig(format!(
                "caption: keep_ratio must be in (0, 1], got {}",
                self.keep_ratio
            )));
        }
        Ok(())
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of each document to process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Process all pages (default).
    #[default]
    All,
    /// Process a single page (1-indexed).
    Single(usize),
    /// Process a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Process specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let c = ExtractionConfig::default();
        assert_eq!(c.source_dir, PathBuf::from("./chapter_pdfs"));
        assert_eq!(c.output_dir, PathBuf::from("./extracted_scans"));
        assert_eq!(c.dpi, 200);
        assert_eq!(c.jpeg_quality, 95);
        assert_eq!(c.regions.max_candidates, 8);
        assert_eq!(c.regions.crop_padding, 15);
        assert_eq!(c.caption.padding, 5);
        assert_eq!(c.deskew.min_line_length, 100);
        assert_eq!(c.deskew.max_line_gap, 10);
    }

    #[test]
    fn render_scale_from_dpi() {
        let c = ExtractionConfig::default();
        assert!((c.render_scale() - 200.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn builder_clamps_dpi_and_quality() {
        let c = ExtractionConfig::builder()
            .dpi(5000)
            .jpeg_quality(0)
            .build()
            .expect("clamped values are valid");
        assert_eq!(c.dpi, 600);
        assert_eq!(c.jpeg_quality, 1);
    }

    #[test]
    fn build_rejects_inverted_aspect_bounds() {
        let regions = RegionConfig {
            min_aspect_ratio: 5.0,
            max_aspect_ratio: 4.0,
            ..RegionConfig::default()
        };
        let err = ExtractionConfig::builder()
            .regions(regions)
            .build()
            .unwrap_err();
        assert!(matches!(err, ScanFigError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_zero_candidates() {
        let regions = RegionConfig {
            max_candidates: 0,
            ..RegionConfig::default()
        };
        assert!(ExtractionConfig::builder().regions(regions).build().is_err());
    }

    #[test]
    fn build_rejects_bad_keep_ratio() {
        let caption = CaptionConfig {
            keep_ratio: 0.0,
            ..CaptionConfig::default()
        };
        assert!(ExtractionConfig::builder().caption(caption).build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExtractionConfig::builder()
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn stage_configs_round_trip_through_json() {
        let regions = RegionConfig::default();
        let json = serde_json::to_string(&regions).unwrap();
        let back: RegionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, regions);
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(2).to_indices(3), vec![1]);
        assert_eq!(PageSelection::Single(9).to_indices(3), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 10).to_indices(4), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2]
        );
    }
}

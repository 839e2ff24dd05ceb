//! CLI binary for scan-figures.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.
//!
//! Exit status: 0 when everything succeeded, 1 on a fatal error, 2 when the
//! run finished but some document, page or figure failed.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scan_figures::{
    extract_directory, CaptionConfig, DeskewConfig, ExtractionConfig,
    ExtractionProgressCallback, PageSelection, ProgressCallback, RegionConfig,
    DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── Terminal styling ─────────────────────────────────────────────────────────

/// SGR codes used by the progress output.
#[derive(Clone, Copy)]
enum Style {
    Bold = 1,
    Dim = 2,
    Red = 31,
    Green = 32,
    Cyan = 36,
}

fn paint(style: Style, s: &str) -> String {
    format!("\x1b[{}m{s}\x1b[0m", style as u8)
}

fn green(s: &str) -> String {
    paint(Style::Green, s)
}
fn red(s: &str) -> String {
    paint(Style::Red, s)
}
fn dim(s: &str) -> String {
    paint(Style::Dim, s)
}
fn bold(s: &str) -> String {
    paint(Style::Bold, s)
}
fn cyan(s: &str) -> String {
    paint(Style::Cyan, s)
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the pages of the current
/// chapter, with a log line per saved figure printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Pages skipped plus figures that failed to write.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Listing PDFs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full bar for a chapter with `total` selected pages.
    fn activate_bar(&self, chapter: &str, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_style(progress_style);
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(chapter.to_string());
        self.bar.reset_eta();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Scanning {total_documents} chapter PDF(s)…"))
        ));
    }

    fn on_document_start(&self, chapter: &str, total_pages: usize) {
        self.activate_bar(chapter, total_pages);
        self.bar
            .println(format!("\n{} {}", bold("Processing scan:"), chapter));
    }

    fn on_figure_saved(&self, _chapter: &str, page_num: usize, figure: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Page {:>3}: saved figure {}  {}",
            green("✓"),
            page_num,
            figure,
            dim(&path.display().to_string()),
        ));
    }

    fn on_page_complete(&self, _chapter: &str, _page_num: usize, _figures: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, _chapter: &str, page_num: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg = truncate(error, 80);
        self.bar
            .println(format!("  {} Page {:>3}: {}", red("✗"), page_num, red(&msg)));
    }

    fn on_document_complete(&self, chapter: &str, figures_saved: usize) {
        self.bar.println(format!(
            "  {} {}",
            dim("└"),
            dim(&format!("{chapter}: {figures_saved} figure(s)"))
        ));
    }

    fn on_document_error(&self, chapter: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "{} {}  {}",
            red("✘"),
            bold(chapter),
            red(&truncate(error, 120))
        ));
    }

    fn on_run_complete(&self, documents: usize, figures_saved: usize) {
        self.bar.finish_and_clear();
        let errors = self.errors.load(Ordering::SeqCst);
        if errors == 0 {
            eprintln!(
                "{} {} figure(s) extracted from {} document(s)",
                green("✔"),
                bold(&figures_saved.to_string()),
                documents
            );
        } else {
            eprintln!(
                "{} {} figure(s) extracted from {} document(s)  ({} failure(s))",
                cyan("⚠"),
                bold(&figures_saved.to_string()),
                documents,
                red(&errors.to_string()),
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default folders: ./chapter_pdfs → ./extracted_scans
  scan-figures

  # Explicit folders
  scan-figures scans/ figures/

  # Only the first ten pages of each chapter, no skew correction
  scan-figures --pages 1-10 --no-deskew scans/ figures/

  # Machine-readable report
  scan-figures --json scans/ figures/ > report.json

OUTPUT LAYOUT:
  <OUTPUT_DIR>/<chapter>/page_<N>_fig_<K>.jpg
  <chapter> is the PDF file name without extension; N and K start at 1.

EXIT STATUS:
  0  every document, page and figure succeeded
  1  fatal error (bad arguments, missing source folder, pdfium unavailable)
  2  finished, but at least one document, page or figure failed

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  SCAN_FIGURES_*          Every flag, e.g. SCAN_FIGURES_DPI=300
  RUST_LOG                Override log filtering (e.g. scan_figures=debug)
"#;

/// Extract figures and diagrams from scanned PDF chapters.
#[derive(Parser, Debug)]
#[command(
    name = "scan-figures",
    version,
    about = "Extract figures and diagrams from scanned PDF chapters",
    long_about = "Rasterise every page of every PDF in SOURCE_DIR, straighten it, find \
figure-sized regions, trim caption text off each one and save it as a JPEG under \
OUTPUT_DIR/<chapter>/.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the chapter PDFs.
    #[arg(env = "SCAN_FIGURES_SOURCE", default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// Folder that receives one sub-folder of figures per chapter.
    #[arg(env = "SCAN_FIGURES_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Rendering DPI (72–600). Pixel thresholds are calibrated for 200.
    #[arg(long, env = "SCAN_FIGURES_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "SCAN_FIGURES_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "SCAN_FIGURES_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "SCAN_FIGURES_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library (or the directory holding it).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Largest contours considered per page.
    #[arg(long, env = "SCAN_FIGURES_MAX_CANDIDATES", default_value_t = 8)]
    max_candidates: usize,

    /// Minimum contour area of a figure region, px².
    #[arg(long, env = "SCAN_FIGURES_MIN_REGION_AREA", default_value_t = 20_000.0)]
    min_region_area: f64,

    /// Page-edge margin as a fraction of the page size.
    #[arg(long, env = "SCAN_FIGURES_EDGE_MARGIN", default_value_t = 0.02)]
    edge_margin: f64,

    /// Padding around each region before caption stripping, px.
    #[arg(long, env = "SCAN_FIGURES_CROP_PADDING", default_value_t = 15)]
    crop_padding: u32,

    /// Caption stripping keeps blobs at least this fraction of the largest.
    #[arg(long, env = "SCAN_FIGURES_KEEP_RATIO", default_value_t = 0.05)]
    keep_ratio: f64,

    /// Skip skew estimation and correction.
    #[arg(long, env = "SCAN_FIGURES_NO_DESKEW")]
    no_deskew: bool,

    /// Print the extraction report as JSON on stdout.
    #[arg(long, env = "SCAN_FIGURES_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SCAN_FIGURES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCAN_FIGURES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCAN_FIGURES_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar prints the per-figure lines itself.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let report = extract_directory(&config)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "Extracted {} figure(s) from {} document(s) in {}ms",
            report.stats.figures_saved,
            report.documents.len(),
            report.stats.total_duration_ms
        );
        if report.has_failures() {
            eprintln!("  {} failure(s)", report.failure_count());
        }
    }

    Ok(if report.has_failures() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let deskew = DeskewConfig {
        enabled: !cli.no_deskew,
        ..DeskewConfig::default()
    };
    let regions = RegionConfig {
        max_candidates: cli.max_candidates,
        min_area: cli.min_region_area,
        edge_margin_ratio: cli.edge_margin,
        crop_padding: cli.crop_padding,
        ..RegionConfig::default()
    };
    let caption = CaptionConfig {
        keep_ratio: cli.keep_ratio,
        ..CaptionConfig::default()
    };

    let mut builder = ExtractionConfig::builder()
        .source_dir(&cli.source_dir)
        .output_dir(&cli.output_dir)
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality)
        .pages(pages)
        .deskew(deskew)
        .regions(regions)
        .caption(caption);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` (`all`, `5`, `3-15`, `1,3,5`) into a `PageSelection`.
///
/// Page numbers are the ones printed in figure file names, so they start at 1.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let spec = s.trim().to_ascii_lowercase();
    let page = |text: &str| -> Result<usize> {
        let n: usize = text
            .trim()
            .parse()
            .with_context(|| format!("--pages: '{}' is not a page number", text.trim()))?;
        if n == 0 {
            anyhow::bail!("--pages: page numbers start at 1 (page_1_fig_*.jpg), got 0");
        }
        Ok(n)
    };

    if spec == "all" {
        Ok(PageSelection::All)
    } else if let Some((first, last)) = spec.split_once('-') {
        let (first, last) = (page(first)?, page(last)?);
        if first > last {
            anyhow::bail!("--pages: range {first}-{last} runs backwards");
        }
        Ok(PageSelection::Range(first, last))
    } else if spec.contains(',') {
        let pages = spec.split(',').map(page).collect::<Result<Vec<_>>>()?;
        Ok(PageSelection::Set(pages))
    } else {
        Ok(PageSelection::Single(page(&spec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_all_single_range_set() {
        assert_eq!(parse_pages("all").unwrap(), PageSelection::All);
        assert_eq!(parse_pages(" ALL ").unwrap(), PageSelection::All);
        assert_eq!(parse_pages("5").unwrap(), PageSelection::Single(5));
        assert_eq!(parse_pages("3-15").unwrap(), PageSelection::Range(3, 15));
        assert_eq!(
            parse_pages("1, 3,5").unwrap(),
            PageSelection::Set(vec![1, 3, 5])
        );
    }

    #[test]
    fn pages_rejects_bad_input() {
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("9-2").is_err());
        assert!(parse_pages("1,x").is_err());
        assert!(parse_pages("0,2").is_err());
        assert!(parse_pages("").is_err());
    }

    #[test]
    fn pages_errors_name_the_flag() {
        let msg = format!("{:#}", parse_pages("2-x").unwrap_err());
        assert!(msg.contains("--pages"), "got: {msg}");
        assert!(msg.contains("'x'"), "got: {msg}");
        let msg = parse_pages("7-3").unwrap_err().to_string();
        assert!(msg.contains("7-3"), "got: {msg}");
    }

    #[test]
    fn paint_wraps_in_sgr_codes() {
        assert_eq!(red("x"), "\x1b[31mx\x1b[0m");
        assert_eq!(bold("x"), "\x1b[1mx\x1b[0m");
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::parse_from(["scan-figures"]);
        assert_eq!(cli.source_dir, PathBuf::from(DEFAULT_SOURCE_DIR));
        assert_eq!(cli.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        let config = build_config(&cli, None).unwrap();
        let defaults = ExtractionConfig::default();
        assert_eq!(config.dpi, defaults.dpi);
        assert_eq!(config.jpeg_quality, defaults.jpeg_quality);
        assert_eq!(config.regions, defaults.regions);
        assert_eq!(config.caption, defaults.caption);
        assert!(config.deskew.enabled);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd\u{2026}");
    }
}

//! End-to-end tests for scan-figures: real PDFs rendered through pdfium.
//!
//! The fixtures are generated on the fly with lopdf, so no binary test
//! files are checked in. pdfium must be available at runtime, and the tests
//! are gated behind the `SCAN_FIGURES_E2E` environment variable so they do
//! not run in CI unless explicitly requested.
//!
//! Run with:
//!   SCAN_FIGURES_E2E=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture

use lopdf::{dictionary, Document, Object, Stream};
use scan_figures::{
    extract_directory, extract_directory_sync, ExtractionConfig, PageSelection, ScanFigError,
};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless `SCAN_FIGURES_E2E` is set and pdfium can be bound.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("SCAN_FIGURES_E2E").is_err() {
            println!("SKIP — set SCAN_FIGURES_E2E=1 to run e2e tests");
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter("scan_figures=debug")
            .with_test_writer()
            .try_init();
        let lib = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
        if let Err(e) = scan_figures::pipeline::render::bind_pdfium(lib.as_deref()) {
            println!("SKIP — pdfium unavailable: {e}");
            return;
        }
        lib
    }};
}

/// Letter-size page content: a filled 2×1.5 in block with an 8 pt caption
/// just below it.
const FIGURE_PAGE: &[u8] = b"0 g\n\
216 432 144 108 re f\n\
BT /F1 8 Tf 216 420 Td (FIG 1. A filled block) Tj ET\n";

/// Letter-size page content: body text only.
const TEXT_PAGE: &[u8] = b"BT /F1 11 Tf 72 700 Td (Nothing to extract on this page.) Tj ET\n";

/// Write a PDF with one letter-size page per entry of `pages`.
fn write_pdf(path: &Path, pages: &[&[u8]]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("write fixture PDF");
}

fn config(source: &Path, out: &Path, lib: Option<PathBuf>) -> ExtractionConfig {
    let mut builder = ExtractionConfig::builder().source_dir(source).output_dir(out);
    if let Some(lib) = lib {
        builder = builder.pdfium_library(lib);
    }
    builder.build().expect("valid config")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_extracts_figure_from_rendered_pdf() {
    let lib = e2e_skip_unless_ready!();
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("chapter_pdfs");
    let out = tmp.path().join("extracted_scans");
    std::fs::create_dir(&src).unwrap();
    write_pdf(&src.join("chapter_01.pdf"), &[TEXT_PAGE, FIGURE_PAGE]);

    let report = extract_directory_sync(&config(&src, &out, lib)).expect("run succeeds");

    assert_eq!(report.documents.len(), 1);
    let doc = &report.documents[0];
    assert_eq!(doc.error, None);
    assert_eq!(doc.chapter, "chapter_01");
    assert_eq!(doc.page_count, 2);
    assert_eq!(doc.pages_rendered, 2);
    assert!(!doc.figures.is_empty(), "no figure found: {doc:?}");
    assert!(doc.figures.iter().all(|f| f.page_num == 2));

    let first = out.join("chapter_01").join("page_2_fig_1.jpg");
    assert!(first.is_file());
    // 2×1.5 in at 200 DPI is 400×300 px; the caption is trimmed off
    let img = image::open(&first).expect("valid JPEG").to_rgb8();
    let (w, h) = img.dimensions();
    assert!((400..=440).contains(&w), "width {w}");
    assert!((300..=340).contains(&h), "height {h}");
    assert!(!report.has_failures());
}

#[test]
fn test_page_selection_limits_rendering() {
    let lib = e2e_skip_unless_ready!();
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("in");
    let out = tmp.path().join("out");
    std::fs::create_dir(&src).unwrap();
    write_pdf(&src.join("ch.pdf"), &[FIGURE_PAGE, TEXT_PAGE, FIGURE_PAGE]);

    let mut cfg = config(&src, &out, lib);
    cfg.pages = PageSelection::Single(3);
    let report = extract_directory_sync(&cfg).unwrap();

    let doc = &report.documents[0];
    assert_eq!(doc.page_count, 3);
    assert_eq!(doc.pages_rendered, 1);
    assert!(doc.figures.iter().all(|f| f.page_num == 3));
    assert!(!out.join("ch").join("page_1_fig_1.jpg").exists());
}

#[test]
fn test_bad_file_fails_only_its_document() {
    let lib = e2e_skip_unless_ready!();
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("in");
    let out = tmp.path().join("out");
    std::fs::create_dir(&src).unwrap();
    std::fs::write(src.join("a_broken.pdf"), b"this is not a pdf").unwrap();
    write_pdf(&src.join("b_good.pdf"), &[FIGURE_PAGE]);

    let report = extract_directory_sync(&config(&src, &out, lib)).unwrap();

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.documents[0].chapter, "a_broken");
    assert!(report.documents[0].error.is_some());
    assert_eq!(report.documents[1].error, None);
    assert!(!report.documents[1].figures.is_empty());
    assert_eq!(report.stats.documents_failed, 1);
    assert!(matches!(
        report.into_result().unwrap_err(),
        ScanFigError::PartialFailure { failed: 1, documents: 2 }
    ));
    // the chapter directory exists even for the failed document
    assert!(out.join("a_broken").is_dir());
}

#[tokio::test]
async fn test_async_entry_point() {
    let lib = e2e_skip_unless_ready!();
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("in");
    let out = tmp.path().join("out");
    std::fs::create_dir(&src).unwrap();
    write_pdf(&src.join("ch.pdf"), &[FIGURE_PAGE]);

    let report = extract_directory(&config(&src, &out, lib)).await.unwrap();
    assert_eq!(report.stats.documents_processed, 1);
    assert!(report.stats.figures_saved >= 1);
}

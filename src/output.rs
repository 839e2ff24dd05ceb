//! Report types returned by the extraction driver.
//!
//! Everything here is `Serialize` so the CLI can print a run as JSON with
//! `--json`. Paths are reported as written, relative or absolute depending
//! on how the output directory was configured.

use crate::error::{PageError, ScanFigError};
use crate::pipeline::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a whole run over a source directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// One entry per discovered PDF, in processing order.
    pub documents: Vec<DocumentReport>,
    pub stats: ExtractionStats,
}

impl ExtractionReport {
    /// Documents that failed outright, plus page and figure errors.
    pub fn failure_count(&self) -> usize {
        self.documents
            .iter()
            .map(|d| d.page_errors.len() + usize::from(d.error.is_some()))
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// `Ok(self)` when nothing failed, [`ScanFigError::PartialFailure`] otherwise.
    pub fn into_result(self) -> Result<Self, ScanFigError> {
        let failed = self.failure_count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(ScanFigError::PartialFailure {
                failed,
                documents: self.documents.len(),
            })
        }
    }
}

/// Outcome for one chapter PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Chapter name (file stem of the PDF).
    pub chapter: String,
    pub source: PathBuf,
    /// `<output>/<chapter>`.
    pub output_dir: PathBuf,
    /// Total pages in the document (0 if it could not be opened).
    pub page_count: usize,
    /// Pages rendered successfully (after page selection).
    pub pages_rendered: usize,
    /// Regions accepted by the detector across all pages.
    pub candidates_found: usize,
    pub figures: Vec<SavedFigure>,
    pub page_errors: Vec<PageError>,
    /// Set when the document could not be processed at all.
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn new(chapter: impl Into<String>, source: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            chapter: chapter.into(),
            source,
            output_dir,
            page_count: 0,
            pages_rendered: 0,
            candidates_found: 0,
            figures: Vec::new(),
            page_errors: Vec::new(),
            error: None,
        }
    }
}

/// A figure written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFigure {
    /// 1-indexed page number.
    pub page_num: usize,
    /// 1-indexed figure number on the page.
    pub figure_index: usize,
    pub path: PathBuf,
    /// Candidate region on the deskewed page.
    pub region: Rect,
    /// Final figure box on the deskewed page, after caption stripping.
    pub figure_bounds: Rect,
    /// Skew corrected on this page, degrees.
    pub skew_degrees: Option<f32>,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub pages_rendered: usize,
    pub pages_failed: usize,
    pub candidates_found: usize,
    pub figures_saved: usize,
    pub figures_failed: usize,
    pub total_duration_ms: u64,
}

impl ExtractionStats {
    /// Totals over `documents`.
    pub fn from_documents(documents: &[DocumentReport], total_duration_ms: u64) -> Self {
        let mut stats = Self {
            total_duration_ms,
            ..Self::default()
        };
        for doc in documents {
            if doc.error.is_some() {
                stats.documents_failed += 1;
            } else {
                stats.documents_processed += 1;
            }
            stats.pages_rendered += doc.pages_rendered;
            stats.candidates_found += doc.candidates_found;
            stats.figures_saved += doc.figures.len();
            for err in &doc.page_errors {
                match err {
                    PageError::RenderFailed { .. } => stats.pages_failed += 1,
                    PageError::FigureWriteFailed { .. } => stats.figures_failed += 1,
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(chapter: &str) -> DocumentReport {
        DocumentReport::new(
            chapter,
            PathBuf::from(format!("in/{chapter}.pdf")),
            PathBuf::from(format!("out/{chapter}")),
        )
    }

    #[test]
    fn clean_report_has_no_failures() {
        let report = ExtractionReport {
            documents: vec![doc("ch1"), doc("ch2")],
            stats: ExtractionStats::default(),
        };
        assert!(!report.has_failures());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn failures_are_counted_across_documents() {
        let mut broken = doc("ch1");
        broken.error = Some("corrupt".into());
        let mut partial = doc("ch2");
        partial.page_errors.push(PageError::RenderFailed {
            page: 3,
            detail: "boom".into(),
        });
        let report = ExtractionReport {
            documents: vec![broken, partial, doc("ch3")],
            stats: ExtractionStats::default(),
        };
        assert_eq!(report.failure_count(), 2);

        let stats = ExtractionStats::from_documents(&report.documents, 42);
        assert_eq!(stats.documents_processed, 2);
        assert_eq!(stats.documents_failed, 1);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.figures_failed, 0);
        assert_eq!(stats.total_duration_ms, 42);
        match report.into_result().unwrap_err() {
            ScanFigError::PartialFailure { failed, documents } => {
                assert_eq!(failed, 2);
                assert_eq!(documents, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn report_serialises_to_json() {
        let mut d = doc("ch1");
        d.figures.push(SavedFigure {
            page_num: 2,
            figure_index: 1,
            path: PathBuf::from("out/ch1/page_2_fig_1.jpg"),
            region: Rect::new(10, 20, 300, 200),
            figure_bounds: Rect::new(12, 22, 290, 180),
            skew_degrees: Some(0.5),
        });
        let report = ExtractionReport {
            documents: vec![d],
            stats: ExtractionStats {
                figures_saved: 1,
                ..ExtractionStats::default()
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["documents"][0]["chapter"], "ch1");
        assert_eq!(json["documents"][0]["figures"][0]["page_num"], 2);
        assert_eq!(json["stats"]["figures_saved"], 1);
    }
}

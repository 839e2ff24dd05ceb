//! Input discovery: list the chapter PDFs in a source directory.
//!
//! Only regular files whose extension is `pdf` (any case) are picked up;
//! everything else in the directory is ignored. The listing is sorted by
//! file name so runs are reproducible regardless of directory order.
//! Magic bytes are checked per file by [`validate_pdf`] right before a
//! document is opened, so one bad file fails only its own chapter.

use crate::error::ScanFigError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One PDF found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSource {
    /// File stem, used as the output sub-directory name.
    pub chapter: String,
    pub path: PathBuf,
}

/// Sorted list of `*.pdf` files directly inside `dir`.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<ChapterSource>, ScanFigError> {
    if !dir.is_dir() {
        return Err(ScanFigError::SourceDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    let unreadable = |source: std::io::Error| ScanFigError::SourceDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        if !path.is_file() || !has_pdf_extension(&path) {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        found.push(ChapterSource {
            chapter: stem.to_string_lossy().into_owned(),
            path,
        });
    }
    found.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    debug!("Found {} PDF(s) in {}", found.len(), dir.display());
    Ok(found)
}

/// Case-insensitive `.pdf` extension check.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Verify that `path` starts with the `%PDF` magic bytes.
///
/// Files shorter than four bytes are rejected as well.
pub fn validate_pdf(path: &Path) -> Result<(), ScanFigError> {
    let unreadable = |e: std::io::Error| ScanFigError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };
    let mut head = Vec::with_capacity(4);
    File::open(path)
        .map_err(unreadable)?
        .take(4)
        .read_to_end(&mut head)
        .map_err(unreadable)?;

    let mut magic = [0u8; 4];
    magic[..head.len()].copy_from_slice(&head);
    if &magic != b"%PDF" {
        return Err(ScanFigError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

//! Figure encoding: `RgbImage` → JPEG file.
//!
//! Files are written atomically: the JPEG is encoded into a temp file in
//! the destination directory and renamed over the final path, so an
//! interrupted run never leaves a truncated figure behind and a re-run
//! simply replaces what is there.

use crate::error::ScanFigError;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Encode `image` as a baseline JPEG at `quality` (1–100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

/// Encode and atomically write `image` to `path`.
///
/// The parent directory must already exist.
pub fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), ScanFigError> {
    let bytes = encode_jpeg(image, quality).map_err(|e| ScanFigError::ImageEncodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let write_failed = |source: std::io::Error| ScanFigError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer.write_all(&bytes).map_err(write_failed)?;
        writer.flush().map_err(write_failed)?;
    }
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

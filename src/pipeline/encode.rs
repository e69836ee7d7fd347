//! Image encoding: `DynamicImage` → JPEG file.
//!
//! Rendered pages are flattened to RGB first; JPEG has no alpha channel and
//! pdfium hands back BGRA bitmaps.

use crate::error::Pdf2PptxError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Encode `img` as a baseline JPEG at `quality` (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;
    Ok(buf)
}

/// Encode `img` and write it to `path`.
pub fn write_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), Pdf2PptxError> {
    let write_err = |source: image::ImageError| Pdf2PptxError::ImageWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let bytes = encode_jpeg(img, quality).map_err(write_err)?;
    std::fs::write(path, &bytes).map_err(|e| write_err(image::ImageError::IoError(e)))?;

    debug!(
        "Wrote {}x{} page → {} ({} bytes)",
        img.width(),
        img.height(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

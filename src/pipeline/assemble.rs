//! Slide assembler: a directory of images in, a presentation out.
//!
//! Images are taken in file-name order, one blank slide each, stretched to
//! cover the whole canvas. Aspect ratio is not preserved: a landscape PDF
//! page on a 4:3 slide is meant to fill it edge to edge.

use crate::config::ConversionConfig;
use crate::error::Pdf2PptxError;
use crate::pptx::Presentation;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions (compared case-insensitively) that become slides.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// `true` if `path` has one of [`IMAGE_EXTENSIONS`].
pub fn is_slide_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Image files directly inside `dir`, sorted by file name.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, Pdf2PptxError> {
    let read_err = |source| Pdf2PptxError::ImageDirReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && is_slide_image(&path) {
            images.push(path);
        } else {
            debug!("Skipping {}", path.display());
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Build a presentation from the images in `image_dir` and save it to
/// `output_path`. Returns the number of slides.
pub fn assemble(
    image_dir: &Path,
    output_path: &Path,
    config: &ConversionConfig,
) -> Result<usize, Pdf2PptxError> {
    let images = collect_images(image_dir)?;
    if images.is_empty() {
        warn!(
            "No images in {}; writing an empty presentation",
            image_dir.display()
        );
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_assemble_start(images.len());
    }

    let mut pres = Presentation::new(config.slide_size);
    if let Some(stem) = output_path.file_stem() {
        pres.set_title(stem.to_string_lossy());
    }

    let total = images.len();
    for (i, image) in images.iter().enumerate() {
        pres.add_blank_slide().add_full_bleed_picture(image)?;
        debug!("Slide {}/{} ← {}", i + 1, total, image.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_added(i + 1, total);
        }
    }

    pres.save(output_path)?;
    info!(
        "Saved {} slides ({}) → {}",
        pres.slide_count(),
        config.slide_size,
        output_path.display()
    );
    Ok(pres.slide_count())
}

//! Rasterizer: one PDF in, a fresh directory of page JPEGs out.
//!
//! The directory is `<pdf-dir>/<image_dir_name>` and must not exist yet; a
//! leftover from an earlier run is reported, never reused. Page files are
//! named so that sorting by name gives page order:
//!
//! | pages | names |
//! |-------|-------|
//! | 1     | `deck.jpeg` |
//! | 2–99  | `deck_01.jpeg` … `deck_42.jpeg` |
//! | 100+  | `deck_001.jpeg` … `deck_120.jpeg` |
//!
//! Nothing is cleaned up on failure: whatever was written stays for
//! inspection.

use super::encode::write_jpeg;
use super::render::{RenderBackend, RenderedPage};
use crate::config::ConversionConfig;
use crate::error::Pdf2PptxError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extension of every page image.
pub const PAGE_IMAGE_EXTENSION: &str = "jpeg";

/// Minimum width of the page-number suffix.
const MIN_PAGE_DIGITS: usize = 2;

/// The outcome of [`rasterize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedPages {
    pub image_dir: PathBuf,
    /// Written images in page order.
    pub images: Vec<PathBuf>,
}

impl RasterizedPages {
    pub fn page_count(&self) -> usize {
        self.images.len()
    }
}

/// File name of page `number` (1-indexed) of a `total`-page document.
pub fn page_image_name(stem: &str, number: usize, total: usize) -> String {
    if total <= 1 {
        return format!("{stem}.{PAGE_IMAGE_EXTENSION}");
    }
    let width = total.to_string().len().max(MIN_PAGE_DIGITS);
    format!("{stem}_{number:0width$}.{PAGE_IMAGE_EXTENSION}")
}

/// Create `dir`, failing with [`Pdf2PptxError::ImageDirExists`] if anything
/// already occupies that path.
pub fn create_image_dir(dir: &Path) -> Result<(), Pdf2PptxError> {
    match fs::create_dir(dir) {
        Ok(()) => {
            debug!("Created image directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Pdf2PptxError::ImageDirExists {
            path: dir.to_path_buf(),
        }),
        Err(source) => Err(Pdf2PptxError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Fail with [`Pdf2PptxError::ImageDirExists`] if the image directory for
/// `pdf_path` is already taken.
///
/// Lets a run stop before pdfium is located or downloaded. The check that
/// counts is still the one in [`create_image_dir`].
pub fn ensure_image_dir_free(
    pdf_path: &Path,
    config: &ConversionConfig,
) -> Result<(), Pdf2PptxError> {
    let dir = config.image_dir_for(pdf_path);
    match fs::symlink_metadata(&dir) {
        Ok(_) => Err(Pdf2PptxError::ImageDirExists { path: dir }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Pdf2PptxError::Io { path: dir, source }),
    }
}

/// Render every page of `pdf_path` into a new image directory next to it.
pub fn rasterize(
    pdf_path: &Path,
    backend: &dyn RenderBackend,
    config: &ConversionConfig,
) -> Result<RasterizedPages, Pdf2PptxError> {
    let image_dir = config.image_dir_for(pdf_path);
    create_image_dir(&image_dir)?;

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut images = Vec::new();

    let mut sink = |page: RenderedPage| -> Result<(), Pdf2PptxError> {
        if page.number == 1 {
            if let Some(ref cb) = config.progress_callback {
                cb.on_rasterize_start(page.total);
            }
        }

        let path = image_dir.join(page_image_name(&stem, page.number, page.total));
        write_jpeg(&page.image, &path, config.jpeg_quality)?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_rendered(page.number, page.total, &path);
        }
        images.push(path);
        Ok(())
    };

    let total = backend.render_pages(
        pdf_path,
        config.dpi,
        config.password.as_deref(),
        &mut sink,
    )?;

    if total == 0 {
        return Err(Pdf2PptxError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    info!(
        "Rasterised {} pages at {} DPI into {}",
        images.len(),
        config.dpi,
        image_dir.display()
    );
    Ok(RasterizedPages { image_dir, images })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_has_no_suffix() {
        assert_eq!(page_image_name("deck", 1, 1), "deck.jpeg");
    }

    #[test]
    fn multi_page_pads_to_two_digits() {
        assert_eq!(page_image_name("deck", 1, 3), "deck_01.jpeg");
        assert_eq!(page_image_name("deck", 12, 12), "deck_12.jpeg");
        assert_eq!(page_image_name("deck", 7, 99), "deck_07.jpeg");
    }

    #[test]
    fn hundred_plus_pages_widen_the_padding() {
        assert_eq!(page_image_name("deck", 1, 120), "deck_001.jpeg");
        assert_eq!(page_image_name("deck", 120, 120), "deck_120.jpeg");
        assert_eq!(page_image_name("deck", 5, 1000), "deck_0005.jpeg");
    }

    #[test]
    fn names_sort_in_page_order() {
        for total in [2, 10, 99, 100, 250] {
            let names: Vec<String> = (1..=total)
                .map(|n| page_image_name("deck", n, total))
                .collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted, "misordered at {total} pages");
        }
    }

    #[test]
    fn stem_keeps_inner_dots() {
        assert_eq!(page_image_name("q3.review", 2, 2), "q3.review_02.jpeg");
    }

    #[test]
    fn existing_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir(&images).unwrap();
        match create_image_dir(&images).unwrap_err() {
            Pdf2PptxError::ImageDirExists { path } => assert_eq!(path, images),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn existing_file_blocks_the_dir_too() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        fs::write(&images, b"not a dir").unwrap();
        assert!(matches!(
            create_image_dir(&images).unwrap_err(),
            Pdf2PptxError::ImageDirExists { .. }
        ));
    }

    #[test]
    fn early_check_sees_a_leftover_dir() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        let config = ConversionConfig::default();

        ensure_image_dir_free(&pdf, &config).unwrap();
        assert!(!dir.path().join("images").exists());

        fs::create_dir(dir.path().join("images")).unwrap();
        match ensure_image_dir_free(&pdf, &config).unwrap_err() {
            Pdf2PptxError::ImageDirExists { path } => assert_eq!(path, dir.path().join("images")),
            other => panic!("unexpected error: {other}"),
        }
    }
}

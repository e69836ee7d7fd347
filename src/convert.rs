//! Conversion entry points: the orchestrator.
//!
//! A run is strictly sequential:
//!
//! ```text
//! resolve input ─▶ rasterize ─▶ assemble ─▶ saved ─▶ remove images/
//! ```
//!
//! Any error stops the run and is returned as-is. No cleanup happens on
//! failure; the image directory, if it was created, stays for inspection.

use crate::config::ConversionConfig;
use crate::error::Pdf2PptxError;
use crate::output::ConversionReport;
use crate::pipeline::render::{PdfiumBackend, RenderBackend};
use crate::pipeline::{assemble, input, rasterize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// `<pdf-dir>/<pdf-stem>.pptx`.
///
/// ```rust
/// use pdf2pptx::derive_output_path;
/// use std::path::PathBuf;
///
/// assert_eq!(derive_output_path("talks/q3.pdf".as_ref()), PathBuf::from("talks/q3.pptx"));
/// ```
pub fn derive_output_path(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension("pptx")
}

/// Checks that need neither pdfium nor the PDF's contents: the input is a
/// readable PDF and its image directory is free.
///
/// Returns the resolved input path.
pub fn preflight(pdf_path: &Path, config: &ConversionConfig) -> Result<PathBuf, Pdf2PptxError> {
    let pdf_path = input::resolve_input(pdf_path)?;
    rasterize::ensure_image_dir_free(&pdf_path, config)?;
    Ok(pdf_path)
}

/// Convert a PDF into a PowerPoint file.
///
/// This is the primary entry point for the library. It binds pdfium as
/// configured and then runs [`convert_with_backend`].
///
/// # Errors
/// Returns `Err(Pdf2PptxError)` for any failure: missing or unreadable PDF,
/// a leftover image directory, pdfium binding or rendering errors, and
/// failures writing images or the presentation.
pub fn convert(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2PptxError> {
    let pdf_path = pdf_path.as_ref();
    // Catch a bad path or a leftover image directory before the (possibly
    // downloading) library lookup.
    preflight(pdf_path, config)?;
    let backend = PdfiumBackend::new(config)?;
    convert_with_backend(pdf_path, &backend, config)
}

/// Convert a PDF using a caller-supplied rendering backend.
pub fn convert_with_backend(
    pdf_path: impl AsRef<Path>,
    backend: &dyn RenderBackend,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2PptxError> {
    let total_start = Instant::now();
    let pdf_path = input::resolve_input(pdf_path.as_ref())?;
    let output_path = config.output_path_for(&pdf_path);
    info!(
        "Starting conversion: {} → {}",
        pdf_path.display(),
        output_path.display()
    );

    // ── Step 1: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let pages = rasterize::rasterize(&pdf_path, backend, config)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {} pages in {}ms",
        pages.page_count(),
        render_duration_ms
    );

    // ── Step 2: Assemble slides ──────────────────────────────────────────
    let assemble_start = Instant::now();
    let slide_count = assemble::assemble(&pages.image_dir, &output_path, config)?;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_presentation_saved(&output_path);
    }

    // ── Step 3: Clean up ─────────────────────────────────────────────────
    let images_removed = if config.keep_images {
        debug!("Keeping {}", pages.image_dir.display());
        false
    } else {
        remove_image_dir(&pages.image_dir)?;
        true
    };

    let report = ConversionReport {
        input: pdf_path,
        output: output_path,
        image_dir: pages.image_dir,
        page_count: pages.images.len(),
        slide_count,
        images_removed,
        render_duration_ms,
        assemble_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} slides, {}ms total",
        report.slide_count, report.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&report);
    }

    Ok(report)
}

fn remove_image_dir(dir: &Path) -> Result<(), Pdf2PptxError> {
    std::fs::remove_dir_all(dir).map_err(|source| Pdf2PptxError::CleanupFailed {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!("Removed {}", dir.display());
    Ok(())
}

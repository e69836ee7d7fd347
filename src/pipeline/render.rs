//! PDF rasterisation: render every page to a `DynamicImage`.
//!
//! Rendering goes through the [`RenderBackend`] trait. [`PdfiumBackend`] is
//! the real implementation; tests drive the pipeline with a backend that
//! paints blank pages instead.
//!
//! Pages are handed to a sink one at a time, so only a single 400 DPI
//! bitmap (about 12 MB for a 10 × 7.5 in page) is alive at once.

use crate::config::ConversionConfig;
use crate::error::Pdf2PptxError;
use image::DynamicImage;
use pdfium_locator::{LibrarySource, PdfiumLocator};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// PDF user units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// One rendered page.
pub struct RenderedPage {
    /// 1-indexed page number.
    pub number: usize,
    /// Pages in the document.
    pub total: usize,
    pub image: DynamicImage,
}

/// Callback receiving pages in document order.
pub type PageSink<'a> = dyn FnMut(RenderedPage) -> Result<(), Pdf2PptxError> + 'a;

/// Something that can turn a PDF into page bitmaps.
pub trait RenderBackend {
    /// Render every page of `pdf_path` at `dpi`, in order, feeding each one
    /// to `sink`.
    ///
    /// Stops at the first error, whether from rendering or from `sink`.
    /// Returns the number of pages in the document.
    fn render_pages(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, Pdf2PptxError>;
}

/// Pixel size of a page `width_pt` × `height_pt` points at `dpi`.
pub fn target_size(width_pt: f32, height_pt: f32, dpi: u32) -> (i32, i32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let px = |pt: f32| ((pt * scale).round() as i32).max(1);
    (px(width_pt), px(height_pt))
}

/// Renders through a bound pdfium library.
pub struct PdfiumBackend {
    pdfium: Pdfium,
    source: LibrarySource,
}

impl PdfiumBackend {
    /// Locate and bind pdfium as configured.
    ///
    /// The library is looked up through [`PdfiumLocator`]: `pdfium_library`
    /// first, then `PDFIUM_LIB_PATH`, the executable's directory, the cache
    /// and the system path, then a download if allowed. Nothing global, such
    /// as `LD_LIBRARY_PATH`, is touched.
    pub fn new(config: &ConversionConfig) -> Result<Self, Pdf2PptxError> {
        Self::with_download_progress(config, None)
    }

    /// Like [`PdfiumBackend::new`], reporting `(bytes, total)` while the
    /// library is downloaded.
    pub fn with_download_progress(
        config: &ConversionConfig,
        on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<Self, Pdf2PptxError> {
        let mut locator = PdfiumLocator::from_env().allow_download(config.allow_pdfium_download);
        if let Some(ref lib) = config.pdfium_library {
            locator = locator.with_library(lib.clone());
        }

        let (pdfium, source) = locator
            .bind(on_progress)
            .map_err(|e| Pdf2PptxError::PdfiumBindingFailed(e.to_string()))?;
        debug!("pdfium bound from {}", source);

        Ok(Self { pdfium, source })
    }

    /// Which lookup step found the library.
    pub fn library_source(&self) -> LibrarySource {
        self.source
    }
}

impl RenderBackend for PdfiumBackend {
    fn render_pages(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, Pdf2PptxError> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| load_error(pdf_path, password, e))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        for idx in 0..total {
            let number = idx + 1;
            let raster_err = |e: PdfiumError| Pdf2PptxError::RasterisationFailed {
                page: number,
                detail: format!("{:?}", e),
            };

            let page = pages.get(idx as u16).map_err(raster_err)?;
            let (width, height) = target_size(page.width().value, page.height().value, dpi);
            let render_config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);

            let image = page
                .render_with_config(&render_config)
                .map_err(raster_err)?
                .as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                number,
                image.width(),
                image.height()
            );

            sink(RenderedPage {
                number,
                total,
                image,
            })?;
        }

        Ok(total)
    }
}

fn load_error(pdf_path: &Path, password: Option<&str>, e: PdfiumError) -> Pdf2PptxError {
    let path = pdf_path.to_path_buf();
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            Pdf2PptxError::WrongPassword { path }
        } else {
            Pdf2PptxError::PasswordRequired { path }
        }
    } else {
        Pdf2PptxError::CorruptPdf {
            path,
            detail: err_str,
        }
    }
}

//! Configuration types for PDF-to-PowerPoint conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the classic
//! behaviour: 400 DPI JPEG pages in `<pdf-dir>/images`, a 10 × 7.5 inch
//! presentation next to the PDF, and the image directory removed once the
//! presentation is saved.

use crate::error::Pdf2PptxError;
use crate::pptx::SlideSize;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Name of the intermediate image directory created next to the input PDF.
pub const DEFAULT_IMAGE_DIR_NAME: &str = "images";

/// Configuration for a PDF-to-PowerPoint conversion.
///
/// # Example
/// ```rust
/// use pdf2pptx::{ConversionConfig, SlideSize};
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .slide_size(SlideSize::Widescreen)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–1200. Default: 400.
    ///
    /// Slides are projected, not printed, but 400 DPI keeps small type crisp
    /// when a slide is zoomed or cropped in the editor afterwards.
    pub dpi: u32,

    /// JPEG quality of the page images (1–100). Default: 75.
    pub jpeg_quality: u8,

    /// Directory name created next to the PDF for page images. Default: `images`.
    ///
    /// Must be a single path component: the directory is always a sibling
    /// of the PDF.
    pub image_dir_name: String,

    /// Canvas size of every slide. Default: [`SlideSize::Standard`].
    pub slide_size: SlideSize,

    /// Output presentation path. If None, `<pdf-dir>/<pdf-stem>.pptx`.
    pub output_path: Option<PathBuf>,

    /// Leave the image directory in place after a successful run. Default: false.
    pub keep_images: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// PDFium shared library, or the directory holding it.
    ///
    /// If None, the library is searched for via `PDFIUM_LIB_PATH`, the
    /// executable's directory, the cache and the system library path.
    pub pdfium_library: Option<PathBuf>,

    /// Allow fetching PDFium into the cache when no copy is found. Default: true.
    pub allow_pdfium_download: bool,

    /// Optional per-stage progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 400,
            jpeg_quality: 75,
            image_dir_name: DEFAULT_IMAGE_DIR_NAME.to_string(),
            slide_size: SlideSize::default(),
            output_path: None,
            keep_images: false,
            password: None,
            pdfium_library: None,
            allow_pdfium_download: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("image_dir_name", &self.image_dir_name)
            .field("slide_size", &self.slide_size)
            .field("output_path", &self.output_path)
            .field("keep_images", &self.keep_images)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library", &self.pdfium_library)
            .field("allow_pdfium_download", &self.allow_pdfium_download)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The image directory for `pdf_path`: `<pdf-dir>/<image_dir_name>`.
    pub fn image_dir_for(&self, pdf_path: &Path) -> PathBuf {
        pdf_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.image_dir_name)
    }

    /// The presentation path for `pdf_path`, honouring `output_path`.
    pub fn output_path_for(&self, pdf_path: &Path) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| crate::convert::derive_output_path(pdf_path))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn image_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.image_dir_name = name.into();
        self
    }

    pub fn slide_size(mut self, size: SlideSize) -> Self {
        self.config.slide_size = size;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn keep_images(mut self, v: bool) -> Self {
        self.config.keep_images = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn allow_pdfium_download(mut self, v: bool) -> Self {
        self.config.allow_pdfium_download = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2PptxError> {
        let c = &self.config;
        if !(72..=1200).contains(&c.dpi) {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if !is_single_component(&c.image_dir_name) {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "Image directory name must be a single path component, got '{}'",
                c.image_dir_name
            )));
        }
        let (w, h) = (c.slide_size.width_emu(), c.slide_size.height_emu());
        if w <= 0 || h <= 0 {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "Slide size must be positive, got {w}×{h} EMU"
            )));
        }
        Ok(self.config)
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_behaviour() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 400);
        assert_eq!(c.image_dir_name, "images");
        assert_eq!(c.slide_size, SlideSize::Standard);
        assert!(!c.keep_images);
        assert!(c.output_path.is_none());
    }

    #[test]
    fn builder_rejects_out_of_range_dpi() {
        let err = ConversionConfig::builder().dpi(50).build().unwrap_err();
        assert!(err.to_string().contains("DPI"), "got: {err}");
        assert!(ConversionConfig::builder().dpi(1200).build().is_ok());
    }

    #[test]
    fn builder_rejects_zero_quality() {
        assert!(ConversionConfig::builder().jpeg_quality(0).build().is_err());
    }

    #[test]
    fn image_dir_name_must_be_one_component() {
        for bad in ["", "a/b", "..", "/abs"] {
            assert!(
                ConversionConfig::builder().image_dir_name(bad).build().is_err(),
                "accepted {bad:?}"
            );
        }
        assert!(ConversionConfig::builder()
            .image_dir_name("pages")
            .build()
            .is_ok());
    }

    #[test]
    fn custom_slide_size_must_be_positive() {
        let err = ConversionConfig::builder()
            .slide_size(SlideSize::Custom {
                width_emu: 0,
                height_emu: 100,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::InvalidConfig(_)));
    }

    #[test]
    fn image_dir_is_a_sibling_of_the_pdf() {
        let c = ConversionConfig::default();
        assert_eq!(
            c.image_dir_for(Path::new("/decks/talk.pdf")),
            PathBuf::from("/decks/images")
        );
        assert_eq!(c.image_dir_for(Path::new("talk.pdf")), PathBuf::from("images"));
    }

    #[test]
    fn explicit_output_path_wins() {
        let c = ConversionConfig::builder()
            .output_path("/out/slides.pptx")
            .build()
            .unwrap();
        assert_eq!(
            c.output_path_for(Path::new("/decks/talk.pdf")),
            PathBuf::from("/out/slides.pptx")
        );
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
    }
}

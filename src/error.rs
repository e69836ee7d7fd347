//! Error types for the pdf2pptx library.
//!
//! A conversion is all-or-nothing: one bad page means there is no
//! presentation worth writing, so every failure is a single
//! [`Pdf2PptxError`] propagated to the caller. The variants follow the
//! pipeline's failure taxonomy:
//!
//! * **Precondition**: the image directory already exists.
//! * **Input**: the PDF is missing, unreadable, not a PDF, encrypted or empty.
//! * **Backend**: pdfium could not be bound or failed to render a page.
//! * **I/O**: writing images, reading them back, saving the presentation or
//!   cleaning up failed.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2pptx library.
#[derive(Debug, Error)]
pub enum Pdf2PptxError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// The image directory next to the PDF is left over from an earlier run.
    ///
    /// It is never overwritten or merged into. Inspect or delete it, then
    /// run again.
    #[error("Directory already exists: {}", .path.display())]
    ImageDirExists { path: PathBuf },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{}'\nCheck the path exists and is readable.", .path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{}'\nFirst bytes: {magic:?}", .path.display())]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{}' is corrupt: {detail}", .path.display())]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.", .path.display())]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{}'", .path.display())]
    WrongPassword { path: PathBuf },

    /// The PDF opened fine but has no pages to turn into slides.
    #[error("PDF '{}' has no pages", .path.display())]
    EmptyDocument { path: PathBuf },

    // ── Backend errors ────────────────────────────────────────────────────
    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is looked up next to the executable, in the cache directory and on\n\
the system library path, and downloaded automatically when allowed.\n\
You can also:\n\
  • Pass --pdfium-lib /path/to/libpdfium (file or directory).\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not encode or write a page image.
    #[error("Failed to write page image '{}': {source}", .path.display())]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not list the image directory.
    #[error("Failed to read image directory '{}': {source}", .path.display())]
    ImageDirReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read an image file while building a slide.
    #[error("Failed to read image '{}': {source}", .path.display())]
    ImageReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the presentation package.
    #[error("Failed to write presentation '{}': {detail}", .path.display())]
    PresentationWriteFailed { path: PathBuf, detail: String },

    /// The presentation was saved but the image directory could not be removed.
    #[error("Failed to remove image directory '{}': {source}", .path.display())]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other filesystem error, with the path it concerned.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Pdf2PptxError {
    /// `true` when the failure left an image directory worth inspecting.
    ///
    /// Only errors raised after the directory was created qualify; the
    /// pre-existing directory case belongs to an earlier run.
    pub fn leaves_image_dir(&self) -> bool {
        matches!(
            self,
            Pdf2PptxError::CorruptPdf { .. }
                | Pdf2PptxError::PasswordRequired { .. }
                | Pdf2PptxError::WrongPassword { .. }
                | Pdf2PptxError::EmptyDocument { .. }
                | Pdf2PptxError::RasterisationFailed { .. }
                | Pdf2PptxError::ImageWriteFailed { .. }
                | Pdf2PptxError::ImageDirReadFailed { .. }
                | Pdf2PptxError::ImageReadFailed { .. }
                | Pdf2PptxError::PresentationWriteFailed { .. }
                | Pdf2PptxError::CleanupFailed { .. }
        )
    }
}

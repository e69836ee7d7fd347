//! # pdf2pptx
//!
//! Turn a landscape PDF, typically a slide deck exported to PDF, into an
//! editable PowerPoint file: every page becomes one slide holding a
//! full-bleed picture of that page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck.pdf
//!  │
//!  ├─ 1. Input      check the path and the %PDF magic
//!  ├─ 2. Rasterize  render each page via pdfium at 400 DPI → images/deck_NN.jpeg
//!  ├─ 3. Assemble   one blank slide per image, picture stretched to the slide
//!  ├─ 4. Save       deck.pptx next to the PDF
//!  └─ 5. Clean up   remove images/ (kept when anything failed)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pptx::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert("deck.pdf", &config)?;
//!     println!("{} slides → {}", report.slide_count, report.output.display());
//!     Ok(())
//! }
//! ```
//!
//! The image directory `images/` next to the PDF must not exist when a run
//! starts; a leftover from a failed run is reported as
//! [`Pdf2PptxError::ImageDirExists`] rather than overwritten.
//!
//! ## Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cli`      | on      | Enables the `pdf2pptx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `download` | on      | Lets the pdfium locator fetch the library into its cache on first run |
//!
//! Library-only use:
//! ```toml
//! pdf2pptx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod pptx;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_IMAGE_DIR_NAME};
pub use convert::{convert, convert_with_backend, derive_output_path, preflight};
pub use error::Pdf2PptxError;
pub use output::ConversionReport;
pub use pdfium_locator::LibrarySource;
pub use pipeline::assemble::assemble;
pub use pipeline::rasterize::{rasterize, RasterizedPages};
pub use pipeline::render::{PageSink, PdfiumBackend, RenderBackend, RenderedPage};
pub use pptx::{Presentation, SlideSize};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};

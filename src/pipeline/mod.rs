//! Pipeline stages for PDF-to-PowerPoint conversion.
//!
//! Each submodule implements exactly one step, and the rendering backend
//! sits behind a trait so the stages can be driven without pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ rasterize ──▶ assemble
//! (path)    (pdfium)   (JPEG)     (images/)     (.pptx)
//! ```
//!
//! 1. [`input`]     validates the user-supplied path before any side effect
//! 2. [`render`]    turns each PDF page into a bitmap at the configured DPI
//! 3. [`encode`]    writes one bitmap as a JPEG file
//! 4. [`rasterize`] owns the image directory: creates it, names the pages
//! 5. [`assemble`]  lists the directory and builds one slide per image

pub mod assemble;
pub mod encode;
pub mod input;
pub mod rasterize;
pub mod render;

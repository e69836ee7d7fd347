//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline renders pages and builds slides. The pipeline is
//! sequential, so events arrive in order: rasterize start, one
//! `on_page_rendered` per page, assemble start, one `on_slide_added` per
//! slide, saved, complete.
//!
//! # Example
//!
//! ```rust
//! use pdf2pptx::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_rendered(&self, page_num: usize, total_pages: usize, _image: &std::path::Path) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} rendered", page_num, total_pages);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { rendered: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionReport;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the PDF is open and its page count is known.
    fn on_rasterize_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page image has been written.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages in the document
    /// * `image_path`: the JPEG just written
    fn on_page_rendered(&self, page_num: usize, total_pages: usize, image_path: &Path) {
        let _ = (page_num, total_pages, image_path);
    }

    /// Called once the image directory has been listed.
    fn on_assemble_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called after each slide is added (1-indexed).
    fn on_slide_added(&self, slide_num: usize, total_slides: usize) {
        let _ = (slide_num, total_slides);
    }

    /// Called once the presentation has been written, before cleanup.
    fn on_presentation_saved(&self, output_path: &Path) {
        let _ = output_path;
    }

    /// Called once after a successful run, after cleanup.
    fn on_conversion_complete(&self, report: &ConversionReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl RecordingCallback {
        fn push(&self, e: String) {
            self.events.lock().unwrap().push(e);
        }
    }

    impl ConversionProgressCallback for RecordingCallback {
        fn on_rasterize_start(&self, total_pages: usize) {
            self.push(format!("start {total_pages}"));
        }

        fn on_page_rendered(&self, page_num: usize, total_pages: usize, _image_path: &Path) {
            self.push(format!("page {page_num}/{total_pages}"));
        }

        fn on_slide_added(&self, slide_num: usize, total_slides: usize) {
            self.push(format!("slide {slide_num}/{total_slides}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_rasterize_start(2);
        cb.on_page_rendered(1, 2, Path::new("images/deck_01.jpeg"));
        cb.on_assemble_start(2);
        cb.on_slide_added(1, 2);
        cb.on_presentation_saved(Path::new("deck.pptx"));
    }

    #[test]
    fn overridden_methods_receive_events() {
        let cb = RecordingCallback::default();
        cb.on_rasterize_start(2);
        cb.on_page_rendered(1, 2, Path::new("a"));
        cb.on_page_rendered(2, 2, Path::new("b"));
        cb.on_assemble_start(2);
        cb.on_slide_added(1, 2);

        let events = cb.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start 2", "page 1/2", "page 2/2", "slide 1/2"]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_rasterize_start(10);
        cb.on_slide_added(1, 10);
    }
}

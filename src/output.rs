//! Result types returned by a successful conversion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// The PDF that was converted.
    pub input: PathBuf,
    /// The presentation that was written.
    pub output: PathBuf,
    /// The intermediate image directory.
    pub image_dir: PathBuf,
    /// Pages rendered from the PDF.
    pub page_count: usize,
    /// Slides written to the presentation.
    pub slide_count: usize,
    /// Whether `image_dir` was deleted after saving.
    pub images_removed: bool,
    /// Time spent rendering and writing page images.
    pub render_duration_ms: u64,
    /// Time spent building and saving the presentation.
    pub assemble_duration_ms: u64,
    /// Wall-clock time of the whole run.
    pub total_duration_ms: u64,
}

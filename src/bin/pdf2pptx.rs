//! CLI binary for pdf2pptx.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, prints the outcome and sets the exit status.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2pptx::{
    convert_with_backend, preflight, ConversionConfig, ConversionProgressCallback, ConversionReport,
    LibrarySource, PdfiumBackend, Pdf2PptxError, ProgressCallback, SlideSize,
};
use std::cell::OnceCell;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Printed after the error message whenever a run fails.
const FAILURE_SUMMARY: &str = "Failed to convert to PowerPoint file.";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

/// Colour only for a terminal, and never with `NO_COLOR` set.
fn colour_for(stream: &impl IsTerminal) -> bool {
    stream.is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint(code: &str, s: &str, on: bool) -> String {
    if on {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}
fn green(s: &str, on: bool) -> String {
    paint("32", s, on)
}
fn red(s: &str, on: bool) -> String {
    paint("31", s, on)
}
fn dim(s: &str, on: bool) -> String {
    paint("2", s, on)
}
fn bold(s: &str, on: bool) -> String {
    paint("1", s, on)
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Prints the success line once the presentation is saved and, when
/// enabled, drives a progress bar through the render and slide stages.
struct CliProgressCallback {
    bar: Option<ProgressBar>,
    /// Where the success line goes: stderr when stdout carries JSON.
    success_to_stderr: bool,
    quiet: bool,
}

impl CliProgressCallback {
    fn new(show_progress: bool, success_to_stderr: bool, quiet: bool) -> Arc<Self> {
        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(0);
            let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS);
            bar.set_style(spinner_style);
            bar.set_prefix("Preparing");
            bar.set_message("Opening PDF…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });

        Arc::new(Self {
            bar,
            success_to_stderr,
            quiet,
        })
    }

    /// Switch to a counting bar for a stage of `total` `unit`s.
    fn activate_bar(&self, prefix: &'static str, unit: &str, total: usize) {
        let Some(ref bar) = self.bar else { return };
        let template = format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}"
        );
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);

        bar.set_position(0);
        bar.set_length(total as u64);
        bar.set_style(style);
        bar.set_prefix(prefix);
        bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_rasterize_start(&self, total_pages: usize) {
        self.activate_bar("Rendering", "pages", total_pages);
    }

    fn on_page_rendered(&self, _page_num: usize, _total: usize, image_path: &Path) {
        if let Some(ref bar) = self.bar {
            if let Some(name) = image_path.file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }
            bar.inc(1);
        }
    }

    fn on_assemble_start(&self, total_images: usize) {
        self.activate_bar("Building", "slides", total_images);
    }

    fn on_slide_added(&self, _slide_num: usize, _total: usize) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn on_presentation_saved(&self, output_path: &Path) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        if self.quiet {
            return;
        }
        let colour = if self.success_to_stderr {
            colour_for(&io::stderr())
        } else {
            colour_for(&io::stdout())
        };
        let line = format!(
            "{} PowerPoint file has been created: {}",
            green("✔", colour),
            bold(&output_path.display().to_string(), colour)
        );
        if self.success_to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # deck.pdf → deck.pptx (same directory)
  pdf2pptx deck.pdf

  # Widescreen slides, lower resolution, explicit output
  pdf2pptx --slide-size 16:9 --dpi 200 deck.pdf -o slides/deck.pptx

  # Keep the rendered page images next to the PDF
  pdf2pptx --keep-images deck.pdf

  # JSON report on stdout
  pdf2pptx --json deck.pdf > report.json

WORKING FILES:
  Pages are rendered into an `images/` directory next to the PDF, which is
  removed once the presentation is saved. If `images/` already exists the
  run stops without touching it; delete or rename it first. A failed run
  leaves the directory behind for inspection.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium (file or directory)
  PDFIUM_CACHE_DIR        Override the pdfium cache directory
  RUST_LOG                Override the log filter (e.g. pdf2pptx=debug)

PDFIUM:
  The library is looked for in --pdfium-lib, PDFIUM_LIB_PATH, next to the
  executable, in the cache and on the system library path. If none is found
  it is downloaded once (~30 MB) into the cache, unless --no-download.
"#;

/// Convert a landscape PDF into a PowerPoint file, one page per slide.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pptx",
    version,
    about = "Convert a PDF deck into a PowerPoint file, one full-slide page image per slide",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Write the presentation here instead of <pdf-dir>/<pdf-stem>.pptx.
    #[arg(short, long, env = "PDF2PPTX_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI (72–1200).
    #[arg(long, env = "PDF2PPTX_DPI", default_value_t = 400,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// JPEG quality of the page images (1–100).
    #[arg(long, env = "PDF2PPTX_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Slide size: 4:3 (10 × 7.5 in) or 16:9 (13.333 × 7.5 in).
    #[arg(long, env = "PDF2PPTX_SLIDE_SIZE", default_value = "4:3")]
    slide_size: SlideSize,

    /// Keep the rendered page images after a successful run.
    #[arg(long, env = "PDF2PPTX_KEEP_IMAGES")]
    keep_images: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PPTX_PASSWORD")]
    password: Option<String>,

    /// PDFium shared library, or a directory containing it.
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Never download PDFium; fail if no local copy is found.
    #[arg(long, env = "PDF2PPTX_NO_DOWNLOAD")]
    no_download: bool,

    /// Print the conversion report as JSON on stdout.
    #[arg(long, env = "PDF2PPTX_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PPTX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PPTX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PPTX_QUIET")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let pipeline_err = e.downcast_ref::<Pdf2PptxError>();
            let msg = match pipeline_err {
                Some(err) => err.to_string(),
                None => format!("{e:#}"),
            };
            let colour = colour_for(&io::stderr());
            eprintln!("{}", red(&msg, colour));
            eprintln!("{FAILURE_SUMMARY}");

            if !cli.quiet && pipeline_err.is_some_and(Pdf2PptxError::leaves_image_dir) {
                let image_dir = ConversionConfig::default().image_dir_for(&cli.input);
                let hint = format!(
                    "Page images were left in {} for inspection; remove it before retrying.",
                    image_dir.display()
                );
                eprintln!("{}", dim(&hint, colour));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let callback: ProgressCallback = CliProgressCallback::new(show_progress, cli.json, cli.quiet);
    let config = build_config(cli, callback)?;

    // ── Bind PDFium ──────────────────────────────────────────────────────
    // Path problems and a leftover image directory surface before the
    // library lookup, which may download.
    preflight(&cli.input, &config)?;
    let backend = bind_backend(&config, cli.quiet)?;
    if cli.verbose {
        eprintln!("{}", engine_line(backend.library_source()));
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_with_backend(&cli.input, &backend, &config)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        print_summary(&report);
    }

    Ok(())
}

/// Bind pdfium, showing a byte-count bar if it has to be downloaded.
fn bind_backend(config: &ConversionConfig, quiet: bool) -> Result<PdfiumBackend, Pdf2PptxError> {
    if quiet {
        return PdfiumBackend::new(config);
    }

    let dl_bar: OnceCell<ProgressBar> = OnceCell::new();
    let on_progress = |downloaded: u64, total: Option<u64>| {
        let bar = dl_bar.get_or_init(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  \
                     [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ")
                .tick_strings(TICKS),
            );
            bar.set_prefix("PDF engine");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        if let Some(t) = total {
            if bar.length().unwrap_or(0) != t {
                bar.set_length(t);
            }
        }
        bar.set_position(downloaded);
    };

    let backend = PdfiumBackend::with_download_progress(config, Some(&on_progress));
    if let Some(bar) = dl_bar.get() {
        bar.finish_and_clear();
    }
    backend
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: ProgressCallback) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality)
        .slide_size(cli.slide_size)
        .keep_images(cli.keep_images)
        .allow_pdfium_download(!cli.no_download)
        .progress_callback(progress);

    if let Some(ref output) = cli.output {
        builder = builder.output_path(output.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib.clone());
    }

    builder.build().context("Invalid configuration")
}

fn engine_line(source: LibrarySource) -> String {
    format!("   PDF engine: pdfium ({source})")
}

fn print_summary(report: &ConversionReport) {
    let timings = format!(
        "render {}ms, assemble {}ms, total {}ms",
        report.render_duration_ms, report.assemble_duration_ms, report.total_duration_ms
    );
    eprintln!(
        "   {} pages → {} slides  {}",
        report.page_count,
        report.slide_count,
        dim(&timings, colour_for(&io::stderr())),
    );
    if !report.images_removed {
        eprintln!("   images kept in {}", report.image_dir.display());
    }
}

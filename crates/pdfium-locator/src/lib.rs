//! # pdfium-locator
//!
//! Find a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! for `pdfium-render` without touching process-wide search paths such as
//! `PATH` or `LD_LIBRARY_PATH`.
//!
//! ## Search order
//!
//! [`PdfiumLocator::bind`] tries each source in turn and binds the first one
//! that exists:
//!
//! 1. **Explicit**: a file or directory handed to
//!    [`PdfiumLocator::with_library`]. A missing explicit path is an error,
//!    never silently skipped.
//! 2. **Environment**: `PDFIUM_LIB_PATH` (file or directory).
//! 3. **Executable directory**: next to the running binary, then its `lib/`
//!    and `pdfium/lib/` subdirectories.
//! 4. **Cache**: `~/.cache/pdf2pptx/pdfium-{VERSION}/` (override with
//!    `PDFIUM_CACHE_DIR`).
//! 5. **System**: whatever the platform loader resolves for the bare library
//!    name.
//! 6. **Download** (feature `download`, on by default): fetch the release
//!    archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//!    into the cache, then bind it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locator::PdfiumLocator;
//!
//! let (pdfium, source) = PdfiumLocator::from_env()
//!     .with_library("/opt/pdfium/lib")
//!     .bind(None)
//!     .expect("PDFium unavailable");
//! println!("bound pdfium from {source}");
//! # drop(pdfium);
//! ```
//!
//! ## Platform support
//!
//! | OS      | Arch    | Library               |
//! |---------|---------|-----------------------|
//! | macOS   | arm64   | `libpdfium.dylib`     |
//! | macOS   | x86_64  | `libpdfium.dylib`     |
//! | Linux   | x86_64  | `libpdfium.so`        |
//! | Linux   | aarch64 | `libpdfium.so`        |
//! | Windows | x86_64  | `pdfium.dll`          |
//! | Windows | aarch64 | `pdfium.dll`          |
//! | Windows | x86     | `pdfium.dll`          |

use std::fmt;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

// ── Public constants ─────────────────────────────────────────────────────────

/// The pdfium-binaries release tag used for cache directories and downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an existing pdfium library (file or directory).
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "PDFIUM_CACHE_DIR";

#[cfg(feature = "download")]
const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or binding PDFium.
#[derive(Error, Debug)]
pub enum LocatorError {
    /// The current OS/architecture combination is not supported.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// An explicitly configured library path does not exist.
    #[error("PDFium library not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Every candidate was missing and downloading is disabled.
    #[error("No PDFium library found; searched: {}", display_paths(.searched))]
    Unavailable { searched: Vec<PathBuf> },

    /// Could not create the local cache directory.
    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(nothing)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Sources ──────────────────────────────────────────────────────────────────

/// Where a bound library came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource {
    Explicit,
    Environment,
    ExecutableDir,
    Cache,
    System,
    Downloaded,
}

impl fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LibrarySource::Explicit => "explicit path",
            LibrarySource::Environment => LIB_PATH_ENV,
            LibrarySource::ExecutableDir => "executable directory",
            LibrarySource::Cache => "cache",
            LibrarySource::System => "system library",
            LibrarySource::Downloaded => "download",
        };
        f.write_str(s)
    }
}

/// A library file that may be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: LibrarySource,
    pub path: PathBuf,
}

// ── Platform metadata ────────────────────────────────────────────────────────

struct PlatformInfo {
    /// Asset filename in the GitHub release, e.g. `pdfium-mac-arm64.tgz`.
    #[cfg_attr(not(feature = "download"), allow(dead_code))]
    archive_name: &'static str,
    /// Relative path inside the archive, e.g. `lib/libpdfium.dylib`.
    #[cfg_attr(not(feature = "download"), allow(dead_code))]
    lib_path_in_archive: &'static str,
    /// Filename on disk, e.g. `libpdfium.dylib`.
    lib_name: &'static str,
}

fn platform_info(os: &str, arch: &str) -> Result<PlatformInfo, LocatorError> {
    let (archive_name, lib_path_in_archive, lib_name) = match (os, arch) {
        ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", "lib/libpdfium.dylib", "libpdfium.dylib"),
        ("macos", "x86_64") => ("pdfium-mac-x64.tgz", "lib/libpdfium.dylib", "libpdfium.dylib"),
        ("linux", "x86_64") => ("pdfium-linux-x64.tgz", "lib/libpdfium.so", "libpdfium.so"),
        ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", "lib/libpdfium.so", "libpdfium.so"),
        ("windows", "x86_64") => ("pdfium-win-x64.tgz", "bin/pdfium.dll", "pdfium.dll"),
        ("windows", "aarch64") => ("pdfium-win-arm64.tgz", "bin/pdfium.dll", "pdfium.dll"),
        ("windows", "x86") => ("pdfium-win-x86.tgz", "bin/pdfium.dll", "pdfium.dll"),
        (os, arch) => {
            return Err(LocatorError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };
    Ok(PlatformInfo {
        archive_name,
        lib_path_in_archive,
        lib_name,
    })
}

fn current_platform() -> Result<PlatformInfo, LocatorError> {
    platform_info(std::env::consts::OS, std::env::consts::ARCH)
}

/// The platform file name of the pdfium library (`libpdfium.so`, …).
pub fn library_file_name() -> Result<&'static str, LocatorError> {
    current_platform().map(|p| p.lib_name)
}

/// Returns the per-version cache directory.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdf2pptx/pdfium-{VERSION}/`
/// - **Linux**: `~/.cache/pdf2pptx/pdfium-{VERSION}/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2pptx\pdfium-{VERSION}\`
///
/// `PDFIUM_CACHE_DIR` replaces the `…/pdf2pptx` root.
pub fn default_cache_dir() -> PathBuf {
    let root = match std::env::var_os(CACHE_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join("pdf2pptx"),
    };
    root.join(format!("pdfium-{PDFIUM_VERSION}"))
}

/// A configured path may name the library itself or the directory holding it.
fn library_in(path: &Path, lib_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(lib_name)
    } else {
        path.to_path_buf()
    }
}

fn executable_search_dirs() -> Vec<PathBuf> {
    let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    else {
        return Vec::new();
    };
    vec![dir.clone(), dir.join("lib"), dir.join("pdfium").join("lib")]
}

// ── Locator ──────────────────────────────────────────────────────────────────

/// Resolves and binds a PDFium library.
#[derive(Debug, Clone)]
pub struct PdfiumLocator {
    explicit: Option<PathBuf>,
    env_path: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    cache_dir: PathBuf,
    allow_system: bool,
    allow_download: bool,
}

impl Default for PdfiumLocator {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PdfiumLocator {
    /// A locator reading `PDFIUM_LIB_PATH` and `PDFIUM_CACHE_DIR`, searching
    /// the executable's directory, with system lookup and download enabled.
    pub fn from_env() -> Self {
        Self {
            explicit: None,
            env_path: std::env::var_os(LIB_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            search_dirs: executable_search_dirs(),
            cache_dir: default_cache_dir(),
            allow_system: true,
            allow_download: cfg!(feature = "download"),
        }
    }

    /// A locator that only looks where it is told to.
    pub fn isolated(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit: None,
            env_path: None,
            search_dirs: Vec::new(),
            cache_dir: cache_dir.into(),
            allow_system: false,
            allow_download: false,
        }
    }

    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn allow_system(mut self, allow: bool) -> Self {
        self.allow_system = allow;
        self
    }

    /// Has no effect unless the `download` feature is compiled in.
    pub fn allow_download(mut self, allow: bool) -> Self {
        self.allow_download = allow && cfg!(feature = "download");
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// File candidates in search order, whether or not they exist.
    pub fn candidates(&self) -> Result<Vec<Candidate>, LocatorError> {
        let lib_name = library_file_name()?;
        let mut out = Vec::new();

        if let Some(ref p) = self.explicit {
            out.push(Candidate {
                source: LibrarySource::Explicit,
                path: library_in(p, lib_name),
            });
        }
        if let Some(ref p) = self.env_path {
            out.push(Candidate {
                source: LibrarySource::Environment,
                path: library_in(p, lib_name),
            });
        }
        for dir in &self.search_dirs {
            out.push(Candidate {
                source: LibrarySource::ExecutableDir,
                path: dir.join(lib_name),
            });
        }
        out.push(Candidate {
            source: LibrarySource::Cache,
            path: self.cache_dir.join(lib_name),
        });
        Ok(out)
    }

    /// First existing file candidate, if any.
    ///
    /// An explicit path that does not exist is reported as
    /// [`LocatorError::NotFound`] instead of falling through.
    pub fn find(&self) -> Result<Option<Candidate>, LocatorError> {
        for candidate in self.candidates()? {
            if candidate.path.is_file() {
                debug!(
                    "PDFium candidate found ({}): {}",
                    candidate.source,
                    candidate.path.display()
                );
                return Ok(Some(candidate));
            }
            match candidate.source {
                LibrarySource::Explicit => {
                    return Err(LocatorError::NotFound {
                        path: candidate.path,
                    })
                }
                LibrarySource::Environment => warn!(
                    "{LIB_PATH_ENV} '{}' not found; continuing search",
                    candidate.path.display()
                ),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Binds PDFium from the first available source.
    ///
    /// `on_progress` receives `(bytes_downloaded, total_bytes)` if a download
    /// is needed.
    pub fn bind(
        &self,
        on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<(Pdfium, LibrarySource), LocatorError> {
        if let Some(candidate) = self.find()? {
            let pdfium = bind_pdfium_from_path(&candidate.path)?;
            info!(
                "Bound PDFium ({}): {}",
                candidate.source,
                candidate.path.display()
            );
            return Ok((pdfium, candidate.source));
        }

        if self.allow_system {
            match Pdfium::bind_to_system_library() {
                Ok(bindings) => {
                    info!("Bound PDFium from the system library path");
                    return Ok((Pdfium::new(bindings), LibrarySource::System));
                }
                Err(e) => debug!("System PDFium unavailable: {e}"),
            }
        }

        if self.allow_download {
            let path = self.download(on_progress)?;
            let pdfium = bind_pdfium_from_path(&path)?;
            info!("Bound downloaded PDFium: {}", path.display());
            return Ok((pdfium, LibrarySource::Downloaded));
        }

        let searched = self
            .candidates()?
            .into_iter()
            .map(|c| c.path)
            .collect();
        Err(LocatorError::Unavailable { searched })
    }

    #[cfg(feature = "download")]
    fn download(
        &self,
        on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<PathBuf, LocatorError> {
        let info = current_platform()?;
        let lib_path = self.cache_dir.join(info.lib_name);
        let url = format!(
            "{}/chromium%2F{}/{}",
            BASE_URL, PDFIUM_VERSION, info.archive_name
        );
        info!("Downloading PDFium from {url}");

        std::fs::create_dir_all(&self.cache_dir).map_err(LocatorError::CacheDir)?;
        let archive = fetch::download_bytes(&url, on_progress)?;
        fetch::extract_library(&archive, info.lib_path_in_archive, &lib_path)?;
        Ok(lib_path)
    }

    #[cfg(not(feature = "download"))]
    fn download(
        &self,
        _on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<PathBuf, LocatorError> {
        Err(LocatorError::Download(
            "built without the `download` feature".to_string(),
        ))
    }
}

/// Binds to a PDFium library at an explicit file `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, LocatorError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| LocatorError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Download ─────────────────────────────────────────────────────────────────

#[cfg(feature = "download")]
mod fetch {
    use super::LocatorError;
    use std::io::Read;
    use std::path::Path;

    /// Streams a URL into memory, reporting progress every 64 KiB chunk.
    pub(super) fn download_bytes(
        url: &str,
        on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<Vec<u8>, LocatorError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("pdfium-locator/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| LocatorError::Download(e.to_string()))?;

        let mut response = client
            .get(url)
            .send()
            .map_err(|e| LocatorError::Download(format!("GET {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(LocatorError::Download(format!(
                "HTTP {} for {url}",
                response.status()
            )));
        }

        let total = response.content_length();
        let mut buf = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0u8; 64 * 1024];
        let mut downloaded: u64 = 0;

        loop {
            match response.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    downloaded += n as u64;
                    if let Some(cb) = on_progress {
                        cb(downloaded, total);
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LocatorError::Download(format!("Read error: {e}"))),
            }
        }

        Ok(buf)
    }

    /// Unpacks the single entry `lib_path_in_archive` of a `.tgz` to `dest`.
    pub(super) fn extract_library(
        archive_bytes: &[u8],
        lib_path_in_archive: &str,
        dest: &Path,
    ) -> Result<(), LocatorError> {
        use flate2::read::GzDecoder;
        use tar::Archive;

        let mut archive = Archive::new(GzDecoder::new(archive_bytes));
        let entries = archive
            .entries()
            .map_err(|e| LocatorError::Extract(e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| LocatorError::Extract(e.to_string()))?;
            let matches = entry
                .path()
                .map_err(|e| LocatorError::Extract(e.to_string()))?
                .to_string_lossy()
                .trim_start_matches("./")
                == lib_path_in_archive;
            if matches {
                entry
                    .unpack(dest)
                    .map_err(|e| LocatorError::Extract(format!("Unpack failed: {e}")))?;
                return Ok(());
            }
        }

        Err(LocatorError::Extract(format!(
            "'{lib_path_in_archive}' not found in archive"
        )))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use flate2::write::GzEncoder;
        use flate2::Compression;

        fn tgz_with(path: &str, body: &[u8]) -> Vec<u8> {
            let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, body).unwrap();
            builder.into_inner().unwrap().finish().unwrap()
        }

        #[test]
        fn extracts_named_entry() {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("libpdfium.so");
            let archive = tgz_with("lib/libpdfium.so", b"ELF");
            extract_library(&archive, "lib/libpdfium.so", &dest).unwrap();
            assert_eq!(std::fs::read(&dest).unwrap(), b"ELF");
        }

        #[test]
        fn missing_entry_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let archive = tgz_with("include/fpdfview.h", b"//");
            let err = extract_library(&archive, "lib/libpdfium.so", &dir.path().join("x"))
                .unwrap_err();
            assert!(matches!(err, LocatorError::Extract(_)));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Input resolution: check the user-supplied path before anything is created.
//!
//! pdfium reports a missing or non-PDF file as a generic load failure, and by
//! then the image directory already exists. Checking existence, readability
//! and the `%PDF` magic bytes up front keeps those runs free of side effects.

use crate::error::Pdf2PptxError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Validate `path` as a readable PDF file and return it unchanged.
pub fn resolve_input(path: &Path) -> Result<PathBuf, Pdf2PptxError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(Pdf2PptxError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2PptxError::PermissionDenied { path });
        }
        Err(_) => return Err(Pdf2PptxError::FileNotFound { path }),
    };

    // A file shorter than the magic is not a PDF either.
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(Pdf2PptxError::Io { path, source }),
        }
    }
    if &magic != PDF_MAGIC {
        return Err(Pdf2PptxError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        std::fs::write(&pdf, b"%PDF-1.7\n%%EOF\n").unwrap();
        assert_eq!(resolve_input(&pdf).unwrap(), pdf);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(&dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path()).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("deck.pdf");
        std::fs::write(&png, b"\x89PNG\r\n").unwrap();
        match resolve_input(&png).unwrap_err() {
            Pdf2PptxError::NotAPdf { magic, .. } => assert_eq!(&magic, b"\x89PNG"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tiny = dir.path().join("deck.pdf");
        std::fs::write(&tiny, b"%P").unwrap();
        assert!(matches!(
            resolve_input(&tiny).unwrap_err(),
            Pdf2PptxError::NotAPdf { .. }
        ));
    }
}

//! Input validation: check the user-supplied PDF path before pdfium sees it.
//!
//! pdfium reacts to a non-PDF file with an opaque load error, so we check
//! the `%PDF` magic bytes up front and hand callers a meaningful error
//! instead. Read permission is probed by actually opening the file — the
//! only check that is race-free and portable.

use crate::error::PrepError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path: existence, readability, and magic bytes.
pub fn resolve_pdf(path: impl AsRef<Path>) -> Result<PathBuf, PrepError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(PrepError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PrepError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PrepError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PrepError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_pdf("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, PrepError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"PK\x03\x04 definitely a zip")
            .unwrap();

        let err = resolve_pdf(&path).unwrap_err();
        match err {
            PrepError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.7\n%fake body")
            .unwrap();

        let resolved = resolve_pdf(&path).unwrap();
        assert_eq!(resolved, path);
    }
}

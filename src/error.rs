//! Error types for the pdf2pages library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PrepError`] — **Fatal**: the run cannot proceed at all (bad input
//!   file, wrong password, unwritable output directory). Returned as
//!   `Err(PrepError)` from the top-level `process*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed (render glitch,
//!   oversized margins, a write error) but all other pages are fine. Stored
//!   inside [`crate::output::PageOutcome`] so callers can inspect partial
//!   success rather than losing the whole batch to one bad page.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first page failure, log and continue, or collect all errors for a
//! post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2pages library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PrepError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Every selected page failed; no output was produced.
    #[error("All {total} pages failed.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or clear an output directory.
    #[error("Failed to prepare output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium or set PDFIUM_LIB_PATH=/path/to/libpdfium."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::output::PageOutcome`] when a page fails.
/// The overall run continues unless ALL pages fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The rendered bitmap used a pixel format the pipeline cannot handle.
    #[error("Page {page}: unsupported pixel format: {detail}")]
    UnsupportedPixelFormat { page: usize, detail: String },

    /// The configured margins would consume the entire page.
    #[error(
        "Page {page}: margins ({top}+{bottom} × {left}+{right}) exceed the \
         {width}×{height} render"
    )]
    MarginsTooLarge {
        page: usize,
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
        width: u32,
        height: u32,
    },

    /// Writing an output image failed.
    #[error("Page {page}: failed to write '{path}': {detail}")]
    WriteFailed {
        page: usize,
        path: PathBuf,
        detail: String,
    },
}

impl PageError {
    /// 1-indexed page the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::UnsupportedPixelFormat { page, .. }
            | PageError::MarginsTooLarge { page, .. }
            | PageError::WriteFailed { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_pages_failed_display() {
        let e = PrepError::AllPagesFailed {
            total: 10,
            first_error: "render glitch".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("10"), "got: {msg}");
        assert!(msg.contains("render glitch"));
    }

    #[test]
    fn page_out_of_range_display() {
        let e = PrepError::PageOutOfRange { page: 12, total: 8 };
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("8 pages"));
    }

    #[test]
    fn margins_too_large_display_and_page() {
        let e = PageError::MarginsTooLarge {
            page: 3,
            top: 280,
            bottom: 140,
            left: 0,
            right: 0,
            width: 300,
            height: 400,
        };
        assert_eq!(e.page(), 3);
        assert!(e.to_string().contains("300×400"));
    }

    #[test]
    fn write_failed_display() {
        let e = PageError::WriteFailed {
            page: 7,
            path: PathBuf::from("/out/cropped/page-007.png"),
            detail: "disk full".into(),
        };
        assert!(e.to_string().contains("page-007.png"));
        assert!(e.to_string().contains("disk full"));
    }
}

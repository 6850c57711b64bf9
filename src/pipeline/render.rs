//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! ## Why a blocking context?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. Everything here is synchronous and expected to run inside
//! `tokio::task::spawn_blocking` — see [`crate::run`].
//!
//! ## Why render one page at a time?
//!
//! A 600-page manuscript at zoom 2.0 would hold gigabytes of pixels if
//! rendered up front. The run loop renders, segments, and writes each page
//! before touching the next, so peak memory stays at one page regardless of
//! document length.

use crate::error::{PageError, PrepError};
use crate::output::{DocumentMetadata, TextSample};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Bind to a pdfium library.
///
/// `PDFIUM_LIB_PATH` takes precedence and may name either the library file
/// or a directory containing it; an override that fails to bind is an
/// error, not a fallthrough, so a typo'd path never silently picks up a
/// different pdfium. Without it, the search is: next to the executable,
/// then system-wide.
pub fn bind_pdfium() -> Result<Pdfium, PrepError> {
    if let Ok(custom) = std::env::var("PDFIUM_LIB_PATH") {
        let lib = if Path::new(&custom).is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&format!("{custom}/"))
        } else {
            std::path::PathBuf::from(custom)
        };
        return Pdfium::bind_to_library(&lib)
            .map(Pdfium::new)
            .map_err(|e| {
                PrepError::PdfiumBindingFailed(format!("PDFIUM_LIB_PATH={}: {e:?}", lib.display()))
            });
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| PrepError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Open a PDF document, mapping pdfium's opaque load errors to typed ones.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PrepError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                PrepError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                PrepError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            PrepError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Rasterise one page at the given zoom factor.
///
/// Zoom multiplies the page's native point dimensions: a 612 × 792 pt page
/// at zoom 2.0 becomes a 1224 × 1584 px image. The alpha channel is dropped
/// because scans are opaque and PNG-with-alpha doubles nothing but size.
pub fn render_page(
    document: &PdfDocument<'_>,
    idx: usize,
    zoom: f32,
) -> Result<DynamicImage, PageError> {
    let page_num = idx + 1;

    let page = document
        .pages()
        .get(idx as u16)
        .map_err(|e| PageError::RenderFailed {
            page: page_num,
            detail: format!("{:?}", e),
        })?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(zoom);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| PageError::RenderFailed {
            page: page_num,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    match &image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) | DynamicImage::ImageLuma8(_) => {}
        other => {
            return Err(PageError::UnsupportedPixelFormat {
                page: page_num,
                detail: format!("{:?}", other.color()),
            })
        }
    }

    debug!(
        "Rendered page {} → {}x{} px",
        page_num,
        image.width(),
        image.height()
    );

    // Drop alpha: scanned pages are opaque.
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Extract document metadata without rendering any page.
pub fn extract_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

/// Sample the text layer of the given 1-based pages.
///
/// Pages outside the document are silently ignored; a page whose text
/// extraction fails counts as zero characters rather than aborting the
/// sample (the caller is deciding whether the scan is image-only, and an
/// unextractable page supports that conclusion).
pub fn sample_text(
    document: &PdfDocument<'_>,
    sample_pages: &[usize],
    preview_chars: usize,
) -> Vec<TextSample> {
    let total = document.pages().len() as usize;

    sample_pages
        .iter()
        .filter(|&&p| p >= 1 && p <= total)
        .map(|&p| {
            let text = document
                .pages()
                .get((p - 1) as u16)
                .ok()
                .and_then(|page| page.text().ok().map(|t| t.all()))
                .unwrap_or_default();
            let trimmed = text.trim();
            TextSample {
                page_num: p,
                chars: trimmed.chars().count(),
                preview: trimmed.chars().take(preview_chars).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdfium_lib_path_override_is_honoured() {
        // An override pointing at a nonexistent library must fail the bind
        // outright instead of falling back to other search locations.
        std::env::set_var("PDFIUM_LIB_PATH", "/definitely/not/a/pdfium/dir");
        let err = bind_pdfium().err().expect("bad override must fail the bind");
        std::env::remove_var("PDFIUM_LIB_PATH");

        match err {
            PrepError::PdfiumBindingFailed(detail) => {
                assert!(detail.contains("PDFIUM_LIB_PATH"), "got: {detail}");
            }
            other => panic!("expected PdfiumBindingFailed, got: {other}"),
        }
    }
}

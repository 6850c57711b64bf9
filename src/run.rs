//! Top-level entry points: run the full pipeline or inspect a document.
//!
//! ## Why one blocking task for the whole run?
//!
//! pdfium is not async-safe, and the job is a strictly sequential walk:
//! render a page, segment it, write the results, drop the pixels, move on.
//! Hoisting that loop into a single
//! `tokio::task::spawn_blocking` call keeps every pdfium touch on one
//! dedicated thread and bounds peak memory to a single rendered page, no
//! matter how long the manuscript is.

use crate::config::PrepConfig;
use crate::error::{PageError, PrepError};
use crate::output::{InspectOptions, InspectReport, PageOutcome, RunOutput, RunStats};
use crate::pipeline::segment::SegmentSide;
use crate::pipeline::{input, render, segment, write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render, segment, and write every selected page of a PDF.
///
/// Output lands in `out_dir/cropped/` (and `out_dir/rendered/` when
/// `keep_rendered` is set). Pre-existing `page-*.png` files in those
/// directories are removed first so a re-run never mixes with stale output.
///
/// # Errors
/// Returns `Err(PrepError)` only for fatal conditions: unreadable or
/// non-PDF input, a wrong password, unwritable output directories, or
/// every selected page failing. Individual page failures are recorded in
/// the returned [`PageOutcome`]s and the run continues.
pub async fn process(
    input_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &PrepConfig,
) -> Result<RunOutput, PrepError> {
    let total_start = Instant::now();
    let pdf_path = input::resolve_pdf(input_path)?;
    info!("Starting run: {}", pdf_path.display());

    let out_root = out_dir.as_ref().to_path_buf();
    let cropped_dir = out_root.join("cropped");
    let rendered_dir = out_root.join("rendered");

    write::prepare_output_dir(&cropped_dir)?;
    if config.keep_rendered {
        write::prepare_output_dir(&rendered_dir)?;
    }

    let cfg = config.clone();
    let mut output = tokio::task::spawn_blocking(move || {
        process_blocking(&pdf_path, &cropped_dir, &rendered_dir, &cfg)
    })
    .await
    .map_err(|e| PrepError::Internal(format!("Run task panicked: {}", e)))??;

    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Run complete: {}/{} pages, {} images, {}ms total",
        output.stats.processed_pages,
        output.stats.total_pages,
        output.stats.written_images,
        output.stats.total_duration_ms
    );
    Ok(output)
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(
    input_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &PrepConfig,
) -> Result<RunOutput, PrepError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PrepError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process(input_path, out_dir, config))
}

/// Extract document metadata and a text-layer sample without rendering.
///
/// A quick way to confirm a manuscript is image-only (and so worth running
/// through the full pipeline) — see [`InspectReport::is_image_only`].
pub async fn inspect(
    input_path: impl AsRef<Path>,
    options: &InspectOptions,
) -> Result<InspectReport, PrepError> {
    let pdf_path = input::resolve_pdf(input_path)?;
    let opts = options.clone();

    tokio::task::spawn_blocking(move || {
        let pdfium = render::bind_pdfium()?;
        let document = render::open_document(&pdfium, &pdf_path, opts.password.as_deref())?;
        let metadata = render::extract_metadata(&document);
        let samples = render::sample_text(&document, &opts.sample_pages, opts.preview_chars);
        Ok(InspectReport { metadata, samples })
    })
    .await
    .map_err(|e| PrepError::Internal(format!("Inspect task panicked: {}", e)))?
}

// ── Internal ─────────────────────────────────────────────────────────────

/// Error for a selection that matches no page of the document, attributed
/// to the first page the caller asked for.
fn empty_selection_error(
    selection: &crate::config::PageSelection,
    total_pages: usize,
) -> PrepError {
    PrepError::PageOutOfRange {
        page: selection.first_requested().unwrap_or(1),
        total: total_pages,
    }
}

/// The sequential page loop. Runs on a blocking worker thread.
fn process_blocking(
    pdf_path: &Path,
    cropped_dir: &Path,
    rendered_dir: &Path,
    config: &PrepConfig,
) -> Result<RunOutput, PrepError> {
    let pdfium = render::bind_pdfium()?;
    let document = render::open_document(&pdfium, pdf_path, config.password.as_deref())?;

    let metadata = render::extract_metadata(&document);
    let total_pages = metadata.page_count;
    info!("PDF loaded: {} pages", total_pages);

    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(empty_selection_error(&config.pages, total_pages));
    }
    debug!("Selected {} pages", page_indices.len());

    let selected = page_indices.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(selected);
    }

    let segmenter = segment::segmenter_for(config);

    let mut pages: Vec<PageOutcome> = Vec::with_capacity(selected);
    let mut render_duration_ms = 0u64;
    let mut segment_duration_ms = 0u64;

    for &idx in &page_indices {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, selected);
        }

        let render_start = Instant::now();
        let image = match render::render_page(&document, idx, config.zoom) {
            Ok(img) => img,
            Err(e) => {
                warn!("{}", e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, selected, &e.to_string());
                }
                pages.push(PageOutcome {
                    page_num,
                    written: Vec::new(),
                    blank_segments: 0,
                    error: Some(e),
                });
                continue;
            }
        };
        render_duration_ms += render_start.elapsed().as_millis() as u64;

        // Retained renders are diagnostics: a failed save is logged, not fatal.
        if config.keep_rendered {
            if let Err(e) = write::save_page(&image, rendered_dir, page_num, SegmentSide::Full) {
                warn!("could not retain rendered page: {}", e);
            }
        }

        let segment_start = Instant::now();
        let segments = match segmenter.segment(page_num, &image) {
            Ok(s) => s,
            Err(e) => {
                warn!("{}", e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, selected, &e.to_string());
                }
                pages.push(PageOutcome {
                    page_num,
                    written: Vec::new(),
                    blank_segments: 0,
                    error: Some(e),
                });
                continue;
            }
        };
        segment_duration_ms += segment_start.elapsed().as_millis() as u64;
        drop(image);

        let mut written: Vec<PathBuf> = Vec::new();
        let mut blank_segments = 0usize;
        let mut first_error: Option<PageError> = None;

        for seg in segments {
            if seg.blank {
                debug!("page {}: {:?} half is blank, skipped", page_num, seg.side);
                blank_segments += 1;
                continue;
            }
            match write::save_page(&seg.image, cropped_dir, page_num, seg.side) {
                Ok(path) => written.push(path),
                Err(e) => {
                    // Best-effort writes: keep going with remaining segments.
                    warn!("{}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(ref cb) = config.progress_callback {
            match &first_error {
                None => cb.on_page_complete(page_num, selected, written.len(), blank_segments),
                Some(e) => cb.on_page_error(page_num, selected, &e.to_string()),
            }
        }

        pages.push(PageOutcome {
            page_num,
            written,
            blank_segments,
            error: first_error,
        });
    }

    let processed = pages.iter().filter(|p| p.error.is_none()).count();
    let failed = pages.len() - processed;

    if processed == 0 {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(PrepError::AllPagesFailed {
            total: pages.len(),
            first_error,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(selected, processed);
    }

    let stats = RunStats {
        total_pages,
        processed_pages: processed,
        failed_pages: failed,
        blank_segments: pages.iter().map(|p| p.blank_segments).sum(),
        written_images: pages.iter().map(|p| p.written.len()).sum(),
        total_duration_ms: 0, // filled by the async caller
        render_duration_ms,
        segment_duration_ms,
    };

    Ok(RunOutput {
        pages,
        metadata,
        stats,
    })
}

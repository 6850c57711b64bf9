//! Output types: per-page outcomes, run statistics, and inspection reports.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The complete result of one page-preparation run.
///
/// Returned by [`crate::process`] even when some pages failed; check
/// [`RunStats::failed_pages`] for partial failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Per-page outcomes, sorted by page number.
    pub pages: Vec<PageOutcome>,
    /// Document metadata read before rendering.
    pub metadata: DocumentMetadata,
    /// Aggregate counters and timings.
    pub stats: RunStats,
}

/// What happened to a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cropped images written for this page. Empty when the page errored
    /// or every sub-image was blank.
    pub written: Vec<PathBuf>,
    /// Sub-images classified blank and skipped.
    pub blank_segments: usize,
    /// Set when the page was skipped due to a non-fatal error.
    pub error: Option<PageError>,
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages that rendered and segmented without error.
    pub processed_pages: usize,
    /// Pages that hit a non-fatal error and were skipped.
    pub failed_pages: usize,
    /// Blank sub-images skipped across all pages.
    pub blank_segments: usize,
    /// Output images written.
    pub written_images: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
    /// Time spent inside pdfium rasterisation.
    pub render_duration_ms: u64,
    /// Time spent in crop/split/blank analysis.
    pub segment_duration_ms: u64,
}

/// Document metadata extracted from the PDF without rendering pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

// ── Inspection ───────────────────────────────────────────────────────────

/// Options for [`crate::inspect`].
///
/// The default sample pages (1, 2, 3 and 14) mix front matter with a page
/// deep enough into the body to dodge a text-bearing title page on an
/// otherwise image-only scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectOptions {
    /// 1-based pages whose text layer is sampled.
    pub sample_pages: Vec<usize>,
    /// How many characters of extracted text to keep per page.
    pub preview_chars: usize,
    /// PDF user password for encrypted documents.
    pub password: Option<String>,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            sample_pages: vec![1, 2, 3, 14],
            preview_chars: 800,
            password: None,
        }
    }
}

/// Result of [`crate::inspect`]: metadata plus a text-layer sample.
///
/// A manuscript whose sampled pages all report zero characters is
/// image-only and needs the full render/crop pipeline; one with a real
/// text layer may not need rasterisation at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectReport {
    pub metadata: DocumentMetadata,
    /// One entry per sampled page that exists in the document.
    pub samples: Vec<TextSample>,
}

impl InspectReport {
    /// True when no sampled page carried any extractable text.
    pub fn is_image_only(&self) -> bool {
        self.samples.iter().all(|s| s.chars == 0)
    }
}

/// Text-layer sample for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSample {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Characters of text the page's text layer contains.
    pub chars: usize,
    /// The first `preview_chars` characters of that text, trimmed.
    pub preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_defaults() {
        let o = InspectOptions::default();
        assert_eq!(o.sample_pages, vec![1, 2, 3, 14]);
        assert_eq!(o.preview_chars, 800);
    }

    #[test]
    fn image_only_detection() {
        let meta = DocumentMetadata {
            title: None,
            author: None,
            subject: None,
            creator: None,
            producer: None,
            creation_date: None,
            modification_date: None,
            page_count: 2,
            pdf_version: "1.7".into(),
        };
        let report = InspectReport {
            metadata: meta.clone(),
            samples: vec![
                TextSample {
                    page_num: 1,
                    chars: 0,
                    preview: String::new(),
                },
                TextSample {
                    page_num: 2,
                    chars: 0,
                    preview: String::new(),
                },
            ],
        };
        assert!(report.is_image_only());

        let mut with_text = report.clone();
        with_text.samples[1].chars = 42;
        assert!(!with_text.is_image_only());
    }

    #[test]
    fn run_output_json_round_trip() {
        let out = RunOutput {
            pages: vec![PageOutcome {
                page_num: 1,
                written: vec![PathBuf::from("cropped/page-001.png")],
                blank_segments: 0,
                error: None,
            }],
            metadata: DocumentMetadata {
                title: Some("Codex".into()),
                author: None,
                subject: None,
                creator: None,
                producer: None,
                creation_date: None,
                modification_date: None,
                page_count: 1,
                pdf_version: "1.5".into(),
            },
            stats: RunStats {
                total_pages: 1,
                processed_pages: 1,
                ..RunStats::default()
            },
        };
        let json = serde_json::to_string(&out).unwrap();
        let back: RunOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages.len(), 1);
        assert_eq!(back.stats.processed_pages, 1);
    }
}

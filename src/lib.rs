//! # pdf2pages
//!
//! Convert scanned PDF manuscripts into cropped page images ready for
//! transcription.
//!
//! ## Why this crate?
//!
//! Scanned manuscripts arrive as PDFs full of scanner noise: viewer chrome,
//! dark borders, double-page spreads, and the odd completely blank page.
//! Feeding those raw renders to a transcription step wastes effort on pixels
//! that carry no text. This crate rasterises each page and trims it down to
//! the region that actually matters, splitting spreads into their two facing
//! pages and dropping blanks along the way.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the local file (magic bytes, permissions)
//!  ├─ 2. Render   rasterise pages via pdfium at a zoom factor (spawn_blocking)
//!  ├─ 3. Segment  fixed-margin crop  — or —  split spread + content crop
//!  ├─ 4. Classify drop blank sub-images (variance + edge density)
//!  └─ 5. Output   page-001.png / page-001L.png / page-001R.png + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pages::{process, PrepConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PrepConfig::default();
//!     let output = process("manuscript.pdf", "out", &config).await?;
//!     eprintln!(
//!         "{} pages processed, {} blank sub-images skipped",
//!         output.stats.processed_pages, output.stats.blank_segments
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing a strategy
//!
//! | Strategy | When to use |
//! |----------|-------------|
//! | [`SegmentStrategy::Margins`] | The scan has a fixed viewer header/footer; you know the pixel margins |
//! | [`SegmentStrategy::Adaptive`] | Content position varies per page, spreads must be split, blanks skipped |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2pages` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2pages = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    Heuristics, Margins, PageSelection, PrepConfig, PrepConfigBuilder, SegmentStrategy,
};
pub use error::{PageError, PrepError};
pub use output::{
    DocumentMetadata, InspectOptions, InspectReport, PageOutcome, RunOutput, RunStats, TextSample,
};
pub use pipeline::crop::CropBox;
pub use pipeline::segment::{PageSegment, PageSegmenter, SegmentSide};
pub use progress::{NoopProgressCallback, PrepProgressCallback, ProgressCallback};
pub use run::{inspect, process, process_sync};

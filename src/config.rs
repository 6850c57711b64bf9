//! Configuration types for a page-preparation run.
//!
//! All behaviour is controlled through [`PrepConfig`], built via its
//! [`PrepConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across threads, serialise them for logging, and diff two
//! runs to understand why their outputs differ.
//!
//! # Design choice: explicit heuristics struct
//! The crop/split/blank thresholds were historically module-level constants.
//! They live in [`Heuristics`] instead so a caller can tune one scan batch
//! (say, a darker microfilm set) without recompiling, and so every numeric
//! default is documented in exactly one place.

use crate::error::PrepError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for one PDF-to-page-images run.
///
/// Built via [`PrepConfig::builder()`] or using [`PrepConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2pages::{PrepConfig, SegmentStrategy};
///
/// let config = PrepConfig::builder()
///     .zoom(3.0)
///     .strategy(SegmentStrategy::Adaptive)
///     .keep_rendered(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PrepConfig {
    /// Zoom factor applied to each page's native point dimensions when
    /// rasterising. Range: 0.5–8.0. Default: 2.0.
    ///
    /// A PDF page is 612 × 792 points at US Letter; zoom 2.0 yields a
    /// 1224 × 1584 px render, enough for legible manuscript text. Increase
    /// to 3.0–4.0 for small handwriting; anything past 8.0 only inflates
    /// file sizes.
    pub zoom: f32,

    /// Fixed pixel margins removed by the [`SegmentStrategy::Margins`]
    /// strategy. Default: all zero.
    pub margins: Margins,

    /// Which segmentation strategy turns a rendered page into output images.
    /// Default: [`SegmentStrategy::Adaptive`].
    pub strategy: SegmentStrategy,

    /// Thresholds for the adaptive crop/split/blank heuristics.
    pub heuristics: Heuristics,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// Keep the intermediate rendered images in a sibling `rendered/`
    /// directory. Default: false.
    ///
    /// Useful when tuning margins or heuristics: the raw renders let you
    /// diff what the segmenter saw against what it produced.
    pub keep_rendered: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Per-page progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            zoom: 2.0,
            margins: Margins::default(),
            strategy: SegmentStrategy::Adaptive,
            heuristics: Heuristics::default(),
            pages: PageSelection::default(),
            keep_rendered: false,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PrepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepConfig")
            .field("zoom", &self.zoom)
            .field("margins", &self.margins)
            .field("strategy", &self.strategy)
            .field("heuristics", &self.heuristics)
            .field("pages", &self.pages)
            .field("keep_rendered", &self.keep_rendered)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl PrepConfig {
    /// Create a new builder for `PrepConfig`.
    pub fn builder() -> PrepConfigBuilder {
        PrepConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PrepConfig`].
pub struct PrepConfigBuilder {
    config: PrepConfig,
}

impl PrepConfigBuilder {
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.config.zoom = zoom.clamp(0.5, 8.0);
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.config.margins = margins;
        self
    }

    pub fn strategy(mut self, strategy: SegmentStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn heuristics(mut self, heuristics: Heuristics) -> Self {
        self.config.heuristics = heuristics;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn keep_rendered(mut self, v: bool) -> Self {
        self.config.keep_rendered = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PrepConfig, PrepError> {
        let c = &self.config;
        if !(0.5..=8.0).contains(&c.zoom) {
            return Err(PrepError::InvalidConfig(format!(
                "zoom must be 0.5–8.0, got {}",
                c.zoom
            )));
        }
        c.heuristics.validate()?;
        Ok(self.config)
    }
}

// ── Margins ──────────────────────────────────────────────────────────────

/// Fixed pixel margins removed from each edge of a rendered page.
///
/// The historical defaults for trimming a PDF viewer's header and footer
/// are available via [`Margins::viewer_chrome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Margins {
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Margins that remove a typical PDF viewer's header (280 px) and
    /// footer (140 px) from a zoom-2.0 screen capture.
    pub fn viewer_chrome() -> Self {
        Self::new(280, 140, 0, 0)
    }

    /// True when no pixels would be removed.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

// ── Strategy ─────────────────────────────────────────────────────────────

/// How a rendered page becomes one or more output images.
///
/// Two independently useful strategies exist because scan batches differ:
/// screen captures have a *fixed* band of viewer chrome to cut, while book
/// scans need per-page content detection, spread splitting, and blank
/// removal. Both sit behind the [`crate::pipeline::segment::PageSegmenter`]
/// trait so the run loop does not care which is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStrategy {
    /// Remove the configured [`Margins`] from every page. Never splits,
    /// never skips blanks.
    Margins,
    /// Detect content bounds per page, split double-page spreads at the
    /// gutter, and skip blank sub-images. (default)
    #[default]
    Adaptive,
}

// ── Heuristics ───────────────────────────────────────────────────────────

/// Numeric thresholds for the adaptive crop/split/blank heuristics.
///
/// Defaults were tuned on scanned book spreads at zoom 2.0 and are the
/// values the pipeline has always shipped with. They are exposed rather
/// than hard-coded so unusual material (microfilm, photographed pages) can
/// be accommodated without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    /// A grayscale standard deviation below this marks a page blank.
    /// Default: 15.0.
    pub blank_std_dev: f64,

    /// An edge-pixel fraction below this marks a page blank (second,
    /// independent signal). Default: 0.01.
    pub blank_edge_fraction: f64,

    /// Contours smaller than this in either dimension are noise, not
    /// content. Default: 20 px.
    pub min_contour_px: u32,

    /// A contour spanning at least this fraction of BOTH dimensions is a
    /// scan-border artifact, not content. Default: 0.95.
    pub border_fraction: f32,

    /// Padding added around the detected content box. Default: 20 px.
    pub padding_px: u32,

    /// A padded crop box smaller than this in either dimension is rejected
    /// and the full page kept instead. Default: 50 px.
    pub min_crop_px: u32,

    /// Width/height ratio above which a page is treated as a double-page
    /// spread. Default: 1.3.
    pub spread_aspect: f32,

    /// Horizontal band, as fractions of width, searched for the gutter or
    /// binding line. Default: (0.45, 0.55).
    pub gutter_band: (f32, f32),

    /// A column's inverted-intensity sum must exceed `binding_scale` ×
    /// band height to count as a dark binding line. Default: 100.0.
    pub binding_scale: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            blank_std_dev: 15.0,
            blank_edge_fraction: 0.01,
            min_contour_px: 20,
            border_fraction: 0.95,
            padding_px: 20,
            min_crop_px: 50,
            spread_aspect: 1.3,
            gutter_band: (0.45, 0.55),
            binding_scale: 100.0,
        }
    }
}

impl Heuristics {
    pub(crate) fn validate(&self) -> Result<(), PrepError> {
        let (lo, hi) = self.gutter_band;
        if !(0.0 < lo && lo < hi && hi < 1.0) {
            return Err(PrepError::InvalidConfig(format!(
                "gutter_band must satisfy 0 < lo < hi < 1, got ({lo}, {hi})"
            )));
        }
        if self.spread_aspect <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "spread_aspect must be positive, got {}",
                self.spread_aspect
            )));
        }
        if !(0.0..=1.0).contains(&self.border_fraction) {
            return Err(PrepError::InvalidConfig(format!(
                "border_fraction must be 0–1, got {}",
                self.border_fraction
            )));
        }
        Ok(())
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of the PDF to process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Process all pages (default).
    #[default]
    All,
    /// Process a single page (1-indexed).
    Single(usize),
    /// Process a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Process specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// The lowest page number the selection asks for, if it names any.
    ///
    /// Used to attribute an out-of-range error to the page the caller
    /// actually requested.
    pub fn first_requested(&self) -> Option<usize> {
        match self {
            PageSelection::All => None,
            PageSelection::Single(p) => Some(*p),
            PageSelection::Range(start, _) => Some(*start),
            PageSelection::Set(pages) => pages.iter().min().copied(),
        }
    }
}

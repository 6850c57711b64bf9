//! Page segmentation strategies: rendered page → zero or more output images.
//!
//! The two historical "render and crop" flavours — fixed-margin trimming
//! and adaptive split/crop/blank handling — sit behind one trait so the run
//! loop is strategy-agnostic. Segmenters are pure per page: no state is
//! carried between calls, which is what makes the page loop trivially
//! restartable at any page.

use crate::config::{Heuristics, Margins, PrepConfig, SegmentStrategy};
use crate::error::PageError;
use crate::pipeline::{blank, crop, split};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which part of the original page a segment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentSide {
    /// The whole page (no split happened).
    Full,
    /// Left half of a split spread.
    Left,
    /// Right half of a split spread.
    Right,
}

impl SegmentSide {
    /// Filename suffix: `page-012L.png` / `page-012R.png` for halves.
    pub fn suffix(&self) -> &'static str {
        match self {
            SegmentSide::Full => "",
            SegmentSide::Left => "L",
            SegmentSide::Right => "R",
        }
    }
}

/// One output candidate produced from a rendered page.
#[derive(Debug)]
pub struct PageSegment {
    pub image: DynamicImage,
    pub side: SegmentSide,
    /// Classified blank; the writer skips it but stats still count it.
    pub blank: bool,
}

/// A strategy turning one rendered page into output segments.
///
/// Implementations must be pure per page (no cross-page state) and
/// `Send + Sync` so the run loop can live on a blocking worker thread.
pub trait PageSegmenter: Send + Sync {
    /// Segment one rendered page. `page_num` is 1-indexed and only used
    /// for error attribution.
    fn segment(&self, page_num: usize, image: &DynamicImage)
        -> Result<Vec<PageSegment>, PageError>;
}

/// Build the segmenter selected by the configuration.
pub fn segmenter_for(config: &PrepConfig) -> Box<dyn PageSegmenter> {
    match config.strategy {
        SegmentStrategy::Margins => Box::new(MarginSegmenter {
            margins: config.margins,
        }),
        SegmentStrategy::Adaptive => Box::new(AdaptiveSegmenter {
            heuristics: config.heuristics.clone(),
        }),
    }
}

// ── Fixed margins ────────────────────────────────────────────────────────

/// Removes a fixed band from each edge; always yields exactly one segment
/// and never classifies blanks.
pub struct MarginSegmenter {
    pub margins: Margins,
}

impl PageSegmenter for MarginSegmenter {
    fn segment(
        &self,
        page_num: usize,
        image: &DynamicImage,
    ) -> Result<Vec<PageSegment>, PageError> {
        let cropped = crop::margin_crop(image, &self.margins, page_num)?;
        Ok(vec![PageSegment {
            image: cropped,
            side: SegmentSide::Full,
            blank: false,
        }])
    }
}

// ── Adaptive ─────────────────────────────────────────────────────────────

/// Splits double-page spreads at the gutter, crops each piece to its
/// content, and classifies blanks.
pub struct AdaptiveSegmenter {
    pub heuristics: Heuristics,
}

impl AdaptiveSegmenter {
    fn finish(&self, image: DynamicImage, side: SegmentSide) -> PageSegment {
        let cropped = crop::smart_crop(&image, &self.heuristics);
        let blank = blank::is_blank(&cropped, &self.heuristics);
        PageSegment {
            image: cropped,
            side,
            blank,
        }
    }
}

impl PageSegmenter for AdaptiveSegmenter {
    fn segment(
        &self,
        page_num: usize,
        image: &DynamicImage,
    ) -> Result<Vec<PageSegment>, PageError> {
        match split::find_split(image, &self.heuristics) {
            Some(col) => {
                debug!("page {page_num}: spread split at column {col}");
                let (left, right) = split::split_at(image, col);
                Ok(vec![
                    self.finish(left, SegmentSide::Left),
                    self.finish(right, SegmentSide::Right),
                ])
            }
            None => Ok(vec![self.finish(image.clone(), SegmentSide::Full)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Thick dark "text line" bars, tall enough to survive the contour
    /// size filter (each bar is 24 px, above the 20 px minimum).
    fn text_block(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in (y0..y1).step_by(36) {
            for dy in 0..24 {
                if y + dy >= y1 {
                    break;
                }
                for x in x0..x1 {
                    img.put_pixel(x, y + dy, Rgb([20, 20, 20]));
                }
            }
        }
    }

    #[test]
    fn margin_segmenter_yields_one_full_segment() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 600, Rgb([255, 255, 255])));
        let seg = MarginSegmenter {
            margins: Margins::new(40, 20, 0, 0),
        };
        let out = seg.segment(1, &img).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].side, SegmentSide::Full);
        assert!(!out[0].blank);
        assert_eq!(out[0].image.height(), 540);
    }

    #[test]
    fn adaptive_segmenter_splits_spread_into_left_and_right() {
        // Spread: text on both halves, dark binding line at the centre.
        let mut page = RgbImage::from_pixel(1200, 700, Rgb([255, 255, 255]));
        text_block(&mut page, 80, 100, 500, 600);
        text_block(&mut page, 700, 100, 1120, 600);
        for y in 0..700 {
            page.put_pixel(600, y, Rgb([0, 0, 0]));
        }
        let img = DynamicImage::ImageRgb8(page);

        let seg = AdaptiveSegmenter {
            heuristics: Heuristics::default(),
        };
        let out = seg.segment(1, &img).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].side, SegmentSide::Left);
        assert_eq!(out[1].side, SegmentSide::Right);
        assert!(!out[0].blank);
        assert!(!out[1].blank);
        // Each half was content-cropped below its 600 px split width.
        assert!(out[0].image.width() < 600);
        assert!(out[1].image.width() < 600);
    }

    #[test]
    fn adaptive_segmenter_marks_blank_half() {
        // Text only on the left; right half is empty paper.
        let mut page = RgbImage::from_pixel(1200, 700, Rgb([255, 255, 255]));
        text_block(&mut page, 80, 100, 500, 600);
        for y in 0..700 {
            page.put_pixel(600, y, Rgb([0, 0, 0]));
        }
        let img = DynamicImage::ImageRgb8(page);

        let seg = AdaptiveSegmenter {
            heuristics: Heuristics::default(),
        };
        let out = seg.segment(3, &img).unwrap();
        assert_eq!(out.len(), 2);
        assert!(!out[0].blank, "left half has text");
        assert!(out[1].blank, "right half is blank paper");
    }

    #[test]
    fn adaptive_segmenter_keeps_single_page_whole() {
        let mut page = RgbImage::from_pixel(600, 800, Rgb([255, 255, 255]));
        text_block(&mut page, 100, 100, 500, 700);
        let img = DynamicImage::ImageRgb8(page);

        let seg = AdaptiveSegmenter {
            heuristics: Heuristics::default(),
        };
        let out = seg.segment(2, &img).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].side, SegmentSide::Full);
        assert!(!out[0].blank);
    }

    #[test]
    fn segmenter_for_respects_strategy() {
        let margins_cfg = PrepConfig::builder()
            .strategy(SegmentStrategy::Margins)
            .build()
            .unwrap();
        let adaptive_cfg = PrepConfig::default();

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])));
        // Margins strategy never marks blanks; adaptive marks this blank page.
        let m = segmenter_for(&margins_cfg).segment(1, &img).unwrap();
        assert!(!m[0].blank);
        let a = segmenter_for(&adaptive_cfg).segment(1, &img).unwrap();
        assert!(a[0].blank);
    }
}

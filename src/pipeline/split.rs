//! Spread splitting: locate the vertical seam of a double-page scan.
//!
//! A wide render (width/height above the spread threshold) is two facing
//! book pages. The seam is found in a narrow band around the horizontal
//! centre by summing inverted intensity per column: a *binding line* shows
//! up as the inkiest column, a *gutter* as the least inky one. Which of the
//! two we are looking at is decided by comparing the band's darkest column
//! against a threshold that scales with image height.

use crate::config::Heuristics;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Decide whether a page image is a double-page spread.
pub fn is_spread(img: &DynamicImage, heur: &Heuristics) -> bool {
    let (w, h) = img.dimensions();
    h > 0 && (w as f32 / h as f32) > heur.spread_aspect
}

/// Find the column at which to split a spread, or `None` for single pages.
///
/// The returned index partitions the image into left `[0, split)` and
/// right `[split, w)`; it always lies strictly inside the image.
pub fn find_split(img: &DynamicImage, heur: &Heuristics) -> Option<u32> {
    if !is_spread(img, heur) {
        return None;
    }

    let (w, h) = img.dimensions();
    let gray = img.to_luma8();

    let (band_lo, band_hi) = heur.gutter_band;
    let mid_start = ((w as f32 * band_lo) as u32).min(w - 1);
    let mid_end = ((w as f32 * band_hi) as u32).clamp(mid_start + 1, w);

    // Inverted-intensity sum per column: ink is bright, paper is dark.
    let col_sums: Vec<u64> = (mid_start..mid_end)
        .map(|x| {
            (0..h)
                .map(|y| 255u64 - u64::from(gray.get_pixel(x, y)[0]))
                .sum()
        })
        .collect();

    let (max_idx, &max_sum) = col_sums
        .iter()
        .enumerate()
        .max_by_key(|&(_, s)| *s)?;
    let (min_idx, _) = col_sums.iter().enumerate().min_by_key(|&(_, s)| *s)?;

    // A visible dark binding line dominates its band; otherwise the spread
    // has a light gutter and the split goes through the least-inked column.
    let binding_threshold = heur.binding_scale * h as f64;
    let split = if max_sum as f64 > binding_threshold {
        mid_start + max_idx as u32
    } else {
        mid_start + min_idx as u32
    };

    debug!(
        "split: {}x{} spread, band {}–{}, max_sum {} vs threshold {:.0} → column {}",
        w, h, mid_start, mid_end, max_sum, binding_threshold, split
    );

    // The band keeps the split strictly interior, so both halves are non-empty.
    Some(split.clamp(1, w - 1))
}

/// Partition a spread at `split` into left and right sub-images.
pub fn split_at(img: &DynamicImage, split: u32) -> (DynamicImage, DynamicImage) {
    let (w, h) = img.dimensions();
    let left = img.crop_imm(0, 0, split, h);
    let right = img.crop_imm(split, 0, w - split, h);
    (left, right)
}

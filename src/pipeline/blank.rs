//! Blank-page classification: pixel variance plus edge density.
//!
//! Two independent cheap signals keep false negatives down: a page of
//! near-uniform colour has negligible intensity variance, and a page with
//! faint smudges but no writing has almost no edge pixels. Either signal
//! alone marks the page blank.

use crate::config::Heuristics;
use image::DynamicImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

/// Canny hysteresis thresholds, tuned for scanned documents.
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Classify a page (or split half) as blank.
pub fn is_blank(img: &DynamicImage, heur: &Heuristics) -> bool {
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    let n = (w as f64) * (h as f64);
    if n == 0.0 {
        return true;
    }

    // Signal 1: intensity standard deviation.
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for p in gray.pixels() {
        let v = f64::from(p[0]);
        sum += v;
        sum_sq += v * v;
    }
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    let std_dev = variance.sqrt();

    if std_dev < heur.blank_std_dev {
        debug!("blank: std dev {std_dev:.2} below {}", heur.blank_std_dev);
        return true;
    }

    // Signal 2: fraction of edge pixels.
    let blurred = gaussian_blur_f32(&gray, 1.0);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
    let edge_pixels = edges.pixels().filter(|p| p[0] > 0).count();
    let edge_fraction = edge_pixels as f64 / n;

    if edge_fraction < heur.blank_edge_fraction {
        debug!(
            "blank: edge fraction {edge_fraction:.4} below {}",
            heur.blank_edge_fraction
        );
        return true;
    }

    false
}

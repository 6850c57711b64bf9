//! Cropping: fixed pixel margins and content-aware bounding-box detection.
//!
//! The smart crop walks the classic scanned-document chain: grayscale →
//! Gaussian blur → adaptive binarisation → external contours. Adaptive
//! (locally-averaged) thresholding matters here because manuscript scans
//! rarely have uniform illumination — a global threshold either swallows
//! the dark corner of the page or erases faint ink.

use crate::config::{Heuristics, Margins};
use crate::error::PageError;
use image::{DynamicImage, GenericImageView};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Blur sigma applied before binarisation to suppress scanner grain.
const BLUR_SIGMA: f32 = 2.0;

/// Adaptive-threshold neighbourhood radius (block = 2r + 1 = 31 px).
const ADAPTIVE_BLOCK_RADIUS: u32 = 15;

/// A half-open pixel rectangle: columns `[x_min, x_max)`, rows `[y_min, y_max)`.
///
/// Invariant: `x_min < x_max` and `y_min < y_max`, both within the image
/// the box was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl CropBox {
    /// The box covering an entire `w × h` image.
    pub fn full(w: u32, h: u32) -> Self {
        Self {
            x_min: 0,
            y_min: 0,
            x_max: w,
            y_max: h,
        }
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    /// True when the box covers the whole `w × h` image.
    pub fn is_full(&self, w: u32, h: u32) -> bool {
        *self == Self::full(w, h)
    }

    /// Extract the boxed region as a new image.
    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        img.crop_imm(self.x_min, self.y_min, self.width(), self.height())
    }
}

/// Remove fixed margins from each edge of a page image.
///
/// Zero margins return the image unchanged (the identity, byte for byte).
/// Returns the error when the margins meet or cross, which would leave an
/// empty image.
pub fn margin_crop(
    img: &DynamicImage,
    margins: &Margins,
    page_num: usize,
) -> Result<DynamicImage, PageError> {
    if margins.is_zero() {
        return Ok(img.clone());
    }

    let (w, h) = img.dimensions();
    // Widen before summing: user-supplied margins can exceed u32 combined.
    let horizontal = u64::from(margins.left) + u64::from(margins.right);
    let vertical = u64::from(margins.top) + u64::from(margins.bottom);
    if horizontal >= u64::from(w) || vertical >= u64::from(h) {
        return Err(PageError::MarginsTooLarge {
            page: page_num,
            top: margins.top,
            bottom: margins.bottom,
            left: margins.left,
            right: margins.right,
            width: w,
            height: h,
        });
    }

    Ok(img.crop_imm(
        margins.left,
        margins.top,
        w - margins.left - margins.right,
        h - margins.top - margins.bottom,
    ))
}

/// Detect the bounding box of non-trivial content in a page image.
///
/// Contours smaller than `min_contour_px` are noise; contours spanning at
/// least `border_fraction` of both dimensions are the scan border itself.
/// The union box of the survivors is padded by `padding_px` and clamped.
/// When nothing qualifies, or the padded box comes out smaller than
/// `min_crop_px` (a crop that aggressive has almost certainly eaten real
/// content), the full-image box is returned instead.
pub fn smart_crop_box(img: &DynamicImage, heur: &Heuristics) -> CropBox {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return CropBox::full(w.max(1), h.max(1));
    }

    let gray = img.to_luma8();
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let mut binary = adaptive_threshold(&blurred, ADAPTIVE_BLOCK_RADIUS);
    // adaptive_threshold marks bright pixels 255; flip so ink is foreground.
    image::imageops::invert(&mut binary);

    let contours: Vec<Contour<u32>> = find_contours(&binary);

    let mut union: Option<CropBox> = None;
    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.points.is_empty() {
            continue;
        }

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0u32, 0u32);
        for p in &contour.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let cw = max_x - min_x + 1;
        let ch = max_y - min_y + 1;

        if cw < heur.min_contour_px || ch < heur.min_contour_px {
            continue;
        }
        // A contour covering nearly the whole frame is the scan border.
        if cw as f32 >= heur.border_fraction * w as f32
            && ch as f32 >= heur.border_fraction * h as f32
        {
            continue;
        }

        union = Some(match union {
            None => CropBox {
                x_min: min_x,
                y_min: min_y,
                x_max: max_x + 1,
                y_max: max_y + 1,
            },
            Some(b) => CropBox {
                x_min: b.x_min.min(min_x),
                y_min: b.y_min.min(min_y),
                x_max: b.x_max.max(max_x + 1),
                y_max: b.y_max.max(max_y + 1),
            },
        });
    }

    let Some(b) = union else {
        debug!("smart crop: no qualifying contour, keeping full {w}x{h} page");
        return CropBox::full(w, h);
    };

    let padded = CropBox {
        x_min: b.x_min.saturating_sub(heur.padding_px),
        y_min: b.y_min.saturating_sub(heur.padding_px),
        x_max: (b.x_max + heur.padding_px).min(w),
        y_max: (b.y_max + heur.padding_px).min(h),
    };

    if padded.width() < heur.min_crop_px || padded.height() < heur.min_crop_px {
        debug!(
            "smart crop: padded box {}x{} below minimum, keeping full page",
            padded.width(),
            padded.height()
        );
        return CropBox::full(w, h);
    }

    debug!(
        "smart crop: {}x{} → box ({}, {})–({}, {})",
        w, h, padded.x_min, padded.y_min, padded.x_max, padded.y_max
    );
    padded
}

/// Crop a page image to its detected content, or return it unchanged when
/// no confident crop exists.
pub fn smart_crop(img: &DynamicImage, heur: &Heuristics) -> DynamicImage {
    let (w, h) = img.dimensions();
    let bbox = smart_crop_box(img, heur);
    if bbox.is_full(w, h) {
        img.clone()
    } else {
        bbox.apply(img)
    }
}

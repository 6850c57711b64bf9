//! Pipeline stages for PDF-to-page-images preparation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different split heuristic) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ segment ──▶ write
//! (path)    (pdfium)   │           (PNG files)
//!                      ├─ crop   fixed margins / content bounding box
//!                      ├─ split  gutter / binding-line detection
//!                      └─ blank  variance + edge-density classification
//! ```
//!
//! 1. [`input`]   — validate the user-supplied path (existence, magic bytes)
//! 2. [`render`]  — rasterise selected pages; runs inside `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`segment`] — turn one rendered page into zero or more output images
//!    via a [`segment::PageSegmenter`] strategy, using [`crop`], [`split`]
//!    and [`blank`]
//! 4. [`write`]   — deterministic `page-NNN[LR].png` naming and PNG saving

pub mod blank;
pub mod crop;
pub mod input;
pub mod render;
pub mod segment;
pub mod split;
pub mod write;

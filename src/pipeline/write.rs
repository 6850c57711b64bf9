//! Output writing: deterministic file naming, PNG saving, and clearing of
//! stale output from earlier runs.
//!
//! Stale files matter because a re-run with different settings can produce
//! fewer files than the last one (blanks skipped, spreads merged). Leaving
//! the old `page-*.png` behind would silently mix two runs' output, so the
//! target directory is swept before processing starts.

use crate::error::{PageError, PrepError};
use crate::pipeline::segment::SegmentSide;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Deterministic output name: `page-001.png`, `page-014L.png`, …
pub fn page_file_name(page_num: usize, side: SegmentSide) -> String {
    format!("page-{:03}{}.png", page_num, side.suffix())
}

/// Create `dir` (and parents) and remove any `page-*.png` left from a
/// previous run. Returns the number of stale files removed.
pub fn prepare_output_dir(dir: &Path) -> Result<usize, PrepError> {
    std::fs::create_dir_all(dir).map_err(|e| PrepError::OutputDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let entries = std::fs::read_dir(dir).map_err(|e| PrepError::OutputDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("page-") && name.ends_with(".png") {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                // Best-effort sweep; a locked file should not kill the run.
                Err(e) => warn!("could not remove stale {}: {}", name, e),
            }
        }
    }

    if removed > 0 {
        debug!("cleared {} stale page images from {}", removed, dir.display());
    }
    Ok(removed)
}

/// Save one segment image as PNG.
pub fn save_page(
    img: &DynamicImage,
    dir: &Path,
    page_num: usize,
    side: SegmentSide,
) -> Result<PathBuf, PageError> {
    let path = dir.join(page_file_name(page_num, side));
    img.save(&path).map_err(|e| PageError::WriteFailed {
        page: page_num,
        path: path.clone(),
        detail: e.to_string(),
    })?;
    debug!("saved {}", path.display());
    Ok(path)
}

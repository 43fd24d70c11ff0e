//! # Binary File Emission
//!
//! Writes packed frames as raw `.bin` files — one file per frame
//! (`<basename>_frame_<NNN>.bin`) or one concatenated file
//! (`<basename>.bin`).
//!
//! Pure byte dumps; the device bytes are written exactly as packed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::OledpackError;
use crate::frame::PackedFrame;

/// File name for frame `index` of a sequence: `logo_frame_003.bin`.
pub fn frame_file_name(basename: &str, index: usize) -> String {
    format!("{}_frame_{:03}.bin", basename, index)
}

/// Write packed frames as binary files under `dir`.
///
/// With `concat` one `<basename>.bin` holds every frame back to back;
/// otherwise each frame gets its own `<basename>_frame_<NNN>.bin`.
/// Returns the written paths in frame order.
pub fn write_frames(
    dir: &Path,
    basename: &str,
    frames: &[PackedFrame],
    concat: bool,
) -> Result<Vec<PathBuf>, OledpackError> {
    if concat {
        let path = dir.join(format!("{}.bin", basename));
        let bytes: Vec<u8> = frames.iter().flat_map(|f| f.bytes.iter().copied()).collect();
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), frames = frames.len(), "wrote concatenated binary");
        return Ok(vec![path]);
    }

    let mut paths = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(frame_file_name(basename, i));
        fs::write(&path, &frame.bytes)?;
        paths.push(path);
    }
    debug!(files = paths.len(), "wrote binary frames");
    Ok(paths)
}

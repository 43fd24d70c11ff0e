//! # C Source Emission
//!
//! Renders packed frames as C byte-array declarations, ready to paste into
//! firmware.
//!
//! ## Output Shapes
//!
//! Per-frame arrays (the default):
//!
//! ```c
//! // SSD1306_128x32, 1 frame(s), 512 bytes each
//! const unsigned char splash_0[512] = {
//!   0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
//!   ...
//! };
//! ```
//!
//! Flattened (`flatten: true`): one array holding every frame back to
//! back, plus count/size constants for indexing:
//!
//! ```c
//! const unsigned int splash_frame_count = 3;
//! const unsigned int splash_frame_size = 512;
//! const unsigned char splash[1536] = { ... };
//! ```
//!
//! This is a pure formatter; the bytes are emitted exactly as packed.

use serde::{Deserialize, Serialize};

use crate::error::OledpackError;
use crate::frame::PackedFrame;

/// Options for [`emit_source`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Base identifier for the emitted arrays.
    pub identifier: String,
    /// Bytes per output row. Must be positive.
    pub bytes_per_row: usize,
    /// Emit one flattened array instead of one array per frame.
    pub flatten: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            identifier: "frames".to_string(),
            bytes_per_row: 16,
            flatten: false,
        }
    }
}

/// Render packed frames as C source.
pub fn emit_source(
    frames: &[PackedFrame],
    options: &SourceOptions,
) -> Result<String, OledpackError> {
    if options.bytes_per_row == 0 {
        return Err(OledpackError::InvalidParameters(
            "bytes per row must be positive".to_string(),
        ));
    }
    if options.identifier.is_empty() {
        return Err(OledpackError::InvalidParameters(
            "identifier must not be empty".to_string(),
        ));
    }

    let mut out = String::new();
    if let Some(first) = frames.first() {
        out.push_str(&format!(
            "// {}, {} frame(s), {} bytes each\n",
            first.preset_tag,
            frames.len(),
            first.bytes.len()
        ));
    }

    if options.flatten {
        let frame_size = frames.first().map_or(0, |f| f.bytes.len());
        let total: usize = frames.iter().map(|f| f.bytes.len()).sum();
        out.push_str(&format!(
            "const unsigned int {}_frame_count = {};\n",
            options.identifier,
            frames.len()
        ));
        out.push_str(&format!(
            "const unsigned int {}_frame_size = {};\n",
            options.identifier, frame_size
        ));
        out.push_str(&format!(
            "const unsigned char {}[{}] = {{\n",
            options.identifier, total
        ));
        let all: Vec<u8> = frames.iter().flat_map(|f| f.bytes.iter().copied()).collect();
        push_rows(&mut out, &all, options.bytes_per_row);
        out.push_str("};\n");
    } else {
        for (i, frame) in frames.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if let Some(delay) = frame.delay_ms {
                out.push_str(&format!("// frame {}: {} ms\n", i, delay));
            }
            out.push_str(&format!(
                "const unsigned char {}_{}[{}] = {{\n",
                options.identifier,
                i,
                frame.bytes.len()
            ));
            push_rows(&mut out, &frame.bytes, options.bytes_per_row);
            out.push_str("};\n");
        }
    }

    Ok(out)
}

/// Append bytes as `0xNN, ` rows with a fixed width.
fn push_rows(out: &mut String, bytes: &[u8], bytes_per_row: usize) {
    for row in bytes.chunks(bytes_per_row) {
        out.push_str("  ");
        for (i, byte) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("0x{:02X},", byte));
        }
        out.push('\n');
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! # Device Presets
//!
//! This module is the static catalog of controller memory layouts for the
//! supported monochrome displays.
//!
//! ## Supported Controllers
//!
//! | Tag | Physical | Visible | Viewport offset |
//! |-----|----------|---------|-----------------|
//! | `SSD1306_128x32` | 128×32 | 128×32 | 0 |
//! | `SSD1306_128x64` | 128×64 | 128×64 | 0 |
//! | `SH1106_132x64` | 132×64 | 128×64 | 2 |
//!
//! ## Page Addressing
//!
//! These controllers address memory in "pages": 8-pixel-tall horizontal
//! strips, one byte per column per page.
//!
//! ```text
//! Columns:    0    1    2   ...  width-1
//!          ┌────┬────┬────┬───┬────────┐
//! Page 0   │byte│byte│byte│...│  byte  │  rows 0..8
//!          ├────┼────┼────┼───┼────────┤
//! Page 1   │    │    │    │   │        │  rows 8..16
//! ...      │    │    │    │   │        │
//!          └────┴────┴────┴───┴────────┘
//!
//! Each byte: 8 vertically stacked pixels of its page-column.
//! With lsb-top order, bit 0 = top row of the page.
//! ```
//!
//! ## SH1106 Viewport
//!
//! The SH1106 has 132 columns of RAM but panels wired to it show only 128,
//! skipping the two leftmost (and two rightmost) columns:
//!
//! ```text
//! ├─ 2 hidden ─┼────── 128 visible columns ──────┼─ 2 hidden ─┤
//! │  cols 0-1  │           cols 2-129            │ cols 130-131│
//! ```
//!
//! Packed buffers always cover the full 132 columns; the viewport is a
//! rendering concern only.
//!
//! ## Usage
//!
//! ```
//! use oledpack::device::Preset;
//!
//! let preset = Preset::lookup("SH1106_132x64")?;
//! assert_eq!(preset.physical_size().to_string(), "132x64");
//! assert_eq!(preset.visible_size().to_string(), "128x64");
//! assert_eq!(preset.packed_len(), 132 * 64 / 8);
//! # Ok::<(), oledpack::OledpackError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::OledpackError;
use crate::frame::Dimensions;

/// Vertical bit order within one page byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BitOrder {
    /// Bit 0 = top row of the page (SSD1306/SH1106 native).
    #[default]
    LsbTop,
    /// Bit 7 = top row of the page.
    MsbTop,
}

/// Vertical order of pages in the packed buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageOrder {
    /// Page 0 holds the topmost rows.
    #[default]
    TopDown,
    /// Page 0 holds the bottommost rows (vertically flipped modules).
    BottomUp,
}

/// Horizontal order of columns within each page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnOrder {
    /// Column byte 0 is the leftmost pixel column.
    #[default]
    LeftRight,
    /// Column byte 0 is the rightmost pixel column (mirrored modules).
    RightLeft,
}

impl std::str::FromStr for BitOrder {
    type Err = OledpackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lsb-top" => Ok(Self::LsbTop),
            "msb-top" => Ok(Self::MsbTop),
            other => Err(OledpackError::InvalidParameters(format!(
                "unknown bit order '{}' (expected 'lsb-top' or 'msb-top')",
                other
            ))),
        }
    }
}

impl std::str::FromStr for PageOrder {
    type Err = OledpackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-down" => Ok(Self::TopDown),
            "bottom-up" => Ok(Self::BottomUp),
            other => Err(OledpackError::InvalidParameters(format!(
                "unknown page order '{}' (expected 'top-down' or 'bottom-up')",
                other
            ))),
        }
    }
}

impl std::str::FromStr for ColumnOrder {
    type Err = OledpackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left-right" => Ok(Self::LeftRight),
            "right-left" => Ok(Self::RightLeft),
            other => Err(OledpackError::InvalidParameters(format!(
                "unknown column order '{}' (expected 'left-right' or 'right-left')",
                other
            ))),
        }
    }
}

/// # Display Preset
///
/// Immutable physical/addressing parameters of one controller variant.
///
/// Lookup returns a copy; mutating it never affects the registry or other
/// callers. `height` is always a multiple of `page_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Device tag — the wire format used by callers (e.g. `"SSD1306_128x32"`).
    pub tag: &'static str,

    /// Physical memory width in columns.
    pub width: u32,

    /// Physical memory height in rows.
    pub height: u32,

    /// Rows per page (8 for every supported controller).
    pub page_height: u32,

    /// Default vertical bit order within a page byte.
    pub bit_order: BitOrder,

    /// Default vertical page order.
    pub page_order: PageOrder,

    /// Default horizontal column order.
    pub column_order: ColumnOrder,

    /// Columns of physical memory hidden at the left edge of the panel.
    pub viewport_offset: u32,
}

impl Preset {
    /// SSD1306 with a 128×32 panel.
    pub const SSD1306_128X32: Self = Self {
        tag: "SSD1306_128x32",
        width: 128,
        height: 32,
        page_height: 8,
        bit_order: BitOrder::LsbTop,
        page_order: PageOrder::TopDown,
        column_order: ColumnOrder::LeftRight,
        viewport_offset: 0,
    };

    /// SSD1306 with a 128×64 panel.
    pub const SSD1306_128X64: Self = Self {
        tag: "SSD1306_128x64",
        width: 128,
        height: 64,
        page_height: 8,
        bit_order: BitOrder::LsbTop,
        page_order: PageOrder::TopDown,
        column_order: ColumnOrder::LeftRight,
        viewport_offset: 0,
    };

    /// SH1106 driving a 128×64 panel from 132 columns of RAM.
    pub const SH1106_132X64: Self = Self {
        tag: "SH1106_132x64",
        width: 132,
        height: 64,
        page_height: 8,
        bit_order: BitOrder::LsbTop,
        page_order: PageOrder::TopDown,
        column_order: ColumnOrder::LeftRight,
        viewport_offset: 2,
    };

    /// Every preset in the registry.
    pub const ALL: [Self; 3] = [
        Self::SSD1306_128X32,
        Self::SSD1306_128X64,
        Self::SH1106_132X64,
    ];

    /// Look up a preset by its device tag.
    ///
    /// Returns an owned copy; an unknown tag fails with `UnknownPreset`.
    pub fn lookup(tag: &str) -> Result<Self, OledpackError> {
        Self::ALL
            .into_iter()
            .find(|p| p.tag == tag)
            .ok_or_else(|| OledpackError::UnknownPreset(tag.to_string()))
    }

    /// Physical memory dimensions.
    #[inline]
    pub fn physical_size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Dimensions the panel actually shows.
    ///
    /// Equal to the physical dimensions except for viewport devices, which
    /// report `width - viewport_offset` visible columns.
    #[inline]
    pub fn visible_size(&self) -> Dimensions {
        Dimensions::new(self.width - self.viewport_offset, self.height)
    }

    /// Number of 8-row pages.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.height / self.page_height
    }

    /// Expected packed buffer length: one byte per column per page.
    #[inline]
    pub fn packed_len(&self) -> usize {
        self.width as usize * self.height as usize / self.page_height as usize
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! # Oledpack - Monochrome Display Packing Library
//!
//! Oledpack converts raster images into the exact byte layouts expected by
//! small monochrome display controllers (SSD1306 and SH1106 families). It
//! provides:
//!
//! - **Monochrome conversion**: luminance thresholding with optional Bayer
//!   4x4 ordered dithering
//! - **Byte packing**: page addressing with configurable bit, page and
//!   column order
//! - **Preview rendering**: the packer's pixel-exact inverse, for display
//!   and verification
//! - **Batch pipeline**: validation aggregation, memory-bounded chunking
//!   and buffer pooling
//!
//! ## Quick Start
//!
//! ```
//! use oledpack::convert::{self, ConvertOptions};
//! use oledpack::device::Preset;
//! use oledpack::frame::{Dimensions, PixelFrame};
//! use oledpack::pack::{self, PackOptions};
//!
//! // A 128x32 all-white frame
//! let dims = Dimensions::new(128, 32);
//! let frame = PixelFrame::new(dims, vec![0xFF; dims.pixels() * 4])?;
//!
//! // Reduce to 1 bit per pixel, then pack for the controller
//! let monos = convert::convert(&[frame], &ConvertOptions::default())?;
//! let packed = pack::pack(&monos, &PackOptions::new(Preset::SSD1306_128X32))?;
//!
//! assert_eq!(packed[0].bytes.len(), 512);
//! assert!(packed[0].bytes.iter().all(|&b| b == 0xFF));
//! # Ok::<(), oledpack::OledpackError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`device`] | Controller presets and addressing parameters |
//! | [`frame`] | Pixel, logical-bitmap and packed-frame types |
//! | [`convert`] | Luminance thresholding and ordered dithering |
//! | [`pack`] | Page-addressed byte packing |
//! | [`preview`] | Pixel-exact rendering from packed bytes |
//! | [`pipeline`] | Batch orchestration and buffer pooling |
//! | [`decode`] | Image decode and filename metadata |
//! | [`export`] | C source and binary emission |
//! | [`error`] | Error types |
//!
//! ## Supported Displays
//!
//! | Tag | Physical | Visible |
//! |-----|----------|---------|
//! | `SSD1306_128x32` | 128×32 | 128×32 |
//! | `SSD1306_128x64` | 128×64 | 128×64 |
//! | `SH1106_132x64` | 132×64 | 128×64 |

pub mod convert;
pub mod decode;
pub mod device;
pub mod error;
pub mod export;
pub mod frame;
pub mod pack;
pub mod pipeline;
pub mod preview;

// Re-exports for convenience
pub use device::Preset;
pub use error::{ErrorKind, OledpackError};
pub use frame::{Dimensions, MonoFrame, PackedFrame, PixelFrame};

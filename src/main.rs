//! # Oledpack CLI
//!
//! Command-line interface for converting images to display byte layouts.
//!
//! ## Usage
//!
//! ```bash
//! # List supported display presets
//! oledpack presets
//!
//! # Pack images into a C source file
//! oledpack pack --preset SSD1306_128x64 --out splash.c splash.png
//!
//! # Pack an animation into per-frame .bin files, with dithering
//! oledpack pack --preset SH1106_132x64 --dither ordered4x4 \
//!     --format bin --out frames/ frame_*.png
//!
//! # Render a pixel preview of the packed result
//! oledpack preview --preset SSD1306_128x32 --scale 4 --grid \
//!     --out preview.png logo.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oledpack::convert::{ConvertOptions, Dithering};
use oledpack::device::{BitOrder, ColumnOrder, PageOrder, Preset};
use oledpack::error::OledpackError;
use oledpack::export::{binary, source};
use oledpack::pack::PackOptions;
use oledpack::pipeline::{BatchOptions, FrameGroup, Pipeline};
use oledpack::preview::{self, RenderOptions};
use oledpack::{decode, PackedFrame};

/// Oledpack - image to OLED byte layout converter
#[derive(Parser, Debug)]
#[command(name = "oledpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported display presets
    Presets,

    /// Convert and pack images into device byte layouts
    Pack {
        /// Input image files (one sequence)
        inputs: Vec<PathBuf>,

        /// Target display preset
        #[arg(long, default_value = "SSD1306_128x64")]
        preset: String,

        /// Luminance threshold (0-255)
        #[arg(long, default_value = "128")]
        threshold: u16,

        /// Dithering mode: none | ordered4x4
        #[arg(long, default_value = "none")]
        dither: String,

        /// Invert lit/unlit pixels
        #[arg(long)]
        invert: bool,

        /// Override the preset's bit order: lsb-top | msb-top
        #[arg(long)]
        bit_order: Option<String>,

        /// Override the preset's page order: top-down | bottom-up
        #[arg(long)]
        page_order: Option<String>,

        /// Override the preset's column order: left-right | right-left
        #[arg(long)]
        column_order: Option<String>,

        /// Output format: c | bin | bin-concat
        #[arg(long, default_value = "c")]
        format: String,

        /// Output file (c) or directory (bin)
        #[arg(long, default_value = "out")]
        out: PathBuf,

        /// Identifier for emitted C arrays
        #[arg(long, default_value = "frames")]
        identifier: String,

        /// Bytes per row in C output
        #[arg(long, default_value = "16")]
        bytes_per_row: usize,

        /// Emit one flattened C array instead of one per frame
        #[arg(long)]
        flatten: bool,

        /// Print the validation report as JSON
        #[arg(long)]
        report: bool,
    },

    /// Render a pixel-exact preview PNG of packed images
    Preview {
        /// Input image files (one sequence; first frame is previewed)
        inputs: Vec<PathBuf>,

        /// Target display preset
        #[arg(long, default_value = "SSD1306_128x64")]
        preset: String,

        /// Luminance threshold (0-255)
        #[arg(long, default_value = "128")]
        threshold: u16,

        /// Dithering mode: none | ordered4x4
        #[arg(long, default_value = "none")]
        dither: String,

        /// Invert the preview colors
        #[arg(long)]
        invert: bool,

        /// Pixels drawn per display pixel
        #[arg(long, default_value = "4")]
        scale: u32,

        /// Draw grid lines at pixel boundaries
        #[arg(long)]
        grid: bool,

        /// Output PNG path
        #[arg(long, default_value = "preview.png")]
        out: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), OledpackError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => {
            println!("Supported presets:");
            for preset in Preset::ALL {
                println!(
                    "  {:16} physical {}, visible {}, {} bytes",
                    preset.tag,
                    preset.physical_size(),
                    preset.visible_size(),
                    preset.packed_len()
                );
            }
            Ok(())
        }

        Commands::Pack {
            inputs,
            preset,
            threshold,
            dither,
            invert,
            bit_order,
            page_order,
            column_order,
            format,
            out,
            identifier,
            bytes_per_row,
            flatten,
            report,
        } => {
            let options = batch_options(
                &preset,
                threshold,
                &dither,
                invert,
                bit_order.as_deref(),
                page_order.as_deref(),
                column_order.as_deref(),
            )?;
            let (packed, report_json) = pack_inputs(&inputs, &options)?;
            if report {
                println!("{}", report_json);
            }

            match format.as_str() {
                "c" => {
                    let source_options = source::SourceOptions {
                        identifier,
                        bytes_per_row,
                        flatten,
                    };
                    let src = source::emit_source(&packed, &source_options)?;
                    fs::write(&out, src)?;
                    println!("Wrote {} frame(s) to {}", packed.len(), out.display());
                }
                "bin" | "bin-concat" => {
                    fs::create_dir_all(&out)?;
                    let basename = identifier;
                    let paths =
                        binary::write_frames(&out, &basename, &packed, format == "bin-concat")?;
                    println!("Wrote {} file(s) to {}", paths.len(), out.display());
                }
                other => {
                    return Err(OledpackError::InvalidParameters(format!(
                        "unknown output format '{}' (expected 'c', 'bin' or 'bin-concat')",
                        other
                    )));
                }
            }
            Ok(())
        }

        Commands::Preview {
            inputs,
            preset,
            threshold,
            dither,
            invert,
            scale,
            grid,
            out,
        } => {
            let options = batch_options(&preset, threshold, &dither, false, None, None, None)?;
            let (packed, _) = pack_inputs(&inputs, &options)?;
            let first = packed.first().ok_or_else(|| {
                OledpackError::InvalidParameters("no frames to preview".to_string())
            })?;

            let render_options = RenderOptions {
                scale,
                invert,
                show_grid: grid,
                ..Default::default()
            };
            let png = preview::render_to_png(first, &render_options)?;
            fs::write(&out, png)?;
            println!("Wrote preview to {}", out.display());
            Ok(())
        }
    }
}

/// Build batch options from CLI strings.
#[allow(clippy::too_many_arguments)]
fn batch_options(
    preset: &str,
    threshold: u16,
    dither: &str,
    invert: bool,
    bit_order: Option<&str>,
    page_order: Option<&str>,
    column_order: Option<&str>,
) -> Result<BatchOptions, OledpackError> {
    let preset = Preset::lookup(preset)?;
    let mut pack_options = PackOptions::new(preset);
    pack_options.bit_order = bit_order.map(str::parse::<BitOrder>).transpose()?;
    pack_options.page_order = page_order.map(str::parse::<PageOrder>).transpose()?;
    pack_options.column_order = column_order.map(str::parse::<ColumnOrder>).transpose()?;

    let mut options = BatchOptions::new(pack_options);
    options.convert = ConvertOptions {
        threshold,
        dithering: dither.parse::<Dithering>()?,
        invert,
    };
    Ok(options)
}

/// Decode input files, run the batch pipeline, and return the packed
/// frames plus the validation report as JSON.
fn pack_inputs(
    inputs: &[PathBuf],
    options: &BatchOptions,
) -> Result<(Vec<PackedFrame>, String), OledpackError> {
    if inputs.is_empty() {
        return Err(OledpackError::InvalidParameters(
            "no input files given".to_string(),
        ));
    }

    // Decode stays in the caller's context; only convert+pack run in the
    // pipeline.
    let files: Vec<(String, Vec<u8>)> = inputs
        .iter()
        .map(|path| {
            let name = file_name(path);
            fs::read(path).map(|bytes| (name, bytes))
        })
        .collect::<Result<_, _>>()?;
    let frames = decode::decode_sequence(&files)?;

    let group = FrameGroup {
        label: file_name(&inputs[0]),
        frames,
    };

    let pipeline = Pipeline::new();
    let results = pipeline.process_batch(std::slice::from_ref(&group), options, |done, total, label| {
        eprintln!("[{}/{}] {}", done, total, label);
    })?;

    let result = results.into_iter().next().expect("one group in, one out");
    let report_json = serde_json::to_string_pretty(&result.report)
        .map_err(|e| OledpackError::InvalidParameters(e.to_string()))?;

    if !result.report.is_valid() {
        let first = &result.report.errors[0];
        return Err(OledpackError::InvalidParameters(format!(
            "{} failed during {:?}: {}",
            result.label, first.stage, first.message
        )));
    }

    Ok((result.packed, report_json))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

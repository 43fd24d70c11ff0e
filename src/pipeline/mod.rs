//! # Batch Pipeline
//!
//! Orchestrates the Converting → Packing stages over batches of frame
//! groups, with validation aggregation and memory-bounded chunking.
//!
//! ## Problem
//!
//! A batch can hold many groups (one per uploaded animation or sprite
//! sheet), and each group materializes a full RGBA buffer, a logical
//! bitmap, and a packed buffer at once. Converting everything eagerly
//! would spike peak memory; converting one frame per allocation churns
//! the allocator.
//!
//! ## Solution
//!
//! The group list is split into chunks sized by a memory-budget heuristic:
//! estimated bytes per frame × a safety multiplier, capped against a
//! configured memory ceiling. Chunks run sequentially, groups within a
//! chunk run one at a time, and the [`pool::BufferPool`] recycles bitmap
//! storage across frames; pooled storage is dropped between chunks.
//!
//! ## Stage Machine
//!
//! ```text
//! Decoding (external) → Converting → Packing → Done
//!                            │           │
//!                            └────► Failed(errors)
//! ```
//!
//! Decode happens before the pipeline (it needs the platform image codec
//! and always stays in the caller's context). A group that fails a stage
//! short-circuits to `Failed` with the stage's errors recorded — but the
//! *batch* continues: this is the only layer with partial-failure
//! semantics. The converter and packer themselves fail whole calls.
//!
//! ## Large Groups
//!
//! Groups at or above [`PARALLEL_FRAME_THRESHOLD`] frames have their
//! convert+pack work spread across worker threads with `rayon`. Both
//! stages are pure per-frame functions, so this is a plain indexed map —
//! output order always matches input order.

pub mod pool;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::convert::{self, ConvertOptions};
use crate::error::{ErrorKind, OledpackError};
use crate::frame::{MonoFrame, PackedFrame, PixelFrame};
use crate::pack::{self, PackOptions};
use pool::BufferPool;

/// Frame count at which a group's convert+pack stages move onto worker
/// threads.
pub const PARALLEL_FRAME_THRESHOLD: usize = 16;

/// Default memory ceiling for chunk sizing (64 MiB).
pub const DEFAULT_MEMORY_LIMIT_BYTES: usize = 64 * 1024 * 1024;

/// Default safety multiplier over the estimated per-frame footprint,
/// covering transient copies the estimate cannot see.
pub const DEFAULT_SAFETY_MULTIPLIER: f32 = 2.0;

/// One stage of the per-group pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchStage {
    Converting,
    Packing,
    Done,
    Failed,
}

/// One recorded error or warning, tagged with its kind and the stage that
/// produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub kind: ErrorKind,
    pub stage: BatchStage,
    pub message: String,
}

/// Aggregated validation outcome for one group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error with the stage it occurred in.
    pub fn record(&mut self, stage: BatchStage, error: &OledpackError) {
        self.errors.push(ValidationIssue {
            kind: error.kind(),
            stage,
            message: error.to_string(),
        });
    }

    /// Record a warning.
    pub fn warn(&mut self, stage: BatchStage, kind: ErrorKind, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            kind,
            stage,
            message: message.into(),
        });
    }
}

/// A labeled list of decoded frames, processed as one unit.
#[derive(Debug, Clone)]
pub struct FrameGroup {
    pub label: String,
    pub frames: Vec<PixelFrame>,
}

/// The outcome of one group: packed frames on success, an empty list plus
/// recorded errors on failure.
#[derive(Debug)]
pub struct GroupResult {
    pub label: String,
    pub stage: BatchStage,
    pub packed: Vec<PackedFrame>,
    pub report: ValidationReport,
}

/// Options for [`Pipeline::process_batch`].
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub convert: ConvertOptions,
    pub pack: PackOptions,
    /// Memory ceiling used by the chunk-size heuristic. Must be positive.
    pub memory_limit_bytes: usize,
    /// Multiplier over the estimated per-frame footprint. Must be positive.
    pub safety_multiplier: f32,
}

impl BatchOptions {
    /// Defaults around the given pack options.
    pub fn new(pack: PackOptions) -> Self {
        Self {
            convert: ConvertOptions::default(),
            pack,
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            safety_multiplier: DEFAULT_SAFETY_MULTIPLIER,
        }
    }

    fn validate(&self) -> Result<(), OledpackError> {
        if self.memory_limit_bytes == 0 {
            return Err(OledpackError::InvalidParameters(
                "memory limit must be positive".to_string(),
            ));
        }
        if !(self.safety_multiplier > 0.0) {
            return Err(OledpackError::InvalidParameters(format!(
                "safety multiplier must be positive, got {}",
                self.safety_multiplier
            )));
        }
        self.convert.validate()
    }
}

/// Estimated peak bytes one frame holds in flight: RGBA source + logical
/// bitmap + packed output.
fn estimate_frame_bytes(options: &BatchOptions) -> usize {
    let dims = options.pack.preset.physical_size();
    dims.pixels() * 4 + MonoFrame::byte_len(dims) + options.pack.preset.packed_len()
}

/// Frames that fit the memory budget per chunk. Always at least 1.
fn frames_per_chunk(options: &BatchOptions) -> usize {
    let per_frame = estimate_frame_bytes(options) as f32 * options.safety_multiplier;
    ((options.memory_limit_bytes as f32 / per_frame) as usize).max(1)
}

/// Split groups into chunks whose total frame counts respect `budget`.
///
/// A single group larger than the whole budget still forms its own chunk —
/// groups are the atomic unit.
fn chunk_groups(groups: &[FrameGroup], budget: usize) -> Vec<&[FrameGroup]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut frames = 0;
    for (i, group) in groups.iter().enumerate() {
        if i > start && frames + group.frames.len() > budget {
            chunks.push(&groups[start..i]);
            start = i;
            frames = 0;
        }
        frames += group.frames.len();
    }
    if start < groups.len() {
        chunks.push(&groups[start..]);
    }
    chunks
}

/// The batch orchestrator. Owns the buffer pool; otherwise stateless.
#[derive(Debug, Default)]
pub struct Pipeline {
    pool: BufferPool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the Converting → Packing stages over every group.
    ///
    /// Batch-level option errors fail the whole call; per-group failures
    /// are downgraded to a recorded error plus an empty result for that
    /// group, and the batch proceeds. `progress` is invoked as
    /// `(completed_groups, total_groups, label)` after every group.
    pub fn process_batch(
        &self,
        groups: &[FrameGroup],
        options: &BatchOptions,
        mut progress: impl FnMut(usize, usize, &str),
    ) -> Result<Vec<GroupResult>, OledpackError> {
        options.validate()?;

        let total = groups.len();
        let budget = frames_per_chunk(options);
        let chunks = chunk_groups(groups, budget);
        info!(
            groups = total,
            chunks = chunks.len(),
            frames_per_chunk = budget,
            preset = options.pack.preset.tag,
            "processing batch"
        );

        let mut results = Vec::with_capacity(total);
        let mut completed = 0;
        let chunk_count = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            for group in chunk {
                let result = self.process_group(group, options);
                completed += 1;
                progress(completed, total, &group.label);
                results.push(result);
            }
            // Release pooled storage between chunks so a long batch's
            // footprint stays bounded by one chunk.
            if i + 1 < chunk_count {
                self.pool.trim();
            }
        }

        Ok(results)
    }

    fn process_group(&self, group: &FrameGroup, options: &BatchOptions) -> GroupResult {
        let mut report = ValidationReport::default();

        if group.frames.is_empty() {
            report.warn(
                BatchStage::Converting,
                ErrorKind::InvalidParameters,
                "group contains no frames",
            );
            return GroupResult {
                label: group.label.clone(),
                stage: BatchStage::Done,
                packed: Vec::new(),
                report,
            };
        }

        debug!(label = %group.label, frames = group.frames.len(), "processing group");

        let monos = match self.convert_stage(&group.frames, &options.convert) {
            Ok(monos) => monos,
            Err(e) => {
                report.record(BatchStage::Converting, &e);
                return GroupResult {
                    label: group.label.clone(),
                    stage: BatchStage::Failed,
                    packed: Vec::new(),
                    report,
                };
            }
        };

        match self.pack_stage(monos, &options.pack) {
            Ok(packed) => GroupResult {
                label: group.label.clone(),
                stage: BatchStage::Done,
                packed,
                report,
            },
            Err(e) => {
                report.record(BatchStage::Packing, &e);
                GroupResult {
                    label: group.label.clone(),
                    stage: BatchStage::Failed,
                    packed: Vec::new(),
                    report,
                }
            }
        }
    }

    /// Converting stage: bitmap storage comes from the pool; large groups
    /// fan out across worker threads.
    fn convert_stage(
        &self,
        frames: &[PixelFrame],
        options: &ConvertOptions,
    ) -> Result<Vec<MonoFrame>, OledpackError> {
        options.validate()?;
        let convert_one = |frame: &PixelFrame| {
            let storage = self.pool.acquire(MonoFrame::byte_len(frame.dims));
            convert::convert_frame_into(frame, options, storage)
        };
        if frames.len() >= PARALLEL_FRAME_THRESHOLD {
            Ok(frames.par_iter().map(convert_one).collect())
        } else {
            Ok(frames.iter().map(convert_one).collect())
        }
    }

    /// Packing stage: validates every bitmap up front (the packer's
    /// whole-call failure contract), packs, and returns bitmap storage to
    /// the pool.
    fn pack_stage(
        &self,
        monos: Vec<MonoFrame>,
        options: &PackOptions,
    ) -> Result<Vec<PackedFrame>, OledpackError> {
        for mono in &monos {
            pack::validate_frame(mono, &options.preset)?;
        }
        let packed: Result<Vec<_>, _> = if monos.len() >= PARALLEL_FRAME_THRESHOLD {
            monos.par_iter().map(|m| pack::pack_frame(m, options)).collect()
        } else {
            monos.iter().map(|m| pack::pack_frame(m, options)).collect()
        };
        let packed = packed?;
        for mono in monos {
            self.pool.release(mono.into_storage());
        }
        Ok(packed)
    }
}

// ============================================================================
// TESTS
// ============================================================================

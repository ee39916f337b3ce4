//! Decoding of raw detector output into suppressed detections.
//!
//! A raw buffer is a row-major sequence of fixed-width records
//! `(batch, class, score, xmin, ymin, xmax, ymax)` with coordinates
//! normalized to the network input. Decoding keeps records whose score is
//! strictly above the threshold, scales them to the original image size, runs
//! suppression, and returns the survivors in selection order.
//!
//! Suppression is global across classes unless [`NmsMode::ClassAware`] is
//! requested in the [`NmsConfig`].
//!
//! [`NmsMode::ClassAware`]: crate::nms::NmsMode::ClassAware

mod batch;
mod detections;
mod record;

pub use batch::decode_batch;
pub use detections::{Detection, Detections};
pub use record::{records, RawRecord, RECORD_WIDTH};

use crate::nms::{self, NmsConfig};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetError, DetResult};

/// Decoding parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Records with a score at or below this value are dropped.
    pub score_threshold: f32,
    /// Suppression applied to the surviving candidates.
    pub nms: NmsConfig,
    /// Number of values per record; at least [`RECORD_WIDTH`].
    pub record_width: usize,
    /// Decode batch images on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.3,
            nms: NmsConfig::default(),
            record_width: RECORD_WIDTH,
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Creates a configuration with the two per-call thresholds.
    pub fn new(score_threshold: f32, nms_threshold: f32) -> Self {
        Self {
            score_threshold,
            nms: NmsConfig::with_threshold(nms_threshold),
            ..Self::default()
        }
    }

    /// Checks that the configuration can be applied.
    pub fn validate(&self) -> DetResult<()> {
        if self.score_threshold.is_nan() {
            return Err(DetError::InvalidConfig {
                reason: "score_threshold must not be NaN",
            });
        }
        if self.record_width < RECORD_WIDTH {
            return Err(DetError::InvalidRecordWidth {
                width: self.record_width,
                min: RECORD_WIDTH,
            });
        }
        self.nms.validate()
    }
}

/// Decodes one image's raw output and suppresses overlapping detections.
pub fn decode(
    raw: &[f32],
    image_width: u32,
    image_height: u32,
    cfg: &DecodeConfig,
) -> DetResult<Detections> {
    cfg.validate()?;
    check_dimensions(image_width, image_height)?;
    let _span = trace_span!("decode", values = raw.len()).entered();

    let candidates = collect(records(raw, cfg.record_width)?, image_width, image_height, cfg);
    suppress(candidates, cfg)
}

/// Returns every candidate above the score threshold without suppression.
///
/// Candidates keep record order.
pub fn filter_candidates(
    raw: &[f32],
    image_width: u32,
    image_height: u32,
    cfg: &DecodeConfig,
) -> DetResult<Detections> {
    cfg.validate()?;
    check_dimensions(image_width, image_height)?;
    Ok(collect(
        records(raw, cfg.record_width)?,
        image_width,
        image_height,
        cfg,
    ))
}

fn collect(
    records: impl Iterator<Item = RawRecord>,
    image_width: u32,
    image_height: u32,
    cfg: &DecodeConfig,
) -> Detections {
    records
        .filter(|rec| rec.score > cfg.score_threshold)
        .map(|rec| Detection {
            rect: rec.to_rect(image_width, image_height),
            score: rec.score,
            class_id: rec.class_id(),
        })
        .collect()
}

fn suppress(candidates: Detections, cfg: &DecodeConfig) -> DetResult<Detections> {
    let keep = nms::apply(
        candidates.boxes(),
        candidates.scores(),
        candidates.classes(),
        &cfg.nms,
    )?;
    trace_event!(
        "decode_done",
        candidates = candidates.len(),
        kept = keep.len()
    );
    Ok(candidates.gather(&keep))
}

fn check_dimensions(width: u32, height: u32) -> DetResult<()> {
    if width == 0 || height == 0 {
        return Err(DetError::InvalidDimensions { width, height });
    }
    Ok(())
}

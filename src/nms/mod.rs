//! Greedy non-maximum suppression over a candidate set.
//!
//! Every entry point returns indices into the caller's arrays in selection
//! order: highest score first, ties broken by the lowest original index. A
//! candidate is suppressed when its IoU with an accepted box is strictly
//! greater than the threshold. NaN scores rank below every real score.

mod greedy;
mod sorted;

use crate::geometry::{iou, Rect};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetError, DetResult};

/// Algorithm used to realize the greedy selection.
///
/// Both strategies return identical indices for every input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NmsStrategy {
    /// Rescan the remaining candidates for the maximum after each acceptance.
    #[default]
    Greedy,
    /// Stable-sort once by descending score, then make a single pass.
    Sorted,
}

/// Which candidates an accepted box is allowed to suppress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NmsMode {
    /// Suppress overlapping candidates regardless of class.
    #[default]
    Global,
    /// Only suppress overlapping candidates with the same class id.
    ClassAware,
}

/// Suppression parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct NmsConfig {
    /// IoU above which a lower-scored candidate is removed.
    pub iou_threshold: f32,
    /// Selection algorithm.
    pub strategy: NmsStrategy,
    /// Global or per-class suppression.
    pub mode: NmsMode,
    /// Stop after this many accepted boxes.
    pub max_detections: Option<usize>,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.45,
            strategy: NmsStrategy::Greedy,
            mode: NmsMode::Global,
            max_detections: None,
        }
    }
}

impl NmsConfig {
    /// Creates a global greedy configuration with the given IoU threshold.
    pub fn with_threshold(iou_threshold: f32) -> Self {
        Self {
            iou_threshold,
            ..Self::default()
        }
    }

    /// Checks that the configuration can be applied.
    ///
    /// Thresholds outside `[0, 1]` are allowed; they only change how
    /// aggressive suppression is.
    pub fn validate(&self) -> DetResult<()> {
        if self.iou_threshold.is_nan() {
            return Err(DetError::InvalidConfig {
                reason: "iou_threshold must not be NaN",
            });
        }
        if self.max_detections == Some(0) {
            return Err(DetError::InvalidConfig {
                reason: "max_detections must be at least 1",
            });
        }
        Ok(())
    }
}

/// Suppresses overlapping boxes with the default greedy strategy.
pub fn suppress(boxes: &[Rect], scores: &[f32], iou_threshold: f32) -> DetResult<Vec<usize>> {
    suppress_with(boxes, scores, iou_threshold, NmsStrategy::Greedy)
}

/// Suppresses overlapping boxes across all classes using `strategy`.
pub fn suppress_with(
    boxes: &[Rect],
    scores: &[f32],
    iou_threshold: f32,
    strategy: NmsStrategy,
) -> DetResult<Vec<usize>> {
    check_len("scores", boxes.len(), scores.len())?;
    Ok(run(boxes, scores, None, iou_threshold, strategy, usize::MAX))
}

/// Suppresses overlapping boxes only within the same class.
///
/// Output is still in global selection order, so a lower-scored box of one
/// class may follow a higher-scored box of another.
pub fn suppress_classes(
    boxes: &[Rect],
    scores: &[f32],
    classes: &[u32],
    iou_threshold: f32,
    strategy: NmsStrategy,
) -> DetResult<Vec<usize>> {
    check_len("scores", boxes.len(), scores.len())?;
    check_len("classes", boxes.len(), classes.len())?;
    Ok(run(
        boxes,
        scores,
        Some(classes),
        iou_threshold,
        strategy,
        usize::MAX,
    ))
}

/// Applies a full [`NmsConfig`] to a candidate set.
pub fn apply(
    boxes: &[Rect],
    scores: &[f32],
    classes: &[u32],
    cfg: &NmsConfig,
) -> DetResult<Vec<usize>> {
    cfg.validate()?;
    check_len("scores", boxes.len(), scores.len())?;
    check_len("classes", boxes.len(), classes.len())?;
    let groups = match cfg.mode {
        NmsMode::Global => None,
        NmsMode::ClassAware => Some(classes),
    };
    let limit = cfg.max_detections.unwrap_or(usize::MAX);
    Ok(run(
        boxes,
        scores,
        groups,
        cfg.iou_threshold,
        cfg.strategy,
        limit,
    ))
}

fn run(
    boxes: &[Rect],
    scores: &[f32],
    classes: Option<&[u32]>,
    iou_threshold: f32,
    strategy: NmsStrategy,
    limit: usize,
) -> Vec<usize> {
    let _span = trace_span!("suppress", candidates = boxes.len()).entered();
    let ctx = Suppression {
        boxes,
        classes,
        iou_threshold,
    };
    let kept = match strategy {
        NmsStrategy::Greedy => greedy::select(&ctx, scores, limit),
        NmsStrategy::Sorted => sorted::select(&ctx, scores, limit),
    };
    trace_event!("suppress_done", candidates = boxes.len(), kept = kept.len());
    kept
}

fn check_len(what: &'static str, expected: usize, got: usize) -> DetResult<()> {
    if expected != got {
        return Err(DetError::LengthMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

/// Selection key: NaN ranks as negative infinity.
#[inline]
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Shared suppression predicate for both strategies.
struct Suppression<'a> {
    boxes: &'a [Rect],
    classes: Option<&'a [u32]>,
    iou_threshold: f32,
}

impl Suppression<'_> {
    #[inline]
    fn suppresses(&self, accepted: usize, other: usize) -> bool {
        if let Some(classes) = self.classes {
            if classes[accepted] != classes[other] {
                return false;
            }
        }
        iou(&self.boxes[accepted], &self.boxes[other]) > self.iou_threshold
    }
}

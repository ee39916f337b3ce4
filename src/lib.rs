//! detnms turns raw object-detector output into a deduplicated, ranked list
//! of bounding boxes.
//!
//! The pipeline is: fixed-width records from an inference backend, a strict
//! score threshold, denormalization to pixel rectangles, then greedy
//! non-maximum suppression. Batch decoding can run in parallel via the
//! `rayon` feature; `tracing` adds spans around each stage.

pub mod decode;
pub mod detector;
pub mod geometry;
#[cfg(feature = "image-io")]
pub mod io;
pub mod lowlevel;
pub mod nms;
mod trace;
pub mod util;

pub use decode::{decode, decode_batch, DecodeConfig, Detection, Detections};
pub use detector::{Detector, InferenceBackend, RawOutput};
pub use geometry::{iou, Rect};
pub use nms::{suppress, NmsConfig, NmsMode, NmsStrategy};
pub use util::{DetError, DetResult};

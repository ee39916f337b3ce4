//! Building blocks for custom post-processing pipelines.
//!
//! Most callers only need [`decode`](crate::decode()) or a
//! [`Detector`](crate::Detector). These re-exports cover record parsing,
//! candidate filtering and the individual suppression entry points.

pub use crate::decode::{filter_candidates, records, RawRecord, RECORD_WIDTH};
pub use crate::nms::{apply, suppress_classes, suppress_with};

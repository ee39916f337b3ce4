//! Decoding of batched inference output.
//!
//! Records are routed to their image by `batch_index`; each image then gets
//! its own candidate set, so images can be decoded independently and, with
//! the `rayon` feature, in parallel. A negative batch index marks padding
//! after the last valid record and is skipped.

use super::{check_dimensions, collect, records, suppress, DecodeConfig, Detections, RawRecord};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetError, DetResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Decodes a buffer holding records for several images.
///
/// `sizes[i]` is the `(width, height)` of image `i`. Returns one
/// [`Detections`] per image, in batch order.
pub fn decode_batch(
    raw: &[f32],
    sizes: &[(u32, u32)],
    cfg: &DecodeConfig,
) -> DetResult<Vec<Detections>> {
    cfg.validate()?;
    for &(width, height) in sizes {
        check_dimensions(width, height)?;
    }
    let _span = trace_span!("decode_batch", images = sizes.len(), values = raw.len()).entered();

    let groups = partition(records(raw, cfg.record_width)?, sizes.len())?;
    trace_event!("batch_partitioned", images = groups.len());

    #[cfg(feature = "rayon")]
    if cfg.parallel {
        return groups
            .into_par_iter()
            .zip(sizes.par_iter())
            .map(|(group, &(width, height))| decode_group(group, width, height, cfg))
            .collect();
    }

    groups
        .into_iter()
        .zip(sizes)
        .map(|(group, &(width, height))| decode_group(group, width, height, cfg))
        .collect()
}

fn partition(
    records: impl Iterator<Item = RawRecord>,
    batches: usize,
) -> DetResult<Vec<Vec<RawRecord>>> {
    let mut groups = vec![Vec::new(); batches];
    for rec in records {
        if rec.batch_index < 0.0 {
            continue;
        }
        let slot = if rec.batch_index.is_finite() {
            groups.get_mut(rec.batch_index as usize)
        } else {
            None
        };
        match slot {
            Some(group) => group.push(rec),
            None => {
                return Err(DetError::BatchIndexOutOfRange {
                    index: rec.batch_index,
                    batches,
                })
            }
        }
    }
    Ok(groups)
}

fn decode_group(
    group: Vec<RawRecord>,
    width: u32,
    height: u32,
    cfg: &DecodeConfig,
) -> DetResult<Detections> {
    suppress(collect(group.into_iter(), width, height, cfg), cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_rows_are_skipped() {
        let raw = [
            0.0, 1.0, 0.9, 0.1, 0.1, 0.2, 0.2, //
            -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let out = decode_batch(&raw, &[(100, 100)], &DecodeConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 1);
    }

    #[test]
    fn unknown_batch_index_is_rejected() {
        let raw = [2.0, 1.0, 0.9, 0.1, 0.1, 0.2, 0.2];
        let err = decode_batch(&raw, &[(10, 10), (10, 10)], &DecodeConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DetError::BatchIndexOutOfRange {
                index: 2.0,
                batches: 2,
            }
        );
    }

    #[test]
    fn images_without_records_yield_empty_sets() {
        let raw = [1.0, 1.0, 0.9, 0.1, 0.1, 0.2, 0.2];
        let out = decode_batch(&raw, &[(10, 10), (10, 10)], &DecodeConfig::default()).unwrap();
        assert!(out[0].is_empty());
        assert_eq!(out[1].len(), 1);
    }
}

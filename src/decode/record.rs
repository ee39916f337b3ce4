//! Fixed-width raw detection records.

use crate::geometry::Rect;
use crate::util::{DetError, DetResult};

/// Number of fields in a detection record.
pub const RECORD_WIDTH: usize = 7;

/// One `(batch, class, score, xmin, ymin, xmax, ymax)` record with
/// coordinates normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawRecord {
    /// Index of the image within the inference batch.
    pub batch_index: f32,
    /// Class id as emitted by the network.
    pub class_index: f32,
    /// Confidence score.
    pub score: f32,
    /// Normalized left edge.
    pub xmin: f32,
    /// Normalized top edge.
    pub ymin: f32,
    /// Normalized right edge.
    pub xmax: f32,
    /// Normalized bottom edge.
    pub ymax: f32,
}

impl RawRecord {
    /// Reads the first seven values of `fields`.
    pub fn from_slice(fields: &[f32]) -> Option<Self> {
        fields.get(..RECORD_WIDTH).map(Self::read)
    }

    fn read(fields: &[f32]) -> Self {
        Self {
            batch_index: fields[0],
            class_index: fields[1],
            score: fields[2],
            xmin: fields[3],
            ymin: fields[4],
            xmax: fields[5],
            ymax: fields[6],
        }
    }

    /// Class id, truncated toward zero; negative ids saturate to 0.
    pub fn class_id(&self) -> u32 {
        self.class_index as u32
    }

    /// Converts the normalized box to inclusive pixel coordinates.
    ///
    /// Each corner is scaled and truncated toward zero, then the size is
    /// `max - min + 1`. Inverted corners produce a zero or negative size,
    /// which is kept as-is.
    pub fn to_rect(&self, image_width: u32, image_height: u32) -> Rect {
        let w = image_width as f32;
        let h = image_height as f32;
        let xmin = (self.xmin * w) as i32;
        let ymin = (self.ymin * h) as i32;
        let xmax = (self.xmax * w) as i32;
        let ymax = (self.ymax * h) as i32;
        Rect::new(
            xmin,
            ymin,
            xmax.saturating_sub(xmin).saturating_add(1),
            ymax.saturating_sub(ymin).saturating_add(1),
        )
    }
}

/// Iterates over the records of a raw buffer.
///
/// Fails before reading anything if `record_width` is too narrow or the
/// buffer length is not a multiple of it. Extra fields beyond the first seven
/// are ignored.
pub fn records(
    raw: &[f32],
    record_width: usize,
) -> DetResult<impl ExactSizeIterator<Item = RawRecord> + '_> {
    if record_width < RECORD_WIDTH {
        return Err(DetError::InvalidRecordWidth {
            width: record_width,
            min: RECORD_WIDTH,
        });
    }
    if raw.len() % record_width != 0 {
        return Err(DetError::MalformedBuffer {
            len: raw.len(),
            record_width,
        });
    }
    Ok(raw.chunks_exact(record_width).map(RawRecord::read))
}

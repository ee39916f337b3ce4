//! Index-aligned detection storage.

use crate::geometry::Rect;
use crate::util::{DetError, DetResult};

/// A single decoded detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Bounding box in pixel coordinates.
    pub rect: Rect,
    /// Confidence score.
    pub score: f32,
    /// Class id.
    pub class_id: u32,
}

/// Boxes, scores and class ids kept in index correspondence.
///
/// Entry `i` of each sequence describes the same detection. The fields are
/// private so every constructor keeps the three sequences the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detections {
    boxes: Vec<Rect>,
    scores: Vec<f32>,
    classes: Vec<u32>,
}

impl Detections {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` detections.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
            classes: Vec::with_capacity(capacity),
        }
    }

    /// Builds a set from parallel sequences of equal length.
    pub fn from_parts(boxes: Vec<Rect>, scores: Vec<f32>, classes: Vec<u32>) -> DetResult<Self> {
        if scores.len() != boxes.len() {
            return Err(DetError::LengthMismatch {
                what: "scores",
                expected: boxes.len(),
                got: scores.len(),
            });
        }
        if classes.len() != boxes.len() {
            return Err(DetError::LengthMismatch {
                what: "classes",
                expected: boxes.len(),
                got: classes.len(),
            });
        }
        Ok(Self {
            boxes,
            scores,
            classes,
        })
    }

    /// Appends one detection.
    pub fn push(&mut self, detection: Detection) {
        self.boxes.push(detection.rect);
        self.scores.push(detection.score);
        self.classes.push(detection.class_id);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> &[Rect] {
        &self.boxes
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    /// Returns detection `index` if it exists.
    pub fn get(&self, index: usize) -> Option<Detection> {
        Some(Detection {
            rect: *self.boxes.get(index)?,
            score: *self.scores.get(index)?,
            class_id: *self.classes.get(index)?,
        })
    }

    /// Iterates detections in stored order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Detection> + '_ {
        self.boxes
            .iter()
            .zip(&self.scores)
            .zip(&self.classes)
            .map(|((&rect, &score), &class_id)| Detection {
                rect,
                score,
                class_id,
            })
    }

    /// Splits the set into its parallel sequences.
    pub fn into_parts(self) -> (Vec<Rect>, Vec<f32>, Vec<u32>) {
        (self.boxes, self.scores, self.classes)
    }

    /// Gathers the detections at `indices`, in that order.
    ///
    /// Indices come from suppression over this same set, so they are in range.
    pub(crate) fn gather(&self, indices: &[usize]) -> Self {
        let mut out = Self::with_capacity(indices.len());
        for &idx in indices {
            out.boxes.push(self.boxes[idx]);
            out.scores.push(self.scores[idx]);
            out.classes.push(self.classes[idx]);
        }
        out
    }
}

impl FromIterator<Detection> for Detections {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        let mut out = Self::new();
        for detection in iter {
            out.push(detection);
        }
        out
    }
}

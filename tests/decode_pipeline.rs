//! End-to-end decoding against a recorded detector frame.
//!
//! `data/reference_frame.json` holds 18 records from a 640x480 frame: six
//! faces, a shifted lower-scored duplicate of each, three records under the
//! score threshold and three `-1` padding rows.

use detnms::lowlevel::filter_candidates;
use detnms::{
    decode, decode_batch, DecodeConfig, DetError, NmsConfig, NmsMode, NmsStrategy, Rect,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Expected {
    rect: [i32; 4],
    score: f32,
    class_id: u32,
}

#[derive(Debug, Deserialize)]
struct Frame {
    image_width: u32,
    image_height: u32,
    score_threshold: f32,
    nms_threshold: f32,
    candidates: usize,
    records: Vec<[f32; 7]>,
    expected: Vec<Expected>,
}

impl Frame {
    fn raw(&self) -> Vec<f32> {
        self.records.iter().flatten().copied().collect()
    }

    fn config(&self) -> DecodeConfig {
        DecodeConfig::new(self.score_threshold, self.nms_threshold)
    }
}

fn load_frame() -> Frame {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/reference_frame.json");
    let text = fs::read_to_string(&path).expect("read reference frame");
    serde_json::from_str(&text).expect("parse reference frame")
}

#[test]
fn reference_frame_decodes_to_expected_detections() {
    let frame = load_frame();
    let out = decode(&frame.raw(), frame.image_width, frame.image_height, &frame.config()).unwrap();

    assert_eq!(out.len(), frame.expected.len());
    for (got, want) in out.iter().zip(&frame.expected) {
        let [x, y, w, h] = want.rect;
        assert_eq!(got.rect, Rect::new(x, y, w, h));
        assert_eq!(got.class_id, want.class_id);
        assert!((got.score - want.score).abs() < 1e-6);
    }
}

#[test]
fn reference_frame_candidates_exclude_low_scores() {
    let frame = load_frame();
    let cfg = frame.config();
    let candidates =
        filter_candidates(&frame.raw(), frame.image_width, frame.image_height, &cfg).unwrap();
    assert_eq!(candidates.len(), frame.candidates);
    assert!(candidates.scores().iter().all(|&s| s > cfg.score_threshold));
    // The only class-2 record is under the threshold.
    assert!(candidates.classes().iter().all(|&c| c == 1));
}

#[test]
fn below_threshold_record_is_absent_from_output() {
    let raw = [
        0.0, 1.0, 0.9, 0.10, 0.10, 0.20, 0.20, //
        0.0, 3.0, 0.2, 0.60, 0.60, 0.70, 0.70,
    ];
    let out = decode(&raw, 100, 100, &DecodeConfig::new(0.3, 0.45)).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.scores(), &[0.9]);
    assert_eq!(out.classes(), &[1]);
    assert!(!out.boxes().contains(&Rect::new(60, 60, 11, 11)));
}

#[test]
fn output_is_in_selection_order() {
    let raw = [
        0.0, 1.0, 0.4, 0.00, 0.00, 0.10, 0.10, //
        0.0, 1.0, 0.8, 0.50, 0.50, 0.60, 0.60, //
        0.0, 1.0, 0.6, 0.80, 0.80, 0.90, 0.90,
    ];
    let out = decode(&raw, 100, 100, &DecodeConfig::new(0.3, 0.45)).unwrap();
    assert_eq!(out.scores(), &[0.8, 0.6, 0.4]);
}

#[test]
fn global_suppression_crosses_classes_by_default() {
    let raw = [
        0.0, 1.0, 0.9, 0.10, 0.10, 0.50, 0.50, //
        0.0, 2.0, 0.8, 0.10, 0.10, 0.50, 0.50,
    ];
    let global = decode(&raw, 200, 200, &DecodeConfig::new(0.3, 0.45)).unwrap();
    assert_eq!(global.classes(), &[1]);

    let cfg = DecodeConfig {
        nms: NmsConfig {
            mode: NmsMode::ClassAware,
            ..NmsConfig::with_threshold(0.45)
        },
        ..DecodeConfig::new(0.3, 0.45)
    };
    let per_class = decode(&raw, 200, 200, &cfg).unwrap();
    assert_eq!(per_class.classes(), &[1, 2]);
}

#[test]
fn strategies_agree_on_reference_frame() {
    let frame = load_frame();
    let raw = frame.raw();
    let greedy = decode(&raw, frame.image_width, frame.image_height, &frame.config()).unwrap();
    let cfg = DecodeConfig {
        nms: NmsConfig {
            strategy: NmsStrategy::Sorted,
            ..NmsConfig::with_threshold(frame.nms_threshold)
        },
        ..frame.config()
    };
    let sorted = decode(&raw, frame.image_width, frame.image_height, &cfg).unwrap();
    assert_eq!(greedy, sorted);
}

#[test]
fn max_detections_keeps_the_best() {
    let frame = load_frame();
    let cfg = DecodeConfig {
        nms: NmsConfig {
            max_detections: Some(2),
            ..NmsConfig::with_threshold(frame.nms_threshold)
        },
        ..frame.config()
    };
    let out = decode(&frame.raw(), frame.image_width, frame.image_height, &cfg).unwrap();
    assert_eq!(out.len(), 2);
    assert!((out.scores()[0] - frame.expected[0].score).abs() < 1e-6);
    assert!((out.scores()[1] - frame.expected[1].score).abs() < 1e-6);
}

#[test]
fn malformed_buffer_is_rejected_before_decoding() {
    let raw = vec![0.5f32; 7 * 3 + 2];
    let err = decode(&raw, 640, 480, &DecodeConfig::default()).unwrap_err();
    assert_eq!(
        err,
        DetError::MalformedBuffer {
            len: 23,
            record_width: 7,
        }
    );
}

#[test]
fn wider_records_are_decoded_with_explicit_width() {
    let raw = [
        0.0, 1.0, 0.9, 0.10, 0.10, 0.20, 0.20, 7.0, 7.0, //
        0.0, 2.0, 0.8, 0.60, 0.60, 0.70, 0.70, 7.0, 7.0,
    ];
    let cfg = DecodeConfig {
        record_width: 9,
        ..DecodeConfig::new(0.3, 0.45)
    };
    let out = decode(&raw, 100, 100, &cfg).unwrap();
    assert_eq!(out.classes(), &[1, 2]);
    assert!(decode(&raw, 100, 100, &DecodeConfig::default()).is_err());
}

#[test]
fn degenerate_boxes_propagate() {
    // xmax < xmin: width becomes non-positive and is kept as-is.
    let raw = [0.0, 1.0, 0.9, 0.50, 0.10, 0.20, 0.20];
    let out = decode(&raw, 100, 100, &DecodeConfig::default()).unwrap();
    assert_eq!(out.len(), 1);
    assert!(out.boxes()[0].width <= 0);
}

#[test]
fn batch_decoding_matches_per_image_decoding() {
    let frame = load_frame();
    let mut raw = frame.raw();
    // Second image: same records scaled to a different frame size.
    let second: Vec<f32> = frame
        .records
        .iter()
        .filter(|rec| rec[0] >= 0.0)
        .flat_map(|rec| {
            let mut rec = *rec;
            rec[0] = 1.0;
            rec
        })
        .collect();
    raw.extend_from_slice(&second);

    let sizes = [(640, 480), (1280, 720)];
    let cfg = frame.config();
    let batch = decode_batch(&raw, &sizes, &cfg).unwrap();
    assert_eq!(batch.len(), 2);

    let first = decode(&frame.raw(), 640, 480, &cfg).unwrap();
    let second_alone = decode(&second, 1280, 720, &cfg).unwrap();
    assert_eq!(batch[0], first);
    assert_eq!(batch[1], second_alone);
}

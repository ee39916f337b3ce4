#![cfg(feature = "rayon")]

use detnms::{decode_batch, DecodeConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_batch(rng: &mut StdRng, images: usize, per_image: usize) -> Vec<f32> {
    let mut raw = Vec::with_capacity(images * per_image * 7);
    for batch in 0..images {
        for _ in 0..per_image {
            let x0: f32 = rng.random_range(0.0..0.9);
            let y0: f32 = rng.random_range(0.0..0.9);
            let w: f32 = rng.random_range(0.02..0.1);
            let h: f32 = rng.random_range(0.02..0.1);
            raw.extend_from_slice(&[
                batch as f32,
                rng.random_range(0..4) as f32,
                rng.random_range(0.0..1.0),
                x0,
                y0,
                x0 + w,
                y0 + h,
            ]);
        }
    }
    raw
}

#[test]
fn parallel_batch_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(21);
    let images = 12;
    let raw = make_batch(&mut rng, images, 80);
    let sizes: Vec<(u32, u32)> = (0..images)
        .map(|i| (320 + 32 * i as u32, 240 + 24 * i as u32))
        .collect();

    let seq_cfg = DecodeConfig {
        parallel: false,
        ..DecodeConfig::new(0.25, 0.5)
    };
    let par_cfg = DecodeConfig {
        parallel: true,
        ..seq_cfg.clone()
    };

    let seq = decode_batch(&raw, &sizes, &seq_cfg).unwrap();
    let par = decode_batch(&raw, &sizes, &par_cfg).unwrap();
    assert_eq!(seq.len(), images);
    assert_eq!(seq, par);
}

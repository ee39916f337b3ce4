//! Rescanning greedy selection, O(n^2) in the candidate count.

use super::{rank_key, Suppression};

/// Position in `remaining` of the first candidate with the maximum score.
fn first_max(remaining: &[usize], scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (pos, &idx) in remaining.iter().enumerate() {
        let key = rank_key(scores[idx]);
        match best {
            Some((_, best_key)) if key <= best_key => {}
            _ => best = Some((pos, key)),
        }
    }
    best.map(|(pos, _)| pos)
}

pub(super) fn select(ctx: &Suppression<'_>, scores: &[f32], limit: usize) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..ctx.boxes.len()).collect();
    let mut kept = Vec::new();

    while kept.len() < limit {
        let Some(pos) = first_max(&remaining, scores) else {
            break;
        };
        let accepted = remaining.remove(pos);
        kept.push(accepted);
        remaining.retain(|&other| !ctx.suppresses(accepted, other));
    }

    kept
}

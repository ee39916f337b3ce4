//! Sort-once selection with a single suppression pass.
//!
//! A stable descending sort reproduces the greedy tie-break: among equal
//! scores the lower original index comes first.

use std::cmp::Ordering;

use super::{rank_key, Suppression};

fn order_desc(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        rank_key(scores[b])
            .partial_cmp(&rank_key(scores[a]))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    order
}

pub(super) fn select(ctx: &Suppression<'_>, scores: &[f32], limit: usize) -> Vec<usize> {
    let order = order_desc(scores);
    let mut suppressed = vec![false; order.len()];
    let mut kept = Vec::new();

    for (rank, &accepted) in order.iter().enumerate() {
        if kept.len() >= limit {
            break;
        }
        if suppressed[accepted] {
            continue;
        }
        kept.push(accepted);
        for &other in &order[rank + 1..] {
            if !suppressed[other] && ctx.suppresses(accepted, other) {
                suppressed[other] = true;
            }
        }
    }

    kept
}

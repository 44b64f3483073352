use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::config::SelectorWeights;
use crate::engine::mastery::{MasteryRecord, MasteryStore};
use crate::engine::recency::RecencyWindow;
use crate::engine::types::WordItem;

/// Selection weight of one candidate. Always positive.
///
/// Unseen terms get the attempt bonus only; seen terms are boosted by low
/// long-run and recent accuracy, halved while recent, and boosted while on
/// the weakness list.
pub fn word_weight(
    record: Option<&MasteryRecord>,
    is_recent: bool,
    in_weakness_list: bool,
    w: &SelectorWeights,
) -> f64 {
    let (attempts, accuracy, recent_len, recent_accuracy) = match record {
        Some(r) => (r.attempts, r.accuracy(), r.recent_outcomes.len(), r.recent_accuracy()),
        None => (0, 0.0, 0, 1.0),
    };

    let accuracy_weight = if attempts > 0 {
        (w.accuracy_scale * (1.0 - accuracy)).max(1.0)
    } else {
        1.0
    };
    let attempt_bonus = (w.attempt_bonus_base - w.attempt_bonus_decay * attempts as f64).max(1.0);
    let recency_penalty = if is_recent { w.recency_penalty } else { 1.0 };
    let recent_weight = if recent_len > 0 {
        (w.recent_scale * (1.0 - recent_accuracy)).max(1.0)
    } else {
        1.0
    };
    let weakness_bonus = if in_weakness_list { w.weakness_bonus } else { 1.0 };

    accuracy_weight * attempt_bonus * recency_penalty * recent_weight * weakness_bonus
}

/// Draws up to `count` distinct items without replacement, each draw
/// proportional to the remaining weights.
///
/// Candidates are shuffled first so that ties do not favor input order.
/// When floating-point drift leaves `r` past the last cumulative sum the
/// last remaining candidate is taken.
pub fn weighted_sample<T, R>(items: &[T], weights: &[f64], count: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut remaining: Vec<(&T, f64)> = items.iter().zip(weights.iter().copied()).collect();
    remaining.shuffle(rng);

    let target = count.min(remaining.len());
    let mut selected = Vec::with_capacity(target);

    while selected.len() < target {
        let total: f64 = remaining.iter().map(|(_, w)| *w).sum();
        let r = rng.gen::<f64>() * total;

        let mut cumulative = 0.0;
        let mut picked = remaining.len() - 1;
        for (pos, (_, weight)) in remaining.iter().enumerate() {
            cumulative += weight;
            if cumulative >= r {
                picked = pos;
                break;
            }
        }

        let (item, _) = remaining.remove(picked);
        selected.push(item.clone());
    }

    selected
}

/// Picks `min(count, distinct terms in pool)` words from `pool`.
///
/// Duplicate terms in the pool collapse to their first occurrence. Does not
/// touch the recency window; the caller records the selection.
pub fn select_words<R: Rng + ?Sized>(
    pool: &[WordItem],
    count: usize,
    mastery: &MasteryStore,
    recency: &RecencyWindow,
    w: &SelectorWeights,
    rng: &mut R,
) -> Vec<WordItem> {
    if count == 0 || pool.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let candidates: Vec<&WordItem> = pool.iter().filter(|item| seen.insert(item.term.as_str())).collect();

    let weights: Vec<f64> = candidates
        .iter()
        .map(|item| {
            word_weight(
                mastery.get(&item.term),
                recency.is_recent(&item.term),
                mastery.in_weakness_list(&item.term),
                w,
            )
        })
        .collect();

    weighted_sample(&candidates, &weights, count, rng)
        .into_iter()
        .cloned()
        .collect()
}

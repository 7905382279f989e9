//! Candidate re-ranking
//!
//! Keyword boosting on top of dense similarity, then a per-category cap so
//! one assessment type cannot crowd out the rest of the list.

use std::collections::{HashMap, HashSet};

use crate::catalog::AssessmentItem;
use crate::signal::{QuerySignal, SkillIndex};

/// One retrieved item, alive for the duration of a single request
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub position: usize,
    pub name: String,
    pub url: String,
    pub category: String,
    pub duration: u32,
    /// Raw inner-product similarity from the index
    pub base_score: f32,
    /// Score after keyword boosting; the ranking key
    pub final_score: f32,
    pub boosted: bool,
}

impl Candidate {
    pub fn new(item: &AssessmentItem, score: f32) -> Self {
        Self {
            position: item.position,
            name: item.name.clone(),
            url: item.url.clone(),
            category: item.category.clone(),
            duration: item.duration,
            base_score: score,
            final_score: score,
            boosted: false,
        }
    }
}

/// Apply `boost` to a similarity score.
///
/// Positive scores are multiplied and negative ones divided, so a boosted
/// score is never below the unboosted one.
pub fn boost_score(score: f32, boost: f32) -> f32 {
    if score >= 0.0 {
        score * boost
    } else {
        score / boost
    }
}

/// Boost candidates whose catalog text mentions a requested skill, then sort
/// by `final_score` descending. The sort is stable: ties keep retrieval order.
pub fn rank(
    mut candidates: Vec<Candidate>,
    signal: &QuerySignal,
    skills: &SkillIndex,
    boost: f32,
) -> Vec<Candidate> {
    if signal.has_skills() {
        for candidate in &mut candidates {
            if skills.matches(candidate.position, signal) {
                candidate.final_score = boost_score(candidate.base_score, boost);
                candidate.boosted = true;
            }
        }
    }

    candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    for (i, c) in candidates.iter().take(3).enumerate() {
        log::debug!(
            "  {}. {} (base {:.4}, final {:.4}{})",
            i + 1,
            c.name,
            c.base_score,
            c.final_score,
            if c.boosted { ", boosted" } else { "" }
        );
    }

    candidates
}

/// Per-category cap for a result list of `k`: `max(floor, floor(ratio * k))`
pub fn max_per_category(k: usize, ratio: f32, floor: usize) -> usize {
    let share = (f64::from(ratio) * k as f64).floor() as usize;
    share.max(floor)
}

/// Pick `min(k, len)` candidates, at most `cap` per category where possible.
///
/// First pass walks in rank order admitting candidates whose category is
/// under the cap. If that leaves fewer than `k`, a second pass appends the
/// best leftovers regardless of category. Result count beats diversity.
/// Leftovers are tracked by position, so items sharing a name are distinct.
pub fn diversify(ranked: Vec<Candidate>, k: usize, cap: usize) -> Vec<Candidate> {
    let target = k.min(ranked.len());
    let mut admitted: HashSet<usize> = HashSet::with_capacity(target);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<usize> = Vec::with_capacity(target);

    for (i, candidate) in ranked.iter().enumerate() {
        if order.len() >= target {
            break;
        }
        let count = counts.entry(candidate.category.as_str()).or_insert(0);
        if *count < cap {
            *count += 1;
            admitted.insert(candidate.position);
            order.push(i);
        }
    }

    log::debug!("Diversity distribution (cap {}): {:?}", cap, counts);

    if order.len() < target {
        let before = order.len();
        for (i, candidate) in ranked.iter().enumerate() {
            if order.len() >= target {
                break;
            }
            if admitted.insert(candidate.position) {
                order.push(i);
            }
        }
        log::debug!(
            "Backfilled {} candidates past the category cap",
            order.len() - before
        );
    }

    let mut slots: Vec<Option<Candidate>> = ranked.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

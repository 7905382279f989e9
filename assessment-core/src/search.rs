//! Recommendation pipeline
//!
//! encode -> extract signals -> blend -> retrieve -> rank -> diversify -> format.
//! Stateless per request: everything it reads lives in the `ServingContext`.

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::context::ServingContext;
use crate::error::{RecommendError, Result};
use crate::index::l2_normalize;
use crate::rank::{diversify, max_per_category, rank, Candidate};
use crate::request::validate_query;
use crate::signal::QuerySignal;

/// Public-facing result record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub url: String,
    pub test_type: String,
    pub duration: u32,
    /// Pre-boost similarity rounded to 4 places. Boosts change the order,
    /// not the displayed confidence.
    pub relevance_score: f64,
}

/// Clamp a requested result count into `[min_k, max_k]`
pub fn clamp_k(k: usize, config: &RankingConfig) -> usize {
    k.clamp(config.min_k, config.max_k)
}

/// Candidates to pull from the index for `k` results:
/// `max(multiplier * k, floor)`, never more than the catalog holds
pub fn candidate_pool_size(k: usize, catalog_len: usize, config: &RankingConfig) -> usize {
    (config.candidate_multiplier * k)
        .max(config.candidate_floor)
        .min(catalog_len)
}

fn round4(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

/// Trim to `k` and convert to result records. Empty in, empty out.
pub fn format_results(candidates: &[Candidate], k: usize) -> Vec<Recommendation> {
    candidates
        .iter()
        .take(k)
        .map(|c| Recommendation {
            name: c.name.clone(),
            url: c.url.clone(),
            test_type: c.category.clone(),
            duration: c.duration,
            relevance_score: round4(c.base_score),
        })
        .collect()
}

/// Encode the raw query and its signal-enhanced form, blend, re-normalize
pub fn encode_query(ctx: &ServingContext, query: &str, signal: &QuerySignal) -> Result<Vec<f32>> {
    let ranking = &ctx.config().ranking;
    let encoder = ctx.encoder();

    let original = encoder.encode(query)?;
    let enhanced = encoder.encode(&signal.enhanced_query(query))?;

    let mut blended: Vec<f32> = original
        .iter()
        .zip(enhanced.iter())
        .map(|(o, e)| ranking.original_weight * o + ranking.enhanced_weight * e)
        .collect();
    l2_normalize(&mut blended);
    Ok(blended)
}

/// Nearest catalog items to `vector`, as unranked candidates
pub fn retrieve(ctx: &ServingContext, vector: &[f32], k: usize) -> Result<Vec<Candidate>> {
    let top_n = candidate_pool_size(k, ctx.catalog().len(), &ctx.config().ranking);
    log::debug!("Searching index for top {} candidates", top_n);

    let hits = ctx.index().search(vector, top_n)?;
    Ok(hits
        .into_iter()
        .filter_map(|(position, score)| {
            ctx.catalog()
                .get(position)
                .map(|item| Candidate::new(item, score))
        })
        .collect())
}

/// Top-`k` recommendations for `query`.
///
/// `k` is clamped into the configured range. Returns `min(k, catalog size)`
/// records. Any failure is returned as an error, never as an empty list.
pub fn get_recommendations(
    ctx: &ServingContext,
    query: &str,
    k: usize,
) -> Result<Vec<Recommendation>> {
    let ranking = &ctx.config().ranking;
    let k = clamp_k(k, ranking);
    let query = query.trim();
    if query.is_empty() {
        return Err(RecommendError::EmptyInput);
    }

    log::info!(
        "Processing query ({} chars), requested {} recommendations",
        query.chars().count(),
        k
    );

    let signal = ctx.extractor().extract(query);
    log::debug!("Query signal: {:?}", signal);

    let vector = encode_query(ctx, query, &signal)?;

    let candidates = retrieve(ctx, &vector, k)?;
    log::debug!("Retrieved {} candidates", candidates.len());

    let ranked = rank(candidates, &signal, ctx.skills(), ranking.boost_factor);

    let cap = max_per_category(k, ranking.category_ratio, ranking.category_floor);
    let diverse = diversify(ranked, k, cap);

    let results = format_results(&diverse, k);
    log::info!("Returning {} recommendations", results.len());
    Ok(results)
}

/// Outcome of one query inside a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOutcome {
    Recommendations(Vec<Recommendation>),
    Error(String),
}

/// One batch entry; serializes as `{query, recommendations}` or `{query, error}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub query: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchEntry {
    /// Validate and run one query, capturing any failure in the entry
    pub fn run(ctx: &ServingContext, query: &str, k: usize) -> Self {
        let outcome = validate_query(query, &ctx.config().ranking)
            .and_then(|q| get_recommendations(ctx, &q, k));
        match outcome {
            Ok(recommendations) => Self {
                query: query.to_string(),
                outcome: BatchOutcome::Recommendations(recommendations),
            },
            Err(e) => {
                log::error!("Batch query failed: {}", e);
                Self::error(query, e.to_string())
            }
        }
    }

    pub fn error(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            outcome: BatchOutcome::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Error(_))
    }
}

/// Run every query independently. One failure never aborts the others;
/// the output has one entry per input, in input order.
pub fn recommend_batch<S: AsRef<str>>(
    ctx: &ServingContext,
    queries: &[S],
    k: usize,
) -> Vec<BatchEntry> {
    log::info!("Batch of {} queries", queries.len());
    let entries: Vec<BatchEntry> = queries
        .iter()
        .map(|q| BatchEntry::run(ctx, q.as_ref(), k))
        .collect();
    let failed = entries.iter().filter(|e| e.is_error()).count();
    log::info!(
        "Processed {} queries in batch ({} failed)",
        entries.len(),
        failed
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hash_context, sample_items, ItemSpec};

    fn three_item_context() -> ServingContext {
        hash_context(&[
            ItemSpec::new("/a", "Java Test", "Technical"),
            ItemSpec::new("/b", "Leadership Survey", "Behavioral"),
            ItemSpec::new("/c", "Numerical Reasoning", "Cognitive"),
        ])
    }

    #[test]
    fn test_candidate_pool_size() {
        let config = RankingConfig::default();
        assert_eq!(candidate_pool_size(5, 100, &config), 15);
        assert_eq!(candidate_pool_size(10, 100, &config), 30);
        assert_eq!(candidate_pool_size(10, 12, &config), 12);
    }

    #[test]
    fn test_clamp_k() {
        let config = RankingConfig::default();
        assert_eq!(clamp_k(1, &config), 5);
        assert_eq!(clamp_k(7, &config), 7);
        assert_eq!(clamp_k(50, &config), 10);
    }

    #[test]
    fn test_format_results_reports_base_score() {
        let mut c = Candidate::new(
            &crate::catalog::AssessmentItem {
                position: 0,
                name: "Java Test".to_string(),
                url: "/a".to_string(),
                category: "Technical".to_string(),
                duration: 30,
            },
            0.123_456,
        );
        c.final_score = 0.9;
        let results = format_results(&[c], 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 0.1235);
        assert_eq!(results[0].test_type, "Technical");
        assert_eq!(results[0].duration, 30);
        assert!(format_results(&[], 10).is_empty());
    }

    #[test]
    fn test_encode_query_blends_original_and_enhanced() {
        let ctx = three_item_context();
        let query = "Java developer";
        let signal = ctx.extractor().extract(query);
        assert!(signal.has_skills());

        let original = ctx.encoder().encode(query).unwrap();
        let enhanced = ctx.encoder().encode(&signal.enhanced_query(query)).unwrap();
        let mut expected: Vec<f32> = original
            .iter()
            .zip(enhanced.iter())
            .map(|(o, e)| 0.6 * o + 0.4 * e)
            .collect();
        l2_normalize(&mut expected);

        let blended = encode_query(&ctx, query, &signal).unwrap();
        assert_eq!(blended.len(), expected.len());
        for (got, want) in blended.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "got {}, want {}", got, want);
        }
        assert!((crate::index::norm(&blended) - 1.0).abs() < 1e-5);

        let drift: f32 = blended
            .iter()
            .zip(original.iter())
            .map(|(b, o)| (b - o).abs())
            .sum();
        assert!(drift > 1e-3);
    }

    #[test]
    fn test_small_catalog_end_to_end() {
        let ctx = three_item_context();
        let results = get_recommendations(&ctx, "Java developer", 5).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].url, "/a");
        let urls: std::collections::HashSet<&str> =
            results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn test_returns_k_results_with_bounded_scores() {
        let ctx = hash_context(&sample_items());
        for k in 5..=10 {
            let results = get_recommendations(&ctx, "Python developer with SQL", k).unwrap();
            assert_eq!(results.len(), k);
            assert!(results
                .iter()
                .all(|r| (-1.0..=1.0).contains(&r.relevance_score)));
        }
    }

    #[test]
    fn test_k_outside_range_is_clamped() {
        let ctx = hash_context(&sample_items());
        assert_eq!(get_recommendations(&ctx, "analyst", 1).unwrap().len(), 5);
        assert_eq!(get_recommendations(&ctx, "analyst", 99).unwrap().len(), 10);
    }

    #[test]
    fn test_deterministic_output() {
        let ctx = hash_context(&sample_items());
        let first = get_recommendations(&ctx, "Java developer with teamwork", 10).unwrap();
        let second = get_recommendations(&ctx, "Java developer with teamwork", 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_category_cap_for_k_10() {
        let ctx = hash_context(&sample_items());
        let results =
            get_recommendations(&ctx, "Java Python SQL JavaScript developer", 10).unwrap();
        assert_eq!(results.len(), 10);
        let technical = results.iter().filter(|r| r.test_type == "Technical").count();
        assert!(technical <= 4, "got {} technical results", technical);
    }

    #[test]
    fn test_near_empty_query_still_answers() {
        let ctx = hash_context(&sample_items());
        let results = get_recommendations(&ctx, "aaa", 10).unwrap();
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn test_blank_query_is_error_not_empty_list() {
        let ctx = three_item_context();
        assert!(matches!(
            get_recommendations(&ctx, "   ", 5),
            Err(RecommendError::EmptyInput)
        ));
    }

    #[test]
    fn test_batch_partial_failure() {
        let ctx = three_item_context();
        let entries = recommend_batch(&ctx, &["ab", "Java developer"], 5);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].query, "ab");
        match &entries[0].outcome {
            BatchOutcome::Error(msg) => assert!(msg.starts_with("Invalid query")),
            other => panic!("expected error, got {:?}", other),
        }

        match &entries[1].outcome {
            BatchOutcome::Recommendations(recs) => assert_eq!(recs[0].url, "/a"),
            other => panic!("expected recommendations, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_entry_serialization() {
        let entry = BatchEntry::error("ab", "Invalid query: too short");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["query"], "ab");
        assert_eq!(json["error"], "Invalid query: too short");
        assert!(json.get("recommendations").is_none());

        let ok = BatchEntry {
            query: "q".to_string(),
            outcome: BatchOutcome::Recommendations(vec![]),
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json["recommendations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_requests_share_context() {
        let ctx = hash_context(&sample_items());
        let expected = get_recommendations(&ctx, "Senior Java engineer", 10).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| get_recommendations(&ctx, "Senior Java engineer", 10)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap(), expected);
            }
        });
    }
}

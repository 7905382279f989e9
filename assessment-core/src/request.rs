//! Request validation
//!
//! The checks a front end applies before a query reaches the pipeline:
//! query length bounds, `top_k` normalization, batch size limits.

use serde_json::Value;

use crate::config::RankingConfig;
use crate::error::{RecommendError, Result};

/// Trim and length-check a query
pub fn validate_query(query: &str, config: &RankingConfig) -> Result<String> {
    let query = query.trim();
    let chars = query.chars().count();
    if chars < config.min_query_chars {
        return Err(RecommendError::invalid_query(format!(
            "query must be at least {} characters",
            config.min_query_chars
        )));
    }
    if chars > config.max_query_chars {
        return Err(RecommendError::invalid_query(format!(
            "query exceeds maximum length ({} characters)",
            config.max_query_chars
        )));
    }
    Ok(query.to_string())
}

/// Resolve a client-supplied `top_k`.
///
/// Missing, non-numeric, or out-of-range values all become `default_k`.
/// Numeric strings and whole floats are accepted.
pub fn normalize_top_k(value: Option<&Value>, config: &RankingConfig) -> usize {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(k) if k >= config.min_k as i64 && k <= config.max_k as i64 => k as usize,
        _ => config.default_k,
    }
}

/// Batch-level checks: non-empty and within `max_batch`
pub fn validate_batch_len(len: usize, config: &RankingConfig) -> Result<()> {
    if len == 0 {
        return Err(RecommendError::invalid_query("queries list is empty"));
    }
    if len > config.max_batch {
        return Err(RecommendError::invalid_query(format!(
            "maximum {} queries allowed",
            config.max_batch
        )));
    }
    Ok(())
}

//! Recommender configuration
//!
//! Every pipeline constant lives here with its default, so a deployment can
//! tune them from a JSON file without touching code.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RecommendError, Result};

/// Which query encoder to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    /// all-MiniLM-L6-v2 via fastembed (384d). Must match the model that built the artifacts.
    #[default]
    MiniLm,
    /// Deterministic feature-hashing encoder, no model files
    Hash,
}

impl std::str::FromStr for EncoderKind {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minilm" | "all-minilm-l6-v2" => Ok(Self::MiniLm),
            "hash" => Ok(Self::Hash),
            other => Err(RecommendError::config(format!("unknown encoder: {}", other))),
        }
    }
}

/// Ranking and request-shaping constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Candidates retrieved per requested result (default: 3)
    pub candidate_multiplier: usize,
    /// Minimum candidates retrieved regardless of k (default: 15)
    pub candidate_floor: usize,
    /// Multiplier applied to keyword-matched candidates (default: 1.3)
    pub boost_factor: f32,
    /// Weight of the raw query vector in the blend (default: 0.6)
    pub original_weight: f32,
    /// Weight of the signal-enhanced query vector in the blend (default: 0.4)
    pub enhanced_weight: f32,
    /// Maximum share of results from one category (default: 0.4)
    pub category_ratio: f32,
    /// Per-category cap never drops below this (default: 2)
    pub category_floor: usize,
    pub min_k: usize,
    pub max_k: usize,
    pub default_k: usize,
    pub min_query_chars: usize,
    pub max_query_chars: usize,
    /// Maximum queries in one batch request (default: 100)
    pub max_batch: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: 3,
            candidate_floor: 15,
            boost_factor: 1.3,
            original_weight: 0.6,
            enhanced_weight: 0.4,
            category_ratio: 0.4,
            category_floor: 2,
            min_k: 5,
            max_k: 10,
            default_k: 10,
            min_query_chars: 3,
            max_query_chars: 5000,
            max_batch: 100,
        }
    }
}

/// Top-level recommender configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Directory holding the prebuilt artifacts
    pub data_dir: PathBuf,
    pub embeddings_file: String,
    pub index_file: String,
    pub metadata_file: String,
    pub encoder: EncoderKind,
    /// Where fastembed keeps downloaded model files (discovered when unset)
    pub model_cache_dir: Option<PathBuf>,
    pub show_download_progress: bool,
    /// Memoize query embeddings (default: true)
    pub cache_embeddings: bool,
    /// Maximum memoized query embeddings (default: 4096)
    pub embedding_cache_capacity: usize,
    pub ranking: RankingConfig,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/processed"),
            embeddings_file: "embeddings.bin".to_string(),
            index_file: "index.bin".to_string(),
            metadata_file: "assessments_metadata.json".to_string(),
            encoder: EncoderKind::default(),
            model_cache_dir: None,
            show_download_progress: false,
            cache_embeddings: true,
            embedding_cache_capacity: 4096,
            ranking: RankingConfig::default(),
        }
    }
}

impl RecommenderConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RecommendError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        log::info!("Loaded recommender config from {}", path.display());
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let r = &self.ranking;
        if r.min_k == 0 || r.min_k > r.max_k {
            return Err(RecommendError::config(format!(
                "invalid k range [{}, {}]",
                r.min_k, r.max_k
            )));
        }
        if r.default_k < r.min_k || r.default_k > r.max_k {
            return Err(RecommendError::config(format!(
                "default_k {} outside [{}, {}]",
                r.default_k, r.min_k, r.max_k
            )));
        }
        if !(r.category_ratio > 0.0 && r.category_ratio <= 1.0) {
            return Err(RecommendError::config(format!(
                "category_ratio must be in (0, 1], got {}",
                r.category_ratio
            )));
        }
        if r.original_weight < 0.0
            || r.enhanced_weight < 0.0
            || r.original_weight + r.enhanced_weight <= 0.0
        {
            return Err(RecommendError::config(
                "blend weights must be non-negative with a positive sum",
            ));
        }
        if r.boost_factor < 1.0 {
            return Err(RecommendError::config(format!(
                "boost_factor must be >= 1.0, got {}",
                r.boost_factor
            )));
        }
        if r.candidate_multiplier == 0 {
            return Err(RecommendError::config("candidate_multiplier must be positive"));
        }
        if r.min_query_chars > r.max_query_chars {
            return Err(RecommendError::config("min_query_chars exceeds max_query_chars"));
        }
        Ok(())
    }

    pub fn embeddings_path(&self) -> PathBuf {
        self.data_dir.join(&self.embeddings_file)
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }
}

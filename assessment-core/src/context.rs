//! Serving context
//!
//! Everything a request reads, loaded once and immutable afterwards. Share it
//! behind an `Arc`; concurrent requests need no locking.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::RecommenderConfig;
use crate::embedding::{build_encoder, QueryEncoder};
use crate::error::{RecommendError, Result};
use crate::index::VectorIndex;
use crate::search::{get_recommendations, recommend_batch, BatchEntry, Recommendation};
use crate::signal::{SkillExtractor, SkillIndex};
use crate::storage::load_artifacts;

/// Loaded artifacts, encoder and precomputed indices
pub struct ServingContext {
    config: RecommenderConfig,
    catalog: Catalog,
    index: VectorIndex,
    extractor: SkillExtractor,
    skills: SkillIndex,
    encoder: Arc<dyn QueryEncoder>,
}

impl ServingContext {
    /// Load artifacts and the encoder named by `config`.
    ///
    /// Any failure here means the process must not serve traffic.
    pub fn load(config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        let artifacts = load_artifacts(&config)?;
        let encoder = build_encoder(&config)?;
        Self::from_parts(config, artifacts.catalog, artifacts.index, encoder)
    }

    /// Assemble from already-loaded parts, checking they agree
    pub fn from_parts(
        config: RecommenderConfig,
        catalog: Catalog,
        index: VectorIndex,
        encoder: Arc<dyn QueryEncoder>,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(RecommendError::initialization("catalog is empty"));
        }
        if catalog.len() != index.len() {
            return Err(RecommendError::initialization(format!(
                "catalog has {} items but index has {}",
                catalog.len(),
                index.len()
            )));
        }
        if encoder.dimension() != index.dimension() {
            return Err(RecommendError::initialization(format!(
                "encoder {} outputs {}d vectors, index stores {}d",
                encoder.model_name(),
                encoder.dimension(),
                index.dimension()
            )));
        }

        let extractor = SkillExtractor::new();
        let skills = SkillIndex::build(&catalog, &extractor);

        log::info!(
            "Recommender ready: {} assessments, {}d, encoder {}, {} skill tags",
            catalog.len(),
            index.dimension(),
            encoder.model_name(),
            skills.tag_count()
        );

        Ok(Self {
            config,
            catalog,
            index,
            extractor,
            skills,
            encoder,
        })
    }

    /// Top-`k` recommendations for one query
    pub fn recommend(&self, query: &str, k: usize) -> Result<Vec<Recommendation>> {
        get_recommendations(self, query, k)
    }

    /// Independent recommendations for each query
    pub fn recommend_batch<S: AsRef<str>>(&self, queries: &[S], k: usize) -> Vec<BatchEntry> {
        recommend_batch(self, queries, k)
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn skills(&self) -> &SkillIndex {
        &self.skills
    }

    pub fn encoder(&self) -> &Arc<dyn QueryEncoder> {
        &self.encoder
    }
}

//! Query encoder trait and caching wrapper

use dashmap::DashMap;
use std::sync::Arc;

use super::discovery::find_model_cache_dir;
use super::hash::HashEncoder;
use super::minilm::{MiniLmEncoder, MINILM_DIMENSION};
use crate::config::{EncoderKind, RecommenderConfig};
use crate::error::{RecommendError, Result};
use crate::index::l2_normalize;

/// Text to vector in the catalog's embedding space
pub trait QueryEncoder: Send + Sync {
    /// Model output for already-trimmed, non-empty text. Need not be normalized.
    fn embed_raw(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension
    fn dimension(&self) -> usize;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Encode `text` to a unit-length vector.
    ///
    /// Same text always yields the same vector. Fails with `EmptyInput` on
    /// empty or whitespace-only text.
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RecommendError::EmptyInput);
        }

        let mut vector = self.embed_raw(text)?;
        if vector.len() != self.dimension() {
            return Err(RecommendError::encoding(format!(
                "{} produced {} values, expected {}",
                self.model_name(),
                vector.len(),
                self.dimension()
            )));
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

/// Memoizes encoder output per exact input text.
///
/// Encoding is deterministic, so a hit returns exactly what a miss would have
/// computed. Stops inserting once `capacity` entries are held.
pub struct CachedEncoder {
    inner: Arc<dyn QueryEncoder>,
    cache: DashMap<String, Vec<f32>>,
    capacity: usize,
}

impl CachedEncoder {
    pub fn new(inner: Arc<dyn QueryEncoder>, capacity: usize) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            capacity,
        }
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl QueryEncoder for CachedEncoder {
    fn embed_raw(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }

        let embedding = self.inner.encode(text)?;
        if self.cache.len() < self.capacity {
            self.cache.insert(text.to_string(), embedding.clone());
        } else {
            log::debug!("Embedding cache full ({} entries), not caching", self.capacity);
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Construct the encoder selected by `config`
pub fn build_encoder(config: &RecommenderConfig) -> Result<Arc<dyn QueryEncoder>> {
    let encoder: Arc<dyn QueryEncoder> = match config.encoder {
        EncoderKind::MiniLm => {
            let cache_dir =
                find_model_cache_dir(config.model_cache_dir.as_deref(), &config.data_dir);
            Arc::new(MiniLmEncoder::new(cache_dir, config.show_download_progress)?)
        }
        EncoderKind::Hash => {
            log::warn!("Using hash encoder; relevance depends on artifacts built with it");
            Arc::new(HashEncoder::new(MINILM_DIMENSION))
        }
    };

    if config.cache_embeddings && config.embedding_cache_capacity > 0 {
        return Ok(Arc::new(CachedEncoder::new(
            encoder,
            config.embedding_cache_capacity,
        )));
    }
    Ok(encoder)
}

//! all-MiniLM-L6-v2 via fastembed
//!
//! The reference model for the catalog embeddings (384 dimensions).

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use std::path::PathBuf;

use super::encoder::QueryEncoder;
use crate::error::{RecommendError, Result};

pub const MINILM_MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const MINILM_DIMENSION: usize = 384;

/// Sentence encoder backed by an ONNX session.
///
/// Model calls are serialized through a mutex; concurrent requests queue on
/// the encode step and run everything else in parallel.
pub struct MiniLmEncoder {
    model: Mutex<TextEmbedding>,
}

impl MiniLmEncoder {
    /// Load the model, downloading it into `cache_dir` on first use (~90MB)
    pub fn new(cache_dir: PathBuf, show_download_progress: bool) -> Result<Self> {
        log::info!("Loading {} (cache: {})", MINILM_MODEL_NAME, cache_dir.display());

        let opts = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(show_download_progress);

        let model = TextEmbedding::try_new(opts).map_err(|e| {
            RecommendError::initialization(format!(
                "failed to load {}: {}",
                MINILM_MODEL_NAME, e
            ))
        })?;

        log::info!("Loaded {} ({}d)", MINILM_MODEL_NAME, MINILM_DIMENSION);
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl QueryEncoder for MiniLmEncoder {
    fn embed_raw(&self, text: &str) -> Result<Vec<f32>> {
        self.model
            .lock()
            .embed(vec![text], None)
            .map_err(|e| RecommendError::encoding(format!("failed to encode text: {}", e)))?
            .into_iter()
            .next()
            .ok_or_else(|| RecommendError::encoding("model returned no embeddings"))
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn model_name(&self) -> &str {
        MINILM_MODEL_NAME
    }
}

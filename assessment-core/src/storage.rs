//! Artifact loading
//!
//! Reads the three prebuilt artifacts (embedding table, flat index, metadata)
//! and checks that they line up row for row. Nothing here ever writes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::{Catalog, MetadataRecord};
use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::index::{norm, FlatIndexFile, VectorIndex};

/// Rows further than this from unit length are reported
const NORM_TOLERANCE: f32 = 1e-3;

/// On-disk shape of the embeddings artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingTable {
    pub dimension: usize,
    pub rows: Vec<Vec<f32>>,
}

/// Catalog and index loaded from disk, position-aligned
pub struct LoadedArtifacts {
    pub catalog: Catalog,
    pub index: VectorIndex,
}

/// Load every artifact named by `config` and cross-check them
pub fn load_artifacts(config: &RecommenderConfig) -> Result<LoadedArtifacts> {
    log::info!("Loading artifacts from {}", config.data_dir.display());

    let table = load_embeddings(&config.embeddings_path())?;
    let index = load_index(&config.index_path())?;
    let records = load_metadata(&config.metadata_path())?;

    if table.rows.len() != index.len() || index.len() != records.len() {
        return Err(RecommendError::initialization(format!(
            "artifact row counts disagree: embeddings={}, index={}, metadata={}",
            table.rows.len(),
            index.len(),
            records.len()
        )));
    }
    if table.dimension != index.dimension() {
        return Err(RecommendError::initialization(format!(
            "embeddings dimension {} does not match index dimension {}",
            table.dimension,
            index.dimension()
        )));
    }

    let catalog = Catalog::from_records(records);
    log::info!(
        "Artifacts loaded: {} assessments, {}d, {} categories",
        catalog.len(),
        index.dimension(),
        catalog.category_counts().len()
    );

    Ok(LoadedArtifacts { catalog, index })
}

/// Load and validate the embeddings table
pub fn load_embeddings(path: &Path) -> Result<EmbeddingTable> {
    let bytes = read_artifact(path)?;
    let table: EmbeddingTable = bincode::deserialize(&bytes).map_err(|e| {
        RecommendError::initialization(format!("corrupt embeddings {}: {}", path.display(), e))
    })?;

    if table.rows.is_empty() {
        return Err(RecommendError::initialization("embeddings table is empty"));
    }

    let mut off_norm = 0;
    for (position, row) in table.rows.iter().enumerate() {
        if row.len() != table.dimension {
            return Err(RecommendError::initialization(format!(
                "embedding row {} has dimension {}, expected {}",
                position,
                row.len(),
                table.dimension
            )));
        }
        if (norm(row) - 1.0).abs() > NORM_TOLERANCE {
            off_norm += 1;
        }
    }
    if off_norm > 0 {
        log::warn!(
            "{} of {} embeddings are not unit-norm; inner product will not equal cosine",
            off_norm,
            table.rows.len()
        );
    }

    log::info!(
        "Embeddings loaded: {} x {}",
        table.rows.len(),
        table.dimension
    );
    Ok(table)
}

/// Load and validate the flat index
pub fn load_index(path: &Path) -> Result<VectorIndex> {
    let bytes = read_artifact(path)?;
    let file: FlatIndexFile = bincode::deserialize(&bytes).map_err(|e| {
        RecommendError::initialization(format!("corrupt index {}: {}", path.display(), e))
    })?;
    let index = VectorIndex::from_file(file)?;
    if index.is_empty() {
        return Err(RecommendError::initialization("vector index is empty"));
    }
    log::info!("Vector index loaded: {} items", index.len());
    Ok(index)
}

/// Load the metadata rows in position order
pub fn load_metadata(path: &Path) -> Result<Vec<MetadataRecord>> {
    let bytes = read_artifact(path)?;
    let records: Vec<MetadataRecord> = serde_json::from_slice(&bytes).map_err(|e| {
        RecommendError::initialization(format!("corrupt metadata {}: {}", path.display(), e))
    })?;
    if records.is_empty() {
        return Err(RecommendError::initialization("metadata is empty"));
    }
    log::info!("Metadata loaded: {} assessments", records.len());
    Ok(records)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        RecommendError::initialization(format!("failed to read {}: {}", path.display(), e))
    })
}

//! Shared test fixtures: small catalogs embedded with the hash encoder

use std::path::Path;
use std::sync::Arc;

use crate::catalog::{Catalog, MetadataRecord};
use crate::config::{EncoderKind, RecommenderConfig};
use crate::context::ServingContext;
use crate::embedding::{HashEncoder, QueryEncoder, MINILM_DIMENSION};
use crate::index::{FlatIndexFile, Metric, VectorIndex};
use crate::storage::EmbeddingTable;

#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub url: String,
    pub name: String,
    pub category: String,
    pub duration: u32,
}

impl ItemSpec {
    pub fn new(url: &str, name: &str, category: &str) -> Self {
        Self {
            url: url.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            duration: 30,
        }
    }

    pub fn record(&self) -> MetadataRecord {
        MetadataRecord {
            url: self.url.clone(),
            name: self.name.clone(),
            test_type: self.category.clone(),
            duration: self.duration,
        }
    }
}

/// 14 items: 7 Technical, 4 Cognitive, 3 Behavioral
pub fn sample_items() -> Vec<ItemSpec> {
    vec![
        ItemSpec::new("/java-programming", "Java Programming Test", "Technical"),
        ItemSpec::new("/python-coding", "Python Coding Assessment", "Technical"),
        ItemSpec::new("/sql-server", "SQL Server Test", "Technical"),
        ItemSpec::new("/javascript-developer", "JavaScript Developer Test", "Technical"),
        ItemSpec::new("/cpp-programming", "C++ Programming Test", "Technical"),
        ItemSpec::new("/react-frontend", "React Frontend Test", "Technical"),
        ItemSpec::new("/docker-kubernetes", "Docker and Kubernetes Test", "Technical"),
        ItemSpec::new("/numerical-reasoning", "Numerical Reasoning", "Cognitive"),
        ItemSpec::new("/verbal-reasoning", "Verbal Reasoning", "Cognitive"),
        ItemSpec::new("/inductive-reasoning", "Inductive Reasoning", "Cognitive"),
        ItemSpec::new("/deductive-logic", "Deductive Logical Test", "Cognitive"),
        ItemSpec::new("/leadership-survey", "Leadership Survey", "Behavioral"),
        ItemSpec::new("/teamwork", "Teamwork Questionnaire", "Behavioral"),
        ItemSpec::new("/communication", "Communication Skills Assessment", "Behavioral"),
    ]
}

/// Item embeddings: the hash encoding of each item's name
pub fn embed_items(items: &[ItemSpec]) -> Vec<Vec<f32>> {
    let encoder = HashEncoder::new(MINILM_DIMENSION);
    items
        .iter()
        .map(|item| encoder.encode(&item.name).unwrap())
        .collect()
}

/// In-memory serving context over `items`
pub fn hash_context(items: &[ItemSpec]) -> ServingContext {
    let catalog = Catalog::from_records(items.iter().map(ItemSpec::record).collect());
    let index = VectorIndex::from_rows(&embed_items(items)).unwrap();
    ServingContext::from_parts(
        RecommenderConfig {
            encoder: EncoderKind::Hash,
            ..Default::default()
        },
        catalog,
        index,
        Arc::new(HashEncoder::new(MINILM_DIMENSION)),
    )
    .unwrap()
}

/// Write the three artifacts for `items` into `dir` and return a config pointing at them
pub fn write_artifacts(dir: &Path, items: &[ItemSpec]) -> RecommenderConfig {
    let rows = embed_items(items);
    let table = EmbeddingTable {
        dimension: MINILM_DIMENSION,
        rows: rows.clone(),
    };
    let index = FlatIndexFile {
        metric: Metric::InnerProduct,
        dimension: MINILM_DIMENSION,
        ntotal: rows.len(),
        data: rows.into_iter().flatten().collect(),
    };
    let records: Vec<MetadataRecord> = items.iter().map(ItemSpec::record).collect();

    let config = RecommenderConfig {
        data_dir: dir.to_path_buf(),
        encoder: EncoderKind::Hash,
        ..Default::default()
    };
    std::fs::write(config.embeddings_path(), bincode::serialize(&table).unwrap()).unwrap();
    std::fs::write(config.index_path(), bincode::serialize(&index).unwrap()).unwrap();
    std::fs::write(
        config.metadata_path(),
        serde_json::to_vec(&records).unwrap(),
    )
    .unwrap();
    config
}

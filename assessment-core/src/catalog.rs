//! Catalog metadata
//!
//! One `AssessmentItem` per catalog entry, keyed by the same dense position
//! used for its embedding row.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata row as it appears in the artifact file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub url: String,
    pub name: String,
    #[serde(alias = "category")]
    pub test_type: String,
    #[serde(default)]
    pub duration: u32,
}

/// One catalog entry, immutable while serving
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentItem {
    /// Dense 0-based index, equal to the embedding row
    pub position: usize,
    pub name: String,
    pub url: String,
    pub category: String,
    /// Minutes, 0 when unknown
    pub duration: u32,
}

impl AssessmentItem {
    /// Lower-cased name and url, the text keyword rules match against
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.url).to_lowercase()
    }
}

/// The full catalog, ordered by position
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<AssessmentItem>,
}

impl Catalog {
    /// Assign positions in row order
    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        let items = records
            .into_iter()
            .enumerate()
            .map(|(position, r)| AssessmentItem {
                position,
                name: r.name,
                url: r.url,
                category: r.test_type,
                duration: r.duration,
            })
            .collect();
        Self { items }
    }

    pub fn get(&self, position: usize) -> Option<&AssessmentItem> {
        self.items.get(position)
    }

    pub fn items(&self) -> &[AssessmentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item count per category label
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.category.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

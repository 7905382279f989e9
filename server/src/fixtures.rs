//! In-memory serving context for server tests

use std::sync::Arc;

use assessment_core::catalog::MetadataRecord;
use assessment_core::{
    Catalog, EncoderKind, HashEncoder, QueryEncoder, RecommenderConfig, ServingContext,
    VectorIndex,
};

const ITEMS: [(&str, &str, &str); 8] = [
    ("/java", "Java Programming Test", "Technical"),
    ("/python", "Python Coding Assessment", "Technical"),
    ("/sql", "SQL Database Skills", "Technical"),
    ("/numerical", "Numerical Reasoning", "Cognitive"),
    ("/verbal", "Verbal Reasoning", "Cognitive"),
    ("/leadership", "Leadership Judgement Survey", "Behavioral"),
    ("/teamwork", "Teamwork Styles Questionnaire", "Behavioral"),
    ("/personality", "Occupational Personality Profile", "Personality"),
];

pub fn context() -> Arc<ServingContext> {
    let encoder = HashEncoder::new(384);
    let records: Vec<MetadataRecord> = ITEMS
        .iter()
        .map(|(url, name, category)| MetadataRecord {
            url: url.to_string(),
            name: name.to_string(),
            test_type: category.to_string(),
            duration: 25,
        })
        .collect();
    let rows: Vec<Vec<f32>> = records
        .iter()
        .map(|r| encoder.encode(&r.name).unwrap())
        .collect();

    let ctx = ServingContext::from_parts(
        RecommenderConfig {
            encoder: EncoderKind::Hash,
            ..Default::default()
        },
        Catalog::from_records(records),
        VectorIndex::from_rows(&rows).unwrap(),
        Arc::new(encoder),
    )
    .unwrap();
    Arc::new(ctx)
}

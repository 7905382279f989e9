//! Assessment Recommender Core
//!
//! Ranks a fixed catalog of professional assessments against a free-text
//! query (typically a job description) by semantic similarity, then
//! re-ranks with keyword boosts and a per-category diversity cap.
//!
//! ## Pipeline
//!
//! 1. **Encode** the query, and a copy enriched with extracted skill signals
//! 2. **Blend** the two vectors (0.6 / 0.4) and re-normalize
//! 3. **Retrieve** `max(3k, 15)` nearest items by exact inner product
//! 4. **Rank** with a 1.3x boost for items mentioning a requested skill
//! 5. **Diversify** so no category exceeds `max(2, 0.4k)` unless needed to fill `k`
//! 6. **Format** `k` records reporting the pre-boost similarity
//!
//! ## Example
//!
//! ```ignore
//! use assessment_core::{RecommenderConfig, ServingContext};
//!
//! let ctx = ServingContext::load(RecommenderConfig::default())?;
//! for rec in ctx.recommend("Java developer who collaborates well", 10)? {
//!     println!("{} ({:.2})", rec.name, rec.relevance_score);
//! }
//! ```
//!
//! The encoder must be the model that produced the stored embeddings
//! (all-MiniLM-L6-v2 for the reference artifacts). A mismatch is not
//! detected at runtime beyond the dimension check; relevance just degrades.

pub mod catalog;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod index;
pub mod rank;
pub mod request;
pub mod search;
pub mod signal;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use catalog::{AssessmentItem, Catalog};
pub use config::{EncoderKind, RankingConfig, RecommenderConfig};
pub use context::ServingContext;
pub use embedding::{HashEncoder, QueryEncoder};
pub use error::{RecommendError, Result};
pub use index::VectorIndex;
pub use rank::Candidate;
pub use request::{normalize_top_k, validate_batch_len, validate_query};
pub use search::{get_recommendations, recommend_batch, BatchEntry, BatchOutcome, Recommendation};
pub use signal::{ExperienceLevel, QuerySignal, SkillExtractor};

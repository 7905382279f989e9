//! Query encoding
//!
//! Maps free text to a unit-length vector in the same space as the catalog
//! embeddings. The encoder must be the model that built the artifacts; a
//! different model still "works" but silently degrades relevance.

mod discovery;
mod encoder;
mod hash;
mod minilm;

pub use discovery::find_model_cache_dir;
pub use encoder::{build_encoder, CachedEncoder, QueryEncoder};
pub use hash::HashEncoder;
pub use minilm::{MiniLmEncoder, MINILM_DIMENSION, MINILM_MODEL_NAME};

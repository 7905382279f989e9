//! Model cache discovery
//!
//! Decides where fastembed keeps the downloaded model files.

use std::path::{Path, PathBuf};

/// Find the model cache directory with priority:
/// 1. Explicit `model_cache_dir` from config
/// 2. ASSESSMENT_MODELS_PATH environment variable
/// 3. `<data_dir>/models` if it already exists
/// 4. FASTEMBED_CACHE_PATH environment variable
/// 5. User cache directory (~/.cache/assessment-recommender/models)
///
/// Falls back to `.fastembed_cache` in the working directory when no home
/// directory is known.
pub fn find_model_cache_dir(explicit: Option<&Path>, data_dir: &Path) -> PathBuf {
    // Priority 1: config
    if let Some(path) = explicit {
        log::info!("Using configured model cache: {}", path.display());
        return path.to_path_buf();
    }

    // Priority 2: ASSESSMENT_MODELS_PATH
    if let Ok(models_path) = std::env::var("ASSESSMENT_MODELS_PATH") {
        let path = PathBuf::from(&models_path);
        if path.is_dir() {
            log::info!("Using ASSESSMENT_MODELS_PATH: {}", path.display());
            return path;
        }
        log::warn!(
            "ASSESSMENT_MODELS_PATH set but not a directory: {}",
            models_path
        );
    }

    // Priority 3: shipped next to the artifacts
    let bundled = data_dir.join("models");
    if bundled.is_dir() {
        log::info!("Using bundled model cache: {}", bundled.display());
        return bundled;
    }

    // Priority 4: fastembed's own variable
    if let Ok(cache_path) = std::env::var("FASTEMBED_CACHE_PATH") {
        log::info!("Using FASTEMBED_CACHE_PATH: {}", cache_path);
        return PathBuf::from(cache_path);
    }

    // Priority 5: user cache
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home)
            .join(".cache")
            .join("assessment-recommender")
            .join("models");
    }

    PathBuf::from(".fastembed_cache")
}

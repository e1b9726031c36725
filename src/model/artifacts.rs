use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::config::AppConfig;
use crate::model::linear::LinearModel;
use crate::model::{GenrePredictor, ModelError};

/// Presence of the training artifacts at their well-known paths
#[derive(Debug, Clone)]
pub struct ArtifactStatus {
    pub model_path: PathBuf,
    pub model_present: bool,
    pub metadata_path: PathBuf,
    pub metadata_present: bool,
    /// Metadata sidecar content, if present, parseable and non-empty
    pub metadata: Option<serde_json::Value>,
}

impl ArtifactStatus {
    #[must_use]
    pub fn check(config: &AppConfig) -> Self {
        let model_path = config.model_path();
        let metadata_path = config.metadata_path();
        Self {
            model_present: model_path.exists(),
            metadata_present: metadata_path.exists(),
            metadata: load_metadata(&metadata_path),
            model_path,
            metadata_path,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "model": {
                "path": self.model_path.display().to_string(),
                "present": self.model_present,
            },
            "metadata": {
                "path": self.metadata_path.display().to_string(),
                "present": self.metadata_present,
                "content": self.metadata,
            },
        })
    }
}

/// Read the metadata sidecar.
///
/// Returns `None` when the file is absent, unreadable, not JSON, or an empty
/// document; read and parse failures are logged.
#[must_use]
pub fn load_metadata(path: &Path) -> Option<serde_json::Value> {
    if !path.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).map_err(|e| e.to_string()));

    match parsed {
        Ok(value) if is_empty_document(&value) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to read metadata {}: {e}", path.display());
            None
        }
    }
}

fn is_empty_document(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Session-lifetime memo of the loaded predictor.
///
/// A failed load is not remembered, so a model written after startup is
/// picked up by the next request.
#[derive(Default)]
pub struct ModelCache {
    model: Mutex<Option<Arc<dyn GenrePredictor>>>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded = self
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("ModelCache").field("loaded", &loaded).finish()
    }
}

impl ModelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-filled with a predictor
    #[must_use]
    pub fn with_model(model: Arc<dyn GenrePredictor>) -> Self {
        Self {
            model: Mutex::new(Some(model)),
        }
    }

    /// Return the memoized model, loading it from `path` on first use
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Missing` if the artifact does not exist, or the
    /// load errors of [`LinearModel::load_from_file`].
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<dyn GenrePredictor>, ModelError> {
        let mut slot = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        if !path.exists() {
            return Err(ModelError::Missing(path.display().to_string()));
        }

        let model: Arc<dyn GenrePredictor> = Arc::new(LinearModel::load_from_file(path)?);
        tracing::info!("Loaded model artifact {}", path.display());
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }
}

//! Read/write encoder and model artifacts.
//!
//! Both are JSON documents:
//! - encoders: `{ "<field key>": ["label", ...], ... }`, code = list position
//! - model: a `models::ModelArtifact` tagged by `kind`

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::encoding::EncoderRegistry;
use crate::error::{AppError, DashError};
use crate::models::ModelArtifact;

/// Read the encoder artifact into a registry.
pub fn read_encoders_json(path: &Path) -> Result<EncoderRegistry, DashError> {
    let file = open_artifact(path)?;
    let raw: HashMap<String, Vec<String>> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| invalid(path, e.to_string()))?;
    let registry = EncoderRegistry::from_label_map(raw).map_err(|reason| invalid(path, reason))?;
    tracing::info!(path = %path.display(), "loaded encoder registry");
    Ok(registry)
}

pub fn write_encoders_json(path: &Path, registry: &EncoderRegistry) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create encoder JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &registry.to_label_map())
        .map_err(|e| AppError::new(2, format!("Failed to write encoder JSON: {e}")))?;
    Ok(())
}

/// Read the model artifact.
pub fn read_model_json(path: &Path) -> Result<ModelArtifact, DashError> {
    let file = open_artifact(path)?;
    let model: ModelArtifact =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| invalid(path, e.to_string()))?;
    tracing::info!(path = %path.display(), kind = model.kind_name(), "loaded model artifact");
    Ok(model)
}

pub fn write_model_json(path: &Path, model: &ModelArtifact) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer(file, model).map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

fn open_artifact(path: &Path) -> Result<File, DashError> {
    File::open(path).map_err(|e| DashError::MissingArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn invalid(path: &Path, reason: String) -> DashError {
    DashError::InvalidArtifact {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Field;
    use crate::models::{LinearModel, Regressor};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pangan_{}_{name}", std::process::id()))
    }

    #[test]
    fn encoders_survive_write_then_read() {
        let registry = crate::encoding::registry::tests::sample_registry();
        let path = temp_path("encoders.json");
        write_encoders_json(&path, &registry).unwrap();
        let loaded = read_encoders_json(&path).unwrap();
        assert_eq!(loaded.labels(Field::Commodity), registry.labels(Field::Commodity));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_and_invalid_artifacts() {
        let missing = temp_path("does_not_exist.json");
        assert!(matches!(read_model_json(&missing), Err(DashError::MissingArtifact { .. })));

        let path = temp_path("broken_model.json");
        std::fs::write(&path, br#"{"kind":"neural"}"#).unwrap();
        assert!(matches!(read_model_json(&path), Err(DashError::InvalidArtifact { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn model_written_and_read_back_predicts() {
        let path = temp_path("linear_model.json");
        let artifact = ModelArtifact::Linear(LinearModel {
            n_features: 1,
            intercept: 2.0,
            coefficients: vec![3.0],
        });
        write_model_json(&path, &artifact).unwrap();
        let model = read_model_json(&path).unwrap().into_regressor();
        assert_eq!(model.predict(&[2.0]).unwrap(), 8.0);
        let _ = std::fs::remove_file(&path);
    }
}

//! Process-scoped context holding the loaded artifacts.
//!
//! Every artifact slot is filled on first use and then reused for the rest of
//! the process. A load that fails leaves its slot empty, so the next access
//! tries again; a filled slot is never reloaded.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::data::{ArtifactFetcher, ArtifactUrls};
use crate::domain::FEATURE_COUNT;
use crate::encoding::EncoderRegistry;
use crate::error::{AppError, DashError};
use crate::io::table::PriceTable;
use crate::map::regions::{DEFAULT_NAME_KEY, RegionCollection};
use crate::predict::PricePredictor;

pub const DEFAULT_DATA_FILE: &str = "data_harga_komoditas.csv";
pub const DEFAULT_ENCODER_FILE: &str = "label_encoder_dict.json";
pub const DEFAULT_MODEL_FILE: &str = "model_rf_harga.json";
pub const DEFAULT_GEO_FILE: &str = "prov_38.geojson";

/// Where the artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoders: PathBuf,
    pub data: PathBuf,
    pub geo: PathBuf,
    /// GeoJSON property holding the province name.
    pub geo_key: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_FILE),
            encoders: PathBuf::from(DEFAULT_ENCODER_FILE),
            data: PathBuf::from(DEFAULT_DATA_FILE),
            geo: PathBuf::from(DEFAULT_GEO_FILE),
            geo_key: DEFAULT_NAME_KEY.to_string(),
        }
    }
}

pub struct AppContext {
    paths: ArtifactPaths,
    urls: ArtifactUrls,
    fetcher: ArtifactFetcher,
    registry: OnceLock<EncoderRegistry>,
    predictor: OnceLock<PricePredictor>,
    table: OnceLock<PriceTable>,
    regions: OnceLock<RegionCollection>,
}

impl AppContext {
    pub fn new(paths: ArtifactPaths, urls: ArtifactUrls) -> Self {
        Self {
            paths,
            urls,
            fetcher: ArtifactFetcher::new(),
            registry: OnceLock::new(),
            predictor: OnceLock::new(),
            table: OnceLock::new(),
            regions: OnceLock::new(),
        }
    }

    /// Context for `paths` with download URLs taken from the environment.
    pub fn from_env(paths: ArtifactPaths) -> Self {
        Self::new(paths, ArtifactUrls::from_env())
    }

    pub fn with_registry(self, registry: EncoderRegistry) -> Self {
        let _ = self.registry.set(registry);
        self
    }

    pub fn with_predictor(self, predictor: PricePredictor) -> Self {
        let _ = self.predictor.set(predictor);
        self
    }

    pub fn with_table(self, table: PriceTable) -> Self {
        let _ = self.table.set(table);
        self
    }

    pub fn with_regions(self, regions: RegionCollection) -> Self {
        let _ = self.regions.set(regions);
        self
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn registry(&self) -> Result<&EncoderRegistry, DashError> {
        load_once(&self.registry, || {
            self.fetcher
                .ensure_local(&self.paths.encoders, self.urls.encoders.as_deref())?;
            crate::io::artifacts::read_encoders_json(&self.paths.encoders)
        })
    }

    pub fn predictor(&self) -> Result<&PricePredictor, DashError> {
        load_once(&self.predictor, || {
            self.fetcher
                .ensure_local(&self.paths.model, self.urls.model.as_deref())?;
            let artifact = crate::io::artifacts::read_model_json(&self.paths.model)?;
            let predictor = PricePredictor::new(artifact.into_regressor());
            if predictor.n_features() != FEATURE_COUNT {
                return Err(DashError::InvalidArtifact {
                    path: self.paths.model.clone(),
                    reason: format!(
                        "model expects {} features, the dashboard supplies {FEATURE_COUNT}",
                        predictor.n_features()
                    ),
                });
            }
            Ok(predictor)
        })
    }

    pub fn table(&self) -> Result<&PriceTable, AppError> {
        load_once(&self.table, || crate::io::table::load_price_table(&self.paths.data))
    }

    pub fn regions(&self) -> Result<&RegionCollection, DashError> {
        load_once(&self.regions, || crate::io::geo::read_geojson(&self.paths.geo))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("paths", &self.paths)
            .field("registry_loaded", &self.registry.get().is_some())
            .field("predictor_loaded", &self.predictor.get().is_some())
            .field("table_loaded", &self.table.get().is_some())
            .field("regions_loaded", &self.regions.get().is_some())
            .finish()
    }
}

fn load_once<T, E>(slot: &OnceLock<T>, load: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
    if let Some(value) = slot.get() {
        return Ok(value);
    }
    let value = load()?;
    Ok(slot.get_or_init(|| value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::registry::tests::sample_registry;
    use crate::predict::predictor::tests::FakeModel;

    fn temp_paths(tag: &str) -> ArtifactPaths {
        let dir = std::env::temp_dir().join(format!("pangan_{}_{tag}", std::process::id()));
        ArtifactPaths {
            model: dir.join(DEFAULT_MODEL_FILE),
            encoders: dir.join(DEFAULT_ENCODER_FILE),
            data: dir.join(DEFAULT_DATA_FILE),
            geo: dir.join(DEFAULT_GEO_FILE),
            geo_key: DEFAULT_NAME_KEY.to_string(),
        }
    }

    #[test]
    fn injected_parts_are_served_without_touching_disk() {
        let ctx = AppContext::new(temp_paths("injected"), ArtifactUrls::default())
            .with_registry(sample_registry())
            .with_predictor(PricePredictor::new(Box::new(FakeModel)))
            .with_table(PriceTable::default());

        assert_eq!(ctx.registry().unwrap().labels(crate::domain::Field::Province).len(), 2);
        assert_eq!(ctx.predictor().unwrap().n_features(), FEATURE_COUNT);
        assert!(ctx.table().unwrap().rows.is_empty());
    }

    #[test]
    fn failed_load_stays_empty_and_is_retried() {
        let paths = temp_paths("retry");
        let _ = std::fs::remove_dir_all(paths.encoders.parent().unwrap());
        let ctx = AppContext::new(paths.clone(), ArtifactUrls::default());

        let err = ctx.registry().unwrap_err();
        assert!(matches!(err, DashError::MissingArtifact { .. }));

        std::fs::create_dir_all(paths.encoders.parent().unwrap()).unwrap();
        crate::io::artifacts::write_encoders_json(&paths.encoders, &sample_registry()).unwrap();
        let registry = ctx.registry().unwrap();
        assert_eq!(registry.labels(crate::domain::Field::Commodity).len(), 3);

        // Once filled, the slot no longer depends on the file.
        std::fs::remove_file(&paths.encoders).unwrap();
        assert!(ctx.registry().is_ok());
        let _ = std::fs::remove_dir_all(paths.encoders.parent().unwrap());
    }

    #[test]
    fn model_with_wrong_arity_is_invalid() {
        let paths = temp_paths("arity");
        std::fs::create_dir_all(paths.model.parent().unwrap()).unwrap();
        std::fs::write(
            &paths.model,
            r#"{"kind":"linear","n_features":2,"intercept":0.0,"coefficients":[1.0,1.0]}"#,
        )
        .unwrap();

        let ctx = AppContext::new(paths.clone(), ArtifactUrls::default());
        assert!(matches!(ctx.predictor(), Err(DashError::InvalidArtifact { .. })));
        let _ = std::fs::remove_dir_all(paths.model.parent().unwrap());
    }
}

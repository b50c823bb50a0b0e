//! Read/write GeoJSON boundary files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AppError, DashError};
use crate::map::regions::RegionCollection;

/// Read a GeoJSON `FeatureCollection`.
pub fn read_geojson(path: &Path) -> Result<RegionCollection, DashError> {
    let file = File::open(path).map_err(|e| DashError::MissingArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let regions: RegionCollection =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| DashError::InvalidArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    tracing::info!(path = %path.display(), features = regions.features.len(), "loaded boundaries");
    Ok(regions)
}

/// Write a GeoJSON `FeatureCollection`.
pub fn write_geojson(path: &Path, regions: &RegionCollection) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create GeoJSON '{}': {e}", path.display())))?;
    serde_json::to_writer(file, regions).map_err(|e| AppError::new(2, format!("Failed to write GeoJSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::regions::{DEFAULT_NAME_KEY, Region};

    #[test]
    fn geojson_written_then_read() {
        let path = std::env::temp_dir().join(format!("pangan_{}_regions.geojson", std::process::id()));
        let regions = RegionCollection::new(vec![Region::polygon(
            DEFAULT_NAME_KEY,
            "BALI",
            &[(115.0, -8.8), (115.7, -8.8), (115.7, -8.1), (115.0, -8.8)],
        )]);
        write_geojson(&path, &regions).unwrap();
        let back = read_geojson(&path).unwrap();
        assert_eq!(back.features.len(), 1);
        assert_eq!(back.features[0].name(DEFAULT_NAME_KEY), Some("BALI"));
        assert_eq!(back.features[0].rings()[0].len(), 4);
        let _ = std::fs::remove_file(&path);
    }
}

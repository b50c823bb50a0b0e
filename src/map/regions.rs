//! GeoJSON boundary types.
//!
//! Only the parts the dashboard reads are typed; every other member of a
//! feature or collection is carried through untouched so exports stay faithful
//! to the input file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default property holding the province name.
pub const DEFAULT_NAME_KEY: &str = "PROVINSI";

/// A polygon ring as `(lon, lat)` pairs.
pub type Ring = Vec<(f64, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    pub features: Vec<Region>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl RegionCollection {
    pub fn new(features: Vec<Region>) -> Self {
        Self {
            kind: feature_collection_type(),
            features,
            extra: Map::new(),
        }
    }

    /// `[min_lon, min_lat, max_lon, max_lat]` over every ring, if any.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let rings: Vec<Ring> = self.features.iter().flat_map(Region::rings).collect();
        bounds_of(&rings)
    }
}

/// Bounding box of `rings`; `None` when they span no area.
pub fn bounds_of<'a>(rings: impl IntoIterator<Item = &'a Ring>) -> Option<[f64; 4]> {
    let mut b = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for &(x, y) in rings.into_iter().flatten() {
        b[0] = b[0].min(x);
        b[1] = b[1].min(y);
        b[2] = b[2].max(x);
        b[3] = b[3].max(y);
    }
    if b.iter().all(|v| v.is_finite()) && b[2] > b[0] && b[3] > b[1] {
        Some(b)
    } else {
        None
    }
}

impl Region {
    /// Build a polygon feature with a single name property.
    pub fn polygon(name_key: &str, name: &str, ring: &[(f64, f64)]) -> Self {
        let coords: Vec<Value> = ring.iter().map(|&(x, y)| serde_json::json!([x, y])).collect();
        let mut properties = Map::new();
        properties.insert(name_key.to_string(), Value::String(name.to_string()));
        Self {
            kind: feature_type(),
            properties,
            geometry: serde_json::json!({ "type": "Polygon", "coordinates": [coords] }),
            extra: Map::new(),
        }
    }

    /// The region's name property, if it is a string.
    pub fn name(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// All rings of a `Polygon` or `MultiPolygon` geometry.
    ///
    /// Other geometry types (or malformed coordinates) yield no rings.
    pub fn rings(&self) -> Vec<Ring> {
        let kind = self.geometry.get("type").and_then(Value::as_str);
        let coords = self.geometry.get("coordinates");
        match (kind, coords) {
            (Some("Polygon"), Some(c)) => polygon_rings(c),
            (Some("MultiPolygon"), Some(Value::Array(polys))) => polys.iter().flat_map(polygon_rings).collect(),
            _ => Vec::new(),
        }
    }
}

fn polygon_rings(value: &Value) -> Vec<Ring> {
    let Some(rings) = value.as_array() else {
        return Vec::new();
    };
    rings
        .iter()
        .filter_map(|ring| {
            let pts: Ring = ring
                .as_array()?
                .iter()
                .filter_map(|p| {
                    let p = p.as_array()?;
                    Some((p.first()?.as_f64()?, p.get(1)?.as_f64()?))
                })
                .collect();
            (pts.len() >= 2).then_some(pts)
        })
        .collect()
}

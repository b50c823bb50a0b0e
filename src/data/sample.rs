//! Synthetic demo bundle.
//!
//! Produces every input the dashboard needs so it can run without the real
//! dataset: a wide price table, matching encoders, a small regression forest
//! and rectangular province boundaries. Generation is fully determined by the
//! seed.

use std::collections::{BTreeSet, HashMap};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FEATURE_COUNT, Field};
use crate::encoding::EncoderRegistry;
use crate::error::AppError;
use crate::io::table::{PriceRow, PriceTable};
use crate::map::regions::{Region, RegionCollection};
use crate::models::{ForestModel, ModelArtifact, RegressionTree, TreeNode};

/// (province, cities, bounding box `[min_lon, min_lat, max_lon, max_lat]`).
const PROVINCES: [(&str, &[&str], [f64; 4]); 8] = [
    ("ACEH", &["BANDA ACEH", "LHOKSEUMAWE"], [95.0, 2.0, 98.3, 6.0]),
    ("SUMATERA UTARA", &["MEDAN"], [97.0, 0.6, 100.4, 4.3]),
    ("DKI JAKARTA", &["JAKARTA PUSAT", "JAKARTA TIMUR"], [106.6, -6.4, 107.0, -6.1]),
    ("JAWA BARAT", &["BANDUNG", "BOGOR"], [106.0, -7.8, 108.8, -6.4]),
    ("JAWA TENGAH", &["SEMARANG"], [108.8, -8.2, 111.7, -6.4]),
    ("JAWA TIMUR", &["SURABAYA", "MALANG"], [111.7, -8.8, 114.4, -6.8]),
    ("BALI", &["DENPASAR"], [114.4, -8.85, 115.7, -8.05]),
    ("SULAWESI SELATAN", &["MAKASSAR"], [119.0, -6.0, 121.0, -2.0]),
];

/// Regions drawn on the map that never appear in the price table.
const UNPRICED_REGIONS: [(&str, [f64; 4]); 1] = [("PAPUA", [136.0, -9.0, 141.0, -1.0])];

/// (commodity, base price in Rupiah).
const COMMODITIES: [(&str, f64); 5] = [
    ("Beras Medium", 13_500.0),
    ("Cabai Merah Keriting", 45_000.0),
    ("Bawang Merah", 38_000.0),
    ("Gula Pasir", 17_500.0),
    ("Minyak Goreng Curah", 16_000.0),
];

/// Probability that an observation is left blank.
const MISSING_PROB: f64 = 0.03;

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    pub days: usize,
    pub end_date: NaiveDate,
    pub trees: usize,
}

#[derive(Debug, Clone)]
pub struct DemoBundle {
    pub table: PriceTable,
    pub registry: EncoderRegistry,
    pub model: ModelArtifact,
    pub regions: RegionCollection,
}

/// Files written by `write_demo_bundle`.
#[derive(Debug, Clone)]
pub struct DemoPaths {
    pub data: PathBuf,
    pub encoders: PathBuf,
    pub model: PathBuf,
    pub geo: PathBuf,
}

pub fn generate_demo(config: &DemoConfig) -> Result<DemoBundle, AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Demo day count must be > 0."));
    }
    if config.trees == 0 {
        return Err(AppError::new(2, "Demo tree count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let span = i64::try_from(config.days - 1)
        .ok()
        .and_then(Duration::try_days)
        .ok_or_else(|| AppError::new(2, format!("Demo day count {} is too large.", config.days)))?;
    let first = config
        .end_date
        .checked_sub_signed(span)
        .ok_or_else(|| AppError::new(2, format!("Demo day count {} reaches before the earliest date.", config.days)))?;
    let dates: Vec<NaiveDate> = (0..config.days).map(|i| first + Duration::days(i as i64)).collect();
    let date_headers = dates.iter().map(|d| d.format("%d/%m/%y").to_string()).collect();

    let mut rows = Vec::new();
    for (p_idx, (province, cities, _)) in PROVINCES.iter().enumerate() {
        // Eastern provinces are pricier.
        let province_factor = 1.0 + 0.04 * p_idx as f64;
        for city in cities.iter() {
            let market = format!("Pasar {}", title_case(city));
            for (commodity, base) in COMMODITIES {
                let mut level = base * province_factor * (1.0 + 0.03 * normal.sample(&mut rng));
                let prices = dates
                    .iter()
                    .map(|_| {
                        level *= 1.0 + 0.004 * normal.sample(&mut rng);
                        if rng.gen_bool(MISSING_PROB) {
                            None
                        } else {
                            Some((level / 50.0).round() * 50.0)
                        }
                    })
                    .collect();
                rows.push(PriceRow {
                    province: province.to_string(),
                    city: city.to_string(),
                    market: market.clone(),
                    commodity: commodity.to_string(),
                    prices,
                });
            }
        }
    }

    let table = PriceTable {
        dates,
        date_headers,
        rows,
    };
    let registry = registry_for(&table)?;
    let model = demo_forest(&registry, config.trees, &mut rng, &normal);
    let regions = demo_regions();

    Ok(DemoBundle {
        table,
        registry,
        model,
        regions,
    })
}

/// Write the bundle into `dir` using the default artifact file names.
pub fn write_demo_bundle(dir: &Path, bundle: &DemoBundle) -> Result<DemoPaths, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", dir.display())))?;

    let paths = DemoPaths {
        data: dir.join(crate::app::context::DEFAULT_DATA_FILE),
        encoders: dir.join(crate::app::context::DEFAULT_ENCODER_FILE),
        model: dir.join(crate::app::context::DEFAULT_MODEL_FILE),
        geo: dir.join(crate::app::context::DEFAULT_GEO_FILE),
    };

    crate::io::table::write_price_table_csv(&paths.data, &bundle.table)?;
    crate::io::artifacts::write_encoders_json(&paths.encoders, &bundle.registry)?;
    crate::io::artifacts::write_model_json(&paths.model, &bundle.model)?;
    crate::io::geo::write_geojson(&paths.geo, &bundle.regions)?;

    Ok(paths)
}

/// Sorted distinct labels per field, the way label encoders order classes.
fn registry_for(table: &PriceTable) -> Result<EncoderRegistry, AppError> {
    let mut raw: HashMap<String, Vec<String>> = HashMap::new();
    for field in Field::ALL {
        let labels: BTreeSet<&str> = table
            .rows
            .iter()
            .map(|r| match field {
                Field::Province => r.province.as_str(),
                Field::City => r.city.as_str(),
                Field::Market => r.market.as_str(),
                Field::Commodity => r.commodity.as_str(),
            })
            .collect();
        raw.insert(
            field.artifact_key().to_string(),
            labels.into_iter().map(str::to_string).collect(),
        );
    }
    EncoderRegistry::from_label_map(raw).map_err(|e| AppError::new(4, format!("Demo encoder error: {e}")))
}

/// A forest whose trees route on the commodity code, then weekday/weekend and
/// first/second half of the month.
fn demo_forest(registry: &EncoderRegistry, trees: usize, rng: &mut StdRng, normal: &Normal<f64>) -> ModelArtifact {
    let bases: Vec<f64> = registry
        .labels(Field::Commodity)
        .iter()
        .map(|label| {
            COMMODITIES
                .iter()
                .find(|(name, _)| name == label)
                .map_or(10_000.0, |(_, base)| *base)
        })
        .collect();

    let trees = (0..trees)
        .map(|_| {
            let jitter: Vec<f64> = bases
                .iter()
                .map(|b| b * (1.0 + 0.02 * normal.sample(rng)))
                .collect();
            let mut nodes = Vec::new();
            build_commodity_range(&mut nodes, &jitter, 0, jitter.len());
            RegressionTree { nodes }
        })
        .collect();

    ModelArtifact::Forest(ForestModel {
        n_features: FEATURE_COUNT,
        trees,
    })
}

/// Append the subtree for commodity codes `lo..hi`; returns its root index.
fn build_commodity_range(nodes: &mut Vec<TreeNode>, bases: &[f64], lo: usize, hi: usize) -> usize {
    let idx = nodes.len();
    nodes.push(TreeNode::Leaf { value: 0.0 });

    if hi - lo <= 1 {
        let base = bases.get(lo).copied().unwrap_or(0.0);
        let weekday = build_calendar_leaf(nodes, base);
        let weekend = build_calendar_leaf(nodes, base * 1.03);
        nodes[idx] = TreeNode::Split {
            feature: 6,
            threshold: 4.5,
            left: weekday,
            right: weekend,
        };
        return idx;
    }

    let mid = lo + (hi - lo) / 2;
    let left = build_commodity_range(nodes, bases, lo, mid);
    let right = build_commodity_range(nodes, bases, mid, hi);
    nodes[idx] = TreeNode::Split {
        feature: 3,
        threshold: mid as f64 - 0.5,
        left,
        right,
    };
    idx
}

fn build_calendar_leaf(nodes: &mut Vec<TreeNode>, base: f64) -> usize {
    let idx = nodes.len();
    nodes.push(TreeNode::Split {
        feature: 4,
        threshold: 15.5,
        left: idx + 1,
        right: idx + 2,
    });
    nodes.push(TreeNode::Leaf { value: base });
    nodes.push(TreeNode::Leaf { value: base * 1.01 });
    idx
}

fn demo_regions() -> RegionCollection {
    let boxes = PROVINCES
        .iter()
        .map(|(name, _, bbox)| (*name, *bbox))
        .chain(UNPRICED_REGIONS);
    let features = boxes
        .map(|(name, [x0, y0, x1, y1])| {
            Region::polygon(
                crate::map::regions::DEFAULT_NAME_KEY,
                &title_case(name),
                &[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)],
            )
        })
        .collect();
    RegionCollection::new(features)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

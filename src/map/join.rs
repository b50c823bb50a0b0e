//! Attach per-province aggregates to map regions.

use std::collections::HashMap;

use crate::domain::{ProvinceAggregate, RegionPrice};
use crate::map::aggregate::normalize_province;
use crate::map::regions::{Region, RegionCollection};

/// Property written onto every joined region.
pub const PRICE_PROPERTY: &str = "price";

/// A region with its joined price.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRegion {
    /// Normalized province name ("" when the region has no name property).
    pub name: String,
    pub price: RegionPrice,
    /// Copy of the input region with `PRICE_PROPERTY` set.
    pub region: Region,
}

/// Join `aggregates` onto `regions` by normalized province name.
///
/// Regions without a matching aggregate get `RegionPrice::Unavailable`; partial
/// coverage is a normal result.
pub fn join(regions: &[Region], aggregates: &[ProvinceAggregate], name_key: &str) -> Vec<AnnotatedRegion> {
    let lookup: HashMap<String, f64> = aggregates
        .iter()
        .map(|a| (normalize_province(&a.province), a.price))
        .collect();

    regions
        .iter()
        .map(|region| {
            let name = region.name(name_key).map(normalize_province);
            let price = name
                .as_ref()
                .and_then(|n| lookup.get(n))
                .map_or(RegionPrice::Unavailable, |&p| RegionPrice::Available(p));
            let name = name.unwrap_or_default();

            let mut region = region.clone();
            region
                .properties
                .insert(PRICE_PROPERTY.to_string(), price.to_json());

            AnnotatedRegion { name, price, region }
        })
        .collect()
}

/// Reassemble joined regions into a collection for export.
pub fn to_collection(annotated: &[AnnotatedRegion]) -> RegionCollection {
    RegionCollection::new(annotated.iter().map(|a| a.region.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NO_DATA_LABEL;
    use crate::map::regions::DEFAULT_NAME_KEY;

    fn square(name: &str) -> Region {
        Region::polygon(DEFAULT_NAME_KEY, name, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])
    }

    fn agg(province: &str, price: f64) -> ProvinceAggregate {
        ProvinceAggregate {
            province: province.to_string(),
            price,
        }
    }

    #[test]
    fn unmatched_region_gets_marker() {
        let regions = vec![square("jawa barat")];
        let out = join(&regions, &[agg("ACEH", 1.0), agg("BALI", 2.0)], DEFAULT_NAME_KEY);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "JAWA BARAT");
        assert_eq!(out[0].price, RegionPrice::Unavailable);
        assert_eq!(out[0].region.properties[PRICE_PROPERTY], NO_DATA_LABEL);
    }

    #[test]
    fn match_is_case_insensitive_and_keeps_other_properties() {
        let regions = vec![square("Bali"), square("Aceh")];
        let out = join(&regions, &[agg("BALI", 15_500.0)], DEFAULT_NAME_KEY);
        assert_eq!(out[0].price, RegionPrice::Available(15_500.0));
        assert_eq!(out[0].region.properties[PRICE_PROPERTY], 15_500.0);
        assert_eq!(out[0].region.properties[DEFAULT_NAME_KEY], "Bali");
        assert_eq!(out[1].price, RegionPrice::Unavailable);
        // Input stays untouched.
        assert!(!regions[0].properties.contains_key(PRICE_PROPERTY));
    }

    #[test]
    fn padded_region_name_matches() {
        let out = join(&[square(" Jawa Barat ")], &[agg("JAWA BARAT", 9_000.0)], DEFAULT_NAME_KEY);
        assert_eq!(out[0].name, "JAWA BARAT");
        assert_eq!(out[0].price, RegionPrice::Available(9_000.0));
    }

    #[test]
    fn region_without_name_is_unavailable() {
        let mut nameless = square("x");
        nameless.properties.clear();
        let out = join(&[nameless], &[agg("", 1.0)], DEFAULT_NAME_KEY);
        assert_eq!(out[0].name, "");
        assert_eq!(out[0].price, RegionPrice::Unavailable);
        let out = join(&[square("x")], &[], DEFAULT_NAME_KEY);
        assert_eq!(out[0].price, RegionPrice::Unavailable);
        assert_eq!(to_collection(&out).features.len(), 1);
    }
}

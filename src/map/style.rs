//! Choropleth styling.
//!
//! A region's color is a pure function of its price and the price range of
//! the current map: the range is split into equal buckets over a viridis-like
//! palette. Regions without data get a neutral outline and no fill.

use ratatui::style::Color;

use crate::domain::{ProvinceAggregate, RegionPrice};

/// Viridis, darkest (cheapest) to brightest (most expensive).
pub const PALETTE: [Color; 5] = [
    Color::Rgb(68, 1, 84),
    Color::Rgb(59, 82, 139),
    Color::Rgb(33, 145, 140),
    Color::Rgb(94, 201, 98),
    Color::Rgb(253, 231, 37),
];

pub const NO_DATA_COLOR: Color = Color::DarkGray;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStyle {
    pub color: Color,
    pub filled: bool,
}

/// `(min, max)` over the aggregate prices.
pub fn price_range(aggregates: &[ProvinceAggregate]) -> Option<(f64, f64)> {
    let mut iter = aggregates.iter().map(|a| a.price);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

pub fn region_style(price: RegionPrice, range: Option<(f64, f64)>) -> RegionStyle {
    match (price, range) {
        (RegionPrice::Available(p), Some(range)) => RegionStyle {
            color: PALETTE[bucket(p, range)],
            filled: true,
        },
        (RegionPrice::Available(_), None) => RegionStyle {
            color: PALETTE[0],
            filled: true,
        },
        (RegionPrice::Unavailable, _) => RegionStyle {
            color: NO_DATA_COLOR,
            filled: false,
        },
    }
}

/// Palette index for `price` within `(lo, hi)`.
pub fn bucket(price: f64, (lo, hi): (f64, f64)) -> usize {
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) {
        return 0;
    }
    let u = ((price - lo) / span).clamp(0.0, 1.0);
    ((u * PALETTE.len() as f64) as usize).min(PALETTE.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_span_the_palette() {
        let range = (10_000.0, 20_000.0);
        assert_eq!(bucket(10_000.0, range), 0);
        assert_eq!(bucket(14_000.0, range), 2);
        assert_eq!(bucket(20_000.0, range), PALETTE.len() - 1);
        assert_eq!(bucket(99_999.0, range), PALETTE.len() - 1);
        assert_eq!(bucket(5.0, (3.0, 3.0)), 0);
    }

    #[test]
    fn unavailable_regions_are_not_filled() {
        let style = region_style(RegionPrice::Unavailable, Some((1.0, 2.0)));
        assert_eq!(style, RegionStyle { color: NO_DATA_COLOR, filled: false });
        let style = region_style(RegionPrice::Available(2.0), Some((1.0, 2.0)));
        assert!(style.filled);
        assert_eq!(style.color, PALETTE[4]);
    }

    #[test]
    fn range_over_aggregates() {
        let aggs = [
            ProvinceAggregate { province: "A".to_string(), price: 3.0 },
            ProvinceAggregate { province: "B".to_string(), price: 1.0 },
        ];
        assert_eq!(price_range(&aggs), Some((1.0, 3.0)));
        assert_eq!(price_range(&[]), None);
    }
}

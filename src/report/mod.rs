//! Reporting utilities: province rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::ProvinceAggregate;

/// Cheapest/priciest provinces (top-N each side).
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceRankings {
    pub cheapest: Vec<ProvinceAggregate>,
    pub priciest: Vec<ProvinceAggregate>,
}

/// Rank provinces by their aggregate price.
pub fn rank_provinces(aggregates: &[ProvinceAggregate], top_n: usize) -> ProvinceRankings {
    let mut sorted = aggregates.to_vec();
    sorted.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));

    let cheapest = sorted.iter().take(top_n).cloned().collect();
    let priciest = sorted.iter().rev().take(top_n).cloned().collect();

    ProvinceRankings { cheapest, priciest }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(province: &str, price: f64) -> ProvinceAggregate {
        ProvinceAggregate {
            province: province.to_string(),
            price,
        }
    }

    #[test]
    fn rank_provinces_basic() {
        let aggregates = vec![agg("ACEH", 12_000.0), agg("BALI", 15_000.0), agg("PAPUA", 18_500.0)];
        let rankings = rank_provinces(&aggregates, 1);
        assert_eq!(rankings.cheapest, vec![agg("ACEH", 12_000.0)]);
        assert_eq!(rankings.priciest, vec![agg("PAPUA", 18_500.0)]);

        let all = rank_provinces(&aggregates, 10);
        assert_eq!(all.cheapest.len(), 3);
        assert_eq!(all.priciest[0].province, "PAPUA");
    }
}

//! Day-over-day comparison of two predicted prices.

use crate::domain::{Direction, TrendComparison, TrendLabel};

/// Classify the move from `today` to `tomorrow`.
///
/// Equality is exact: two model outputs that differ in the last bit are
/// reported as a move, not as stable.
pub fn compare(today: f64, tomorrow: f64) -> TrendComparison {
    let direction = if tomorrow > today {
        Direction::Up
    } else if tomorrow < today {
        Direction::Down
    } else {
        Direction::Stable
    };

    TrendComparison {
        direction,
        series: [(TrendLabel::Today, today), (TrendLabel::Tomorrow, tomorrow)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_prices_are_stable() {
        let cmp = compare(15_000.0, 15_000.0);
        assert_eq!(cmp.direction, Direction::Stable);
        assert_eq!(
            cmp.series,
            [(TrendLabel::Today, 15_000.0), (TrendLabel::Tomorrow, 15_000.0)]
        );
    }

    #[test]
    fn up_and_down() {
        assert_eq!(compare(100.0, 101.0).direction, Direction::Up);
        assert_eq!(compare(101.0, 100.0).direction, Direction::Down);
    }

    #[test]
    fn exactly_one_direction_for_nearby_values() {
        let base = 12_345.678_f64;
        let next = f64::from_bits(base.to_bits() + 1);
        for (a, b) in [(base, next), (next, base), (base, base), (0.0, -0.0)] {
            let d = compare(a, b).direction;
            let expected = if b > a {
                Direction::Up
            } else if b < a {
                Direction::Down
            } else {
                Direction::Stable
            };
            assert_eq!(d, expected);
            assert_eq!(d == Direction::Stable, a == b);
        }
    }
}

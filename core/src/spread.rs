use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::error::EngineError;
use crate::types::Venue;

/// Percentage spread of `a` over `b`: `(a - b) / b * 100`.
///
/// Not symmetric — the sign says which side trades higher, and the
/// magnitude depends on which price is the denominator.
pub fn spread_pct(a: Decimal, b: Decimal) -> Decimal {
    (a - b) / b * dec!(100)
}

/// Pick the unordered venue pair with the largest absolute spread.
///
/// Pairs are enumerated in `Venue::ALL` order and only a strictly greater
/// absolute spread replaces the running best, so ties resolve to the
/// earliest-enumerated pair. Venues with an unknown (zero) price are
/// skipped; fewer than two usable prices is `InsufficientVenues`.
pub fn best_spread_pair(
    prices: &HashMap<Venue, Decimal>,
) -> Result<(Venue, Venue), EngineError> {
    let mut best: Option<(Venue, Venue, Decimal)> = None;

    for (i, &a) in Venue::ALL.iter().enumerate() {
        let Some(&price_a) = prices.get(&a) else { continue };
        if price_a <= Decimal::ZERO {
            continue;
        }
        for &b in &Venue::ALL[i + 1..] {
            let Some(&price_b) = prices.get(&b) else { continue };
            if price_b <= Decimal::ZERO {
                continue;
            }
            let magnitude = spread_pct(price_a, price_b).abs();
            if best.as_ref().map_or(true, |(_, _, m)| magnitude > *m) {
                best = Some((a, b, magnitude));
            }
        }
    }

    best.map(|(a, b, _)| (a, b))
        .ok_or(EngineError::InsufficientVenues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(entries: &[(Venue, Decimal)]) -> HashMap<Venue, Decimal> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn spread_is_zero_iff_prices_equal() {
        assert_eq!(spread_pct(dec!(90000), dec!(90000)), Decimal::ZERO);
        assert_ne!(spread_pct(dec!(90000), dec!(90001)), Decimal::ZERO);
    }

    #[test]
    fn spread_sign_flips_when_roles_swap() {
        let ab = spread_pct(dec!(90000), dec!(90200));
        let ba = spread_pct(dec!(90200), dec!(90000));
        assert!(ab < Decimal::ZERO);
        assert!(ba > Decimal::ZERO);
        // Magnitudes differ because the denominator changes.
        assert_ne!(ab.abs(), ba.abs());
    }

    #[test]
    fn widest_pair_wins() {
        let map = prices(&[
            (Venue::Uniswap, dec!(90000)),
            (Venue::Aerodrome, dec!(89900)),
            (Venue::Pancake, dec!(90200)),
        ]);
        // |(89900 - 90200) / 90200| ~ 0.333% beats every other pair.
        assert_eq!(
            best_spread_pair(&map).unwrap(),
            (Venue::Aerodrome, Venue::Pancake)
        );
    }

    #[test]
    fn ties_resolve_to_earliest_enumerated_pair() {
        let map = prices(&[
            (Venue::Uniswap, dec!(100)),
            (Venue::Aerodrome, dec!(110)),
            (Venue::Pancake, dec!(110)),
        ]);
        // (Uniswap, Aerodrome) and (Uniswap, Pancake) tie exactly.
        assert_eq!(
            best_spread_pair(&map).unwrap(),
            (Venue::Uniswap, Venue::Aerodrome)
        );
    }

    #[test]
    fn unknown_prices_are_skipped() {
        let map = prices(&[
            (Venue::Uniswap, dec!(0)),
            (Venue::Aerodrome, dec!(89900)),
            (Venue::Pancake, dec!(90200)),
        ]);
        assert_eq!(
            best_spread_pair(&map).unwrap(),
            (Venue::Aerodrome, Venue::Pancake)
        );
    }

    #[test]
    fn fewer_than_two_known_prices_is_insufficient() {
        let map = prices(&[(Venue::Uniswap, dec!(90000))]);
        assert!(matches!(
            best_spread_pair(&map),
            Err(EngineError::InsufficientVenues)
        ));

        assert!(matches!(
            best_spread_pair(&HashMap::new()),
            Err(EngineError::InsufficientVenues)
        ));
    }
}

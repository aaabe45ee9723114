use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::EngineError;

/// Binary scale of the raw encoding: prices arrive as sqrt(price) * 2^96.
const SQRT_SCALE_BITS: u32 = 96;

/// Parse a raw sqrt-price sample from its wire form.
///
/// Accepts a `0x`-prefixed hex string (the form log payloads arrive in) or
/// a plain decimal string. Signs, fractions and anything else that is not
/// an unsigned integer fail with `InvalidSample`.
pub fn parse_raw_sample(text: &str) -> Result<BigUint, EngineError> {
    let trimmed = text.trim();
    let (digits, radix) = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(rest) => (rest, 16u32),
        None => (trimmed, 10u32),
    };
    if digits.is_empty() || digits.starts_with('+') || digits.starts_with('-') {
        return Err(EngineError::InvalidSample(trimmed.to_string()));
    }
    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| EngineError::InvalidSample(trimmed.to_string()))
}

/// Derive the price of one base unit in quote units from a raw sqrt-price
/// sample.
///
/// The squared sample stays in arbitrary precision; the one narrowing step
/// is the final division of the two big integers:
///
/// ```text
/// ratio = S^2 * 10^quote_decimals / (2^192 * 10^base_decimals)
/// ```
///
/// When `is_inverted` the pool's token0 is the quote asset, so `ratio` reads
/// base-per-quote and the reciprocal is returned.
///
/// A zero sample yields `Decimal::ZERO` for the non-inverted case (callers
/// treat zero as "unknown"); inverting zero is undefined and fails with
/// `UnavailablePrice`, as does a ratio that cannot be represented.
pub fn derive_price(
    sample: &BigUint,
    is_inverted: bool,
    base_decimals: u32,
    quote_decimals: u32,
) -> Result<Decimal, EngineError> {
    if sample.is_zero() {
        return if is_inverted {
            Err(EngineError::UnavailablePrice)
        } else {
            Ok(Decimal::ZERO)
        };
    }

    let ten = BigUint::from(10u32);
    let numerator = sample * sample * ten.pow(quote_decimals);
    let denominator =
        (BigUint::one() << (2 * SQRT_SCALE_BITS as usize)) * ten.pow(base_decimals);

    let num_f = numerator.to_f64().unwrap_or(f64::INFINITY);
    let den_f = denominator.to_f64().unwrap_or(f64::INFINITY);
    let mut ratio = num_f / den_f;

    if !ratio.is_finite() {
        return Err(EngineError::UnavailablePrice);
    }
    if is_inverted {
        if ratio == 0.0 {
            return Err(EngineError::UnavailablePrice);
        }
        ratio = 1.0 / ratio;
    }

    Decimal::from_f64(ratio).ok_or(EngineError::UnavailablePrice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(value: u128) -> BigUint {
        BigUint::from(value)
    }

    #[test]
    fn unit_sqrt_price_reduces_to_decimal_shift() {
        // S = 2^96 squares to exactly the scale, leaving only the
        // 10^quote / 10^base adjustment: 10^(6-8) = 0.01.
        let s = BigUint::one() << 96;
        let price = derive_price(&s, false, 8, 6).unwrap();
        assert!((price - dec!(0.01)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn derive_price_is_monotonic_in_sample() {
        let samples = [
            2_500_000_000_000_000_000_000_000_000u128,
            2_600_000_000_000_000_000_000_000_000,
            5_000_000_000_000_000_000_000_000_000,
            79_228_162_514_264_337_593_543_950_336, // 2^96
        ];
        let mut last = Decimal::MIN;
        for raw in samples {
            let price = derive_price(&sample(raw), false, 8, 6).unwrap();
            assert!(price > last, "price not increasing at sample {}", raw);
            last = price;
        }
    }

    #[test]
    fn inverted_price_is_reciprocal_of_direct() {
        let s = sample(7_922_816_251_426_433_759_354_395_034u128); // ~0.1 of the scale
        let direct = derive_price(&s, false, 8, 6).unwrap();
        let inverted = derive_price(&s, true, 8, 6).unwrap();
        let recip = Decimal::ONE / direct;
        assert!((inverted - recip).abs() / recip < dec!(0.0000001));
    }

    #[test]
    fn zero_sample_is_zero_when_not_inverted() {
        assert_eq!(
            derive_price(&BigUint::zero(), false, 8, 6).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn zero_sample_is_unavailable_when_inverted() {
        assert!(matches!(
            derive_price(&BigUint::zero(), true, 8, 6),
            Err(EngineError::UnavailablePrice)
        ));
    }

    #[test]
    fn parse_accepts_hex_and_decimal() {
        assert_eq!(parse_raw_sample("0xff").unwrap(), sample(255));
        assert_eq!(parse_raw_sample("255").unwrap(), sample(255));
        assert_eq!(
            parse_raw_sample("0x1000000000000000000000000").unwrap(),
            BigUint::one() << 96
        );
    }

    #[test]
    fn parse_rejects_signs_and_garbage() {
        for bad in ["-255", "+255", "12.5", "0x", "", "abc", "0xzz"] {
            assert!(
                matches!(parse_raw_sample(bad), Err(EngineError::InvalidSample(_))),
                "expected InvalidSample for {:?}",
                bad
            );
        }
    }
}

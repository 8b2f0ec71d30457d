//! Currency unit scaling. The wire carries minor units: major × 100.

use serde_json::Value as JsonValue;
use vnpay_types::constants::AMOUNT_SCALE;

use crate::error::ValidationError;

/// Largest integer an f64 represents exactly
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Major units to wire units. Zero and overflow are rejected.
pub fn scale_for_transmission(amount: u64) -> Result<u64, ValidationError> {
    if amount == 0 {
        return Err(ValidationError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }
    amount.checked_mul(AMOUNT_SCALE).ok_or_else(|| {
        ValidationError::InvalidAmount(format!("amount {} overflows once scaled", amount))
    })
}

/// Wire units back to major units. A remainder below one major unit is rejected.
pub fn decode_amount(minor: u64) -> Result<u64, ValidationError> {
    if minor % AMOUNT_SCALE != 0 {
        return Err(ValidationError::InvalidAmount(format!(
            "{} is not a whole number of major units",
            minor
        )));
    }
    Ok(minor / AMOUNT_SCALE)
}

/// Read a wire amount that may arrive as a JSON number or a numeric string
pub fn parse_amount(value: &JsonValue) -> Result<u64, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(value.to_string());
    match value {
        JsonValue::Number(n) => match n.as_u64() {
            Some(u) => Ok(u),
            None => n.as_f64().and_then(whole_float).ok_or_else(invalid),
        },
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(u) = s.parse::<u64>() {
                return Ok(u);
            }
            s.parse::<f64>().ok().and_then(whole_float).ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn whole_float(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= MAX_EXACT_FLOAT).then_some(f as u64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scale_multiplies_by_100_once() {
        assert_eq!(scale_for_transmission(100_000), Ok(10_000_000));
        assert_eq!(scale_for_transmission(1), Ok(100));
    }

    #[test]
    fn test_scale_rejects_zero_and_overflow() {
        assert!(matches!(
            scale_for_transmission(0),
            Err(ValidationError::InvalidAmount(_))
        ));
        assert!(matches!(
            scale_for_transmission(u64::MAX / 10),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        for amount in [1, 99, 100, 10_000, 100_000, 123_456_789, u64::MAX / 100] {
            assert_eq!(
                decode_amount(scale_for_transmission(amount).unwrap()),
                Ok(amount)
            );
        }
    }

    #[test]
    fn test_decode_rejects_fractional_minor_units() {
        assert_eq!(decode_amount(0), Ok(0));
        for minor in [1, 99, 10_000_099, 10_000_050] {
            assert!(matches!(
                decode_amount(minor),
                Err(ValidationError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn test_parse_amount_accepts_strings_and_numbers() {
        assert_eq!(parse_amount(&json!("10000000")), Ok(10_000_000));
        assert_eq!(parse_amount(&json!(" 10000000 ")), Ok(10_000_000));
        assert_eq!(parse_amount(&json!("10000000.0")), Ok(10_000_000));
        assert_eq!(parse_amount(&json!(10000000)), Ok(10_000_000));
        assert_eq!(parse_amount(&json!(10000000.0)), Ok(10_000_000));
    }

    #[test]
    fn test_parse_amount_rejects_non_numeric() {
        for value in [
            json!("abc"),
            json!(""),
            json!("-100"),
            json!("100.5"),
            json!("NaN"),
            json!(-1),
            json!(null),
            json!(true),
            json!(["100"]),
        ] {
            assert!(
                matches!(parse_amount(&value), Err(ValidationError::InvalidAmount(_))),
                "{}",
                value
            );
        }
    }
}

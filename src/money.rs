use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::error::ApiError;

/// Largest magnitude a `NUMERIC(10,2)` column accepts.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2); // 99_999_999.99

/// Checks a user-supplied money value and normalizes it to cents.
pub fn validate_amount(field: &str, value: Decimal) -> Result<Decimal, ApiError> {
    if value < Decimal::ZERO {
        return Err(ApiError::BadRequest(format!("{field} must not be negative")));
    }
    let value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if value > MAX_AMOUNT {
        return Err(ApiError::BadRequest(format!("{field} is too large")));
    }
    Ok(value)
}

/// `round(part / whole * 100)`, or 0 when `whole` is not positive.
pub fn percentage(part: Decimal, whole: Decimal) -> i64 {
    if whole <= Decimal::ZERO {
        return 0;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn max_amount_constant_matches_column() {
        assert_eq!(MAX_AMOUNT, d("99999999.99"));
    }

    #[test]
    fn validate_amount_rounds_and_rejects() {
        assert_eq!(validate_amount("amount", d("12.345")).unwrap(), d("12.35"));
        assert_eq!(validate_amount("amount", d("0")).unwrap(), d("0"));
        assert!(matches!(
            validate_amount("amount", d("-1")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_amount("amount", d("100000000")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(d("1"), d("8")), 13); // 12.5
        assert_eq!(percentage(d("50"), d("200")), 25);
        assert_eq!(percentage(d("300"), d("200")), 150);
        assert_eq!(percentage(d("5"), d("0")), 0);
    }
}

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::SaccoError;
use crate::SaccoResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.36 = 36%). Never as percentages.
pub type Rate = Decimal;

/// Display currency for every amount the SACCO quotes.
pub const CURRENCY_CODE: &str = "KES";

/// Round to cents, half away from zero.
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to cents and clamp at zero. Balances are never negative.
pub fn clamp_balance(balance: Money) -> Money {
    round_cents(balance).max(Decimal::ZERO)
}

/// Error for a computation whose result leaves the range of `Decimal`.
pub fn out_of_range(field: &str) -> SaccoError {
    SaccoError::InvalidInput {
        field: field.to_string(),
        reason: "Value exceeds the representable range".into(),
    }
}

/// Sum `values`, returning an error for `field` instead of overflowing.
pub fn checked_sum<I>(values: I, field: &str) -> SaccoResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v).ok_or_else(|| out_of_range(field)))
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_cents_half_up() {
        assert_eq!(round_cents(dec!(340.005)), dec!(340.01));
        assert_eq!(round_cents(dec!(666.666666)), dec!(666.67));
    }

    #[test]
    fn test_clamp_balance_never_negative() {
        assert_eq!(clamp_balance(dec!(-0.004)), Decimal::ZERO);
        assert_eq!(clamp_balance(dec!(-12.5)), Decimal::ZERO);
        assert_eq!(clamp_balance(dec!(0.006)), dec!(0.01));
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        assert_eq!(checked_sum([dec!(1.5), dec!(2.25)], "x").unwrap(), dec!(3.75));
        let err = checked_sum([Decimal::MAX, Decimal::ONE], "payment").unwrap_err();
        assert!(err.to_string().contains("payment"));
    }
}

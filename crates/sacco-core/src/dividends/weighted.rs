//! Member dividends on time-weighted monthly contributions.
//!
//! A shilling contributed in January earns for the full year, one
//! contributed in December for a single month, so each month's deposit is
//! weighted by the months it remains invested before the annual rate is
//! applied.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SaccoError;
use crate::types::{checked_sum, out_of_range, with_metadata, ComputationOutput, Money};
use crate::SaccoResult;

/// Weight of a full-year contribution.
const FULL_YEAR_WEIGHT: Decimal = dec!(12);

pub const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendInput {
    /// Contributions January through December. Months with no deposit are zero.
    pub monthly_contributions: [Money; 12],
    /// Declared dividend rate as a percentage (10 = 10%).
    pub dividend_rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendOutput {
    pub total_contribution: Money,
    /// Sum of each contribution times its months invested.
    pub weighted_contribution: Money,
    pub dividend: Money,
}

/// Months a contribution made in month `index` (0 = January) stays invested.
fn weight(index: usize) -> Decimal {
    Decimal::from(12 - index as u32)
}

pub fn calculate_dividend(input: &DividendInput) -> SaccoResult<ComputationOutput<DividendOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.dividend_rate_percent < Decimal::ZERO {
        return Err(SaccoError::InvalidInput {
            field: "dividend_rate_percent".into(),
            reason: "Please enter a valid dividend rate (must be >= 0)".into(),
        });
    }
    for (i, c) in input.monthly_contributions.iter().enumerate() {
        if *c < Decimal::ZERO {
            return Err(SaccoError::InvalidInput {
                field: format!("monthly_contributions.{}", MONTH_NAMES[i]),
                reason: "Contribution cannot be negative".into(),
            });
        }
    }

    let total_contribution = checked_sum(input.monthly_contributions, "monthly_contributions")?;
    let weighted = input
        .monthly_contributions
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.checked_mul(weight(i))
                .ok_or_else(|| out_of_range(&format!("monthly_contributions.{}", MONTH_NAMES[i])))
        })
        .collect::<SaccoResult<Vec<Money>>>()?;
    let weighted_contribution = checked_sum(weighted, "monthly_contributions")?;
    let dividend = (weighted_contribution / FULL_YEAR_WEIGHT)
        .checked_mul(input.dividend_rate_percent / dec!(100))
        .ok_or_else(|| out_of_range("dividend_rate_percent"))?;

    if total_contribution.is_zero() {
        warnings.push("No contributions recorded for the year".into());
    }

    debug!(
        "dividend: total={} weighted={} dividend={}",
        total_contribution, weighted_contribution, dividend
    );

    let output = DividendOutput {
        total_contribution,
        weighted_contribution,
        dividend,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Time-weighted dividend: contributions weighted 12 (Jan) to 1 (Dec), divided by 12, times rate",
        &serde_json::json!({
            "dividend_rate_percent": input.dividend_rate_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

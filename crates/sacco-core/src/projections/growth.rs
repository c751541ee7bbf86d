//! Conservative multi-year growth projections of SACCO headline metrics.
//!
//! Growth rates come from two observed snapshots (typically January and
//! today) and are damped by a smoothing factor before compounding. Loan
//! book growth is additionally capped so that a single strong lending
//! month does not dominate the outlook. Profit is derived from return on
//! assets rather than extrapolated directly.

use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SaccoError;
use crate::types::{checked_sum, out_of_range, with_metadata, ComputationOutput, Money, Rate};
use crate::SaccoResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DEFAULT_SMOOTHING: Decimal = dec!(0.45);
const DEFAULT_YEARS: [i32; 5] = [2025, 2026, 2027, 2028, 2029];
/// Share of the observed loan growth carried into the projection.
const LOAN_GROWTH_DAMPING: Decimal = dec!(0.2);
/// Ceiling on projected annual loan growth.
const LOAN_GROWTH_CAP: Rate = dec!(0.15);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Headline metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaccoSnapshot {
    pub members: Decimal,
    pub contributions: Money,
    pub loans: Money,
    pub bank_balance: Money,
    #[serde(default)]
    pub profit: Money,
    /// Return on assets as a percentage (5.32 = 5.32%).
    #[serde(default)]
    pub roa_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub start: SaccoSnapshot,
    pub end: SaccoSnapshot,
    #[serde(default = "default_years")]
    pub years: Vec<i32>,
    #[serde(default = "default_smoothing")]
    pub smoothing: Decimal,
}

fn default_years() -> Vec<i32> {
    DEFAULT_YEARS.to_vec()
}

fn default_smoothing() -> Decimal {
    DEFAULT_SMOOTHING
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    pub year: i32,
    pub members: Decimal,
    pub contributions: Money,
    pub loans: Money,
    pub bank_balance: Money,
    pub profit: Money,
    pub roa_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub members: Rate,
    pub contributions: Rate,
    /// Damped and capped.
    pub loans: Rate,
    pub bank_balance: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub growth_rates: GrowthRates,
    pub projections: Vec<ProjectedYear>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn project_growth(input: &ProjectionInput) -> SaccoResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.years.is_empty() {
        return Err(SaccoError::InsufficientData(
            "Projection requires at least one year".into(),
        ));
    }
    if input.smoothing < Decimal::ZERO {
        return Err(SaccoError::InvalidInput {
            field: "smoothing".into(),
            reason: "Smoothing factor must be >= 0".into(),
        });
    }

    let s = &input.start;
    let e = &input.end;
    let damped_loan_growth = growth(s.loans, e.loans, "loans")? * LOAN_GROWTH_DAMPING;
    let rates = GrowthRates {
        members: growth(s.members, e.members, "members")?,
        contributions: growth(s.contributions, e.contributions, "contributions")?,
        loans: damped_loan_growth.min(LOAN_GROWTH_CAP),
        bank_balance: growth(s.bank_balance, e.bank_balance, "bank_balance")?,
    };

    if damped_loan_growth > LOAN_GROWTH_CAP {
        warnings.push(format!(
            "Loan growth capped at {}% per year",
            (LOAN_GROWTH_CAP * dec!(100)).normalize()
        ));
    }
    for (name, base) in [
        ("members", s.members),
        ("contributions", s.contributions),
        ("loans", s.loans),
        ("bank_balance", s.bank_balance),
    ] {
        if base <= Decimal::ZERO {
            warnings.push(format!("Starting {name} is zero; growth assumed flat"));
        }
    }

    let mut projections: Vec<ProjectedYear> = Vec::with_capacity(input.years.len());
    let mut last = ProjectedYear {
        year: input.years[0],
        members: e.members,
        contributions: e.contributions,
        loans: e.loans,
        bank_balance: e.bank_balance,
        profit: e.profit,
        roa_percent: e.roa_percent,
    };
    projections.push(last.clone());

    let smoothing = input.smoothing;
    for &year in &input.years[1..] {
        let members = step(last.members, rates.members, smoothing, "members")?;
        let contributions =
            step(last.contributions, rates.contributions, smoothing, "contributions")?;
        let loans = step(last.loans, rates.loans, smoothing, "loans")?;
        let bank_balance = step(last.bank_balance, rates.bank_balance, smoothing, "bank_balance")?;
        let total_assets = checked_sum([loans, contributions, bank_balance], "total_assets")?;
        let profit = (last.roa_percent / dec!(100))
            .checked_mul(total_assets)
            .map(whole)
            .ok_or_else(|| out_of_range("roa_percent"))?;

        last = ProjectedYear {
            year,
            members,
            contributions,
            loans,
            bank_balance,
            profit,
            roa_percent: last
                .roa_percent
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        };
        projections.push(last.clone());
    }

    debug!(
        "projection: {} years, loan growth {}",
        projections.len(),
        rates.loans
    );

    let output = ProjectionOutput {
        growth_rates: rates,
        projections,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Smoothed compound growth from two snapshots; loan growth damped and capped; profit from ROA",
        &serde_json::json!({
            "smoothing": input.smoothing.to_string(),
            "loan_growth_damping": LOAN_GROWTH_DAMPING.to_string(),
            "loan_growth_cap": LOAN_GROWTH_CAP.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn growth(start: Decimal, end: Decimal, field: &str) -> SaccoResult<Rate> {
    if start <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    end.checked_sub(start)
        .and_then(|delta| delta.checked_div(start))
        .ok_or_else(|| out_of_range(field))
}

/// One year of smoothed compound growth, rounded to a whole value.
fn step(value: Decimal, rate: Rate, smoothing: Decimal, field: &str) -> SaccoResult<Decimal> {
    rate.checked_mul(smoothing)
        .and_then(|r| Decimal::ONE.checked_add(r))
        .and_then(|factor| value.checked_mul(factor))
        .map(whole)
        .ok_or_else(|| out_of_range(field))
}

fn whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(members: i64, contributions: i64, loans: i64, bank: i64) -> SaccoSnapshot {
        SaccoSnapshot {
            members: Decimal::from(members),
            contributions: Decimal::from(contributions),
            loans: Decimal::from(loans),
            bank_balance: Decimal::from(bank),
            profit: Decimal::ZERO,
            roa_percent: dec!(5),
        }
    }

    #[test]
    fn test_first_year_echoes_end_snapshot() {
        let input = ProjectionInput {
            start: snapshot(100, 1_000_000, 500_000, 200_000),
            end: snapshot(120, 1_200_000, 600_000, 220_000),
            years: default_years(),
            smoothing: default_smoothing(),
        };
        let out = project_growth(&input).unwrap().result;
        assert_eq!(out.projections.len(), 5);
        assert_eq!(out.projections[0].year, 2025);
        assert_eq!(out.projections[0].members, dec!(120));
    }

    #[test]
    fn test_second_year_growth() {
        let input = ProjectionInput {
            start: snapshot(100, 1_000_000, 500_000, 200_000),
            end: snapshot(120, 1_200_000, 600_000, 220_000),
            years: vec![2025, 2026],
            smoothing: dec!(0.5),
        };
        let out = project_growth(&input).unwrap().result;
        // members: 120 * (1 + 0.2 * 0.5) = 132
        assert_eq!(out.projections[1].members, dec!(132));
        // loans: growth 0.2 damped to 0.04; 600000 * 1.02 = 612000
        assert_eq!(out.growth_rates.loans, dec!(0.04));
        assert_eq!(out.projections[1].loans, dec!(612000));
        // profit: 5% of (612000 + 1320000 + 231000)
        assert_eq!(out.projections[1].profit, dec!(108150));
    }

    #[test]
    fn test_loan_growth_capped() {
        let input = ProjectionInput {
            start: snapshot(100, 1_000, 100, 1_000),
            end: snapshot(100, 1_000, 1_000, 1_000),
            years: vec![2025, 2026],
            smoothing: dec!(1),
        };
        let out = project_growth(&input).unwrap();
        assert_eq!(out.result.growth_rates.loans, dec!(0.15));
        assert!(out.warnings.iter().any(|w| w.contains("capped")));
    }

    #[test]
    fn test_zero_start_is_flat() {
        let input = ProjectionInput {
            start: snapshot(0, 0, 0, 0),
            end: snapshot(50, 500, 500, 500),
            years: vec![2025, 2026],
            smoothing: dec!(0.45),
        };
        let out = project_growth(&input).unwrap().result;
        assert_eq!(out.projections[1].members, dec!(50));
    }

    #[test]
    fn test_empty_years_rejected() {
        let input = ProjectionInput {
            start: snapshot(1, 1, 1, 1),
            end: snapshot(1, 1, 1, 1),
            years: vec![],
            smoothing: dec!(0.45),
        };
        assert!(matches!(
            project_growth(&input),
            Err(SaccoError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_growth_from_tiny_start_overflows_to_error() {
        let err = growth(dec!(0.0000000000000000000000000001), dec!(1000000000000), "loans");
        assert!(matches!(err, Err(SaccoError::InvalidInput { ref field, .. }) if field == "loans"));
    }

    #[test]
    fn test_step_overflow_names_metric() {
        let err = step(Decimal::MAX, dec!(0.5), dec!(1), "bank_balance").unwrap_err();
        assert!(err.to_string().contains("bank_balance"));
        assert_eq!(step(dec!(1000), dec!(0.1), dec!(0.5), "members").unwrap(), dec!(1050));
    }
}

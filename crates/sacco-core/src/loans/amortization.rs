//! Simple-interest amortization schedules for SACCO loan products.
//!
//! Interest is charged flat on the original principal over the repayment
//! tenure, so every repayment month carries the same principal and interest
//! split. Products with a grace period accrue nothing during the grace
//! window and begin repaying the month after it ends.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::SaccoError;
use crate::loans::products::{self, LoanConfiguration, LoanType};
use crate::types::{
    checked_sum, clamp_balance, out_of_range, with_metadata, ComputationOutput, Money, Rate,
};
use crate::SaccoResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Schedule types
// ---------------------------------------------------------------------------

/// Position of a row in a schedule: a calendar month of the loan, or the
/// trailing totals row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeriodRepr", into = "PeriodRepr")]
pub enum Period {
    Month(u32),
    Total,
}

impl Period {
    pub fn month(&self) -> Option<u32> {
        match self {
            Period::Month(m) => Some(*m),
            Period::Total => None,
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, Period::Total)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month(m) => write!(f, "{m}"),
            Period::Total => f.write_str(TOTAL_LABEL),
        }
    }
}

const TOTAL_LABEL: &str = "Total";

/// Wire form: a bare month number, or the string "Total".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PeriodRepr {
    Month(u32),
    Label(String),
}

impl From<Period> for PeriodRepr {
    fn from(p: Period) -> Self {
        match p {
            Period::Month(m) => PeriodRepr::Month(m),
            Period::Total => PeriodRepr::Label(TOTAL_LABEL.to_string()),
        }
    }
}

impl TryFrom<PeriodRepr> for Period {
    type Error = String;

    fn try_from(repr: PeriodRepr) -> Result<Self, Self::Error> {
        match repr {
            PeriodRepr::Month(m) => Ok(Period::Month(m)),
            PeriodRepr::Label(s) if s == TOTAL_LABEL => Ok(Period::Total),
            PeriodRepr::Label(s) => Err(format!("unknown schedule period '{s}'")),
        }
    }
}

/// One line of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: Period,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Outstanding principal after this month. `None` on the totals row.
    pub balance: Option<Money>,
}

/// A priced loan: terms, headline figures, and the month-by-month schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub loan_type: LoanType,
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_months: u32,
    pub grace_period_months: u32,
    pub monthly_payment: Money,
    pub monthly_principal: Money,
    pub monthly_interest: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
    pub allow_fines: bool,
    pub amortization_schedule: Vec<ScheduleRow>,
}

impl LoanQuote {
    /// Grace window plus repayment tenure.
    pub fn term_months(&self) -> u32 {
        self.grace_period_months + self.tenure_months
    }

    /// Schedule rows excluding the totals row.
    pub fn monthly_rows(&self) -> impl Iterator<Item = &ScheduleRow> {
        self.amortization_schedule
            .iter()
            .filter(|r| !r.month.is_total())
    }

    pub fn totals(&self) -> Option<&ScheduleRow> {
        self.amortization_schedule
            .last()
            .filter(|r| r.month.is_total())
    }
}

/// Input for the enveloped quote entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuoteInput {
    pub loan_type: String,
    pub principal: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the repayment schedule for `principal` under `config`.
///
/// The schedule has one row per month of the term (grace plus tenure) and a
/// trailing totals row.
pub fn compute_loan_quote(config: &LoanConfiguration, principal: Money) -> SaccoResult<LoanQuote> {
    if principal <= Decimal::ZERO {
        return Err(SaccoError::InvalidPrincipal { value: principal });
    }
    if config.tenure_months == 0 {
        return Err(SaccoError::InvalidInput {
            field: "tenure_months".into(),
            reason: "Loan tenure must be at least one month".into(),
        });
    }

    let tenure = Decimal::from(config.tenure_months);
    let annual_rate = config.annual_rate();
    let total_interest = principal
        .checked_mul(annual_rate)
        .and_then(|v| v.checked_mul(tenure / MONTHS_PER_YEAR))
        .ok_or_else(|| out_of_range("principal"))?;
    let total_repayment = principal
        .checked_add(total_interest)
        .ok_or_else(|| out_of_range("principal"))?;
    let monthly_payment = total_repayment / tenure;
    let monthly_principal = principal / tenure;
    let monthly_interest = total_interest / tenure;

    let grace = config.grace_period_months;
    let mut schedule: Vec<ScheduleRow> = Vec::with_capacity(config.term_months() as usize + 1);
    let mut balance = principal;

    for month in 1..=config.term_months() {
        let (payment, principal_paid, interest_paid) = if month > grace {
            balance -= monthly_principal;
            (monthly_payment, monthly_principal, monthly_interest)
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };
        balance = clamp_balance(balance);

        schedule.push(ScheduleRow {
            month: Period::Month(month),
            payment,
            principal: principal_paid,
            interest: interest_paid,
            balance: Some(balance),
        });
    }

    let total_row = ScheduleRow {
        month: Period::Total,
        payment: checked_sum(schedule.iter().map(|r| r.payment), "principal")?,
        principal: checked_sum(schedule.iter().map(|r| r.principal), "principal")?,
        interest: checked_sum(schedule.iter().map(|r| r.interest), "principal")?,
        balance: None,
    };
    schedule.push(total_row);

    debug!(
        "{} quote: principal={} rows={} total_repayment={}",
        config.loan_type,
        principal,
        schedule.len(),
        total_repayment
    );

    Ok(LoanQuote {
        loan_type: config.loan_type,
        principal,
        annual_rate,
        tenure_months: config.tenure_months,
        grace_period_months: grace,
        monthly_payment,
        monthly_principal,
        monthly_interest,
        total_interest,
        total_repayment,
        allow_fines: config.allow_fines,
        amortization_schedule: schedule,
    })
}

/// Resolve the loan type, price the loan, and wrap it in the standard envelope.
pub fn quote_loan(input: &LoanQuoteInput) -> SaccoResult<ComputationOutput<LoanQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = products::resolve(&input.loan_type)?;
    let quote = compute_loan_quote(&config, input.principal)?;

    if config.grace_period_months > 0 {
        warnings.push(format!(
            "No repayments due in months 1..={}; first repayment in month {}",
            config.grace_period_months,
            config.grace_period_months + 1
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple-interest amortization with flat monthly principal and interest",
        &serde_json::json!({
            "loan_type": config.loan_type.key(),
            "principal": input.principal.to_string(),
            "rate": config.rate_label,
            "tenure_months": config.tenure_months,
            "grace_period_months": config.grace_period_months,
            "balance_rounding": "cents, half away from zero, floored at zero",
        }),
        warnings,
        elapsed,
        quote,
    ))
}

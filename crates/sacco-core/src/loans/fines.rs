//! Late-payment fines on top of a priced loan.
//!
//! A missed installment charges 2% of the combined outstanding (principal
//! balance plus every fine charged so far) for each installment missed in
//! the current run, and the fine compounds into the principal balance.
//! Members may record actual payments per month; a recorded payment
//! replaces whatever the month would otherwise have been. When the missed
//! run extends past the loan term, installment and outstanding fines keep
//! accruing monthly until the run ends.

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::SaccoError;
use crate::loans::amortization::{compute_loan_quote, LoanQuote, Period};
use crate::loans::products::{self, LoanType};
use crate::types::{
    checked_sum, clamp_balance, out_of_range, round_cents, with_metadata, ComputationOutput,
    Money, Rate,
};
use crate::SaccoResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rate for both installment and outstanding fines.
pub const FINE_RATE: Rate = dec!(0.02);
/// A combined balance at or below one cent counts as settled.
const SETTLED_THRESHOLD: Money = dec!(0.01);
/// Upper bound on the length of a missed-payment run (fifty years).
pub const MAX_MONTHS_LATE: i64 = 600;

// ---------------------------------------------------------------------------
// Payment ledger
// ---------------------------------------------------------------------------

/// Actual payments recorded by month, overriding the scheduled installment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentLedger {
    payments: BTreeMap<u32, Money>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` paid in `month`, replacing any earlier entry for that month.
    pub fn record(&mut self, quote: &LoanQuote, month: i64, amount: Money) -> SaccoResult<()> {
        let month = validate_entry(month, amount, quote.term_months())?;
        self.payments.insert(month, amount);
        Ok(())
    }

    pub fn get(&self, month: u32) -> Option<Money> {
        self.payments.get(&month).copied()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Money)> + '_ {
        self.payments.iter().map(|(m, a)| (*m, *a))
    }

    fn validate(&self, term_months: u32) -> SaccoResult<()> {
        for (month, amount) in self.iter() {
            validate_entry(i64::from(month), amount, term_months)?;
        }
        Ok(())
    }
}

fn validate_entry(month: i64, amount: Money, term_months: u32) -> SaccoResult<u32> {
    if month <= 0 {
        return Err(SaccoError::InvalidPaymentInput {
            field: "month".into(),
            reason: format!("Payment month must be positive, got {month}"),
        });
    }
    if month > i64::from(term_months) {
        return Err(SaccoError::InvalidPaymentInput {
            field: "month".into(),
            reason: format!(
                "Payment month ({month}) cannot be after the loan term ({term_months} months)"
            ),
        });
    }
    if amount < Decimal::ZERO {
        return Err(SaccoError::InvalidPaymentInput {
            field: "amount".into(),
            reason: format!("Payment amount must be non-negative, got {amount}"),
        });
    }
    Ok(month as u32)
}

// ---------------------------------------------------------------------------
// Fines schedule types
// ---------------------------------------------------------------------------

/// What happened in a fines-schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Inside the grace window; nothing due.
    Grace,
    /// Scheduled installment paid on time.
    Payment,
    /// Member-recorded payment from the ledger.
    LedgerPayment,
    /// Installment missed; installment fine charged.
    InstallmentFine,
    /// Post-term outstanding fine, the second event of a post-term month.
    OutstandingFine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinesRow {
    pub month: Period,
    /// `None` on the totals row.
    pub event: Option<EventKind>,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub installment_fine: Money,
    pub outstanding_fine: Money,
    /// Principal balance plus all fines to date. `None` on the totals row.
    pub balance: Option<Money>,
}

impl FinesRow {
    fn fine_only(
        month: u32,
        event: EventKind,
        installment_fine: Money,
        outstanding_fine: Money,
        balance: Money,
    ) -> Self {
        Self {
            month: Period::Month(month),
            event: Some(event),
            payment: Decimal::ZERO,
            principal: Decimal::ZERO,
            interest: Decimal::ZERO,
            installment_fine,
            outstanding_fine,
            balance: Some(balance),
        }
    }

    /// Label for the month column of a rendered table.
    pub fn month_label(&self) -> String {
        match (self.month, self.event) {
            (Period::Month(m), Some(EventKind::OutstandingFine)) => {
                format!("{m} (Outstanding Fine)")
            }
            (period, _) => period.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinesQuote {
    pub loan_type: LoanType,
    pub late_month: u32,
    pub months_late: i64,
    /// Months of fines charged after the loan term ended.
    pub post_term_months: u32,
    pub fines_schedule: Vec<FinesRow>,
    pub total_installment_fines: Money,
    pub total_outstanding_fines: Money,
    /// Original principal and interest plus every fine.
    pub total_repayment: Money,
}

/// A single recorded payment in a [`FinesInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub month: i64,
    pub amount: Money,
}

/// Input for the enveloped fines entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinesInput {
    pub loan_type: String,
    pub principal: Money,
    /// Month of the first missed installment (1-based).
    pub late_month: i64,
    /// Consecutive installments missed from `late_month`.
    pub months_late: i64,
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Recompute `quote`'s schedule with recorded payments and a run of
/// `months_late` missed installments starting at `late_month`.
///
/// A non-positive `months_late` is accepted and simply charges no
/// installment fines.
pub fn compute_fines_quote(
    quote: &LoanQuote,
    ledger: &PaymentLedger,
    late_month: i64,
    months_late: i64,
) -> SaccoResult<FinesQuote> {
    if !quote.allow_fines {
        return Err(SaccoError::FinesNotApplicable {
            loan_type: quote.loan_type.key().to_string(),
        });
    }
    let term = quote.term_months();
    if late_month <= 0 || late_month > i64::from(term) {
        return Err(SaccoError::InvalidLateMonth {
            month: late_month,
            term_months: term,
        });
    }
    if months_late > MAX_MONTHS_LATE {
        return Err(SaccoError::InvalidInput {
            field: "months_late".into(),
            reason: format!("Cannot exceed {MAX_MONTHS_LATE} months"),
        });
    }
    if quote.monthly_payment <= Decimal::ZERO {
        return Err(SaccoError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "Quote must have a positive monthly payment".into(),
        });
    }
    ledger.validate(term)?;

    if months_late <= 0 {
        warn!("months_late={months_late}: no installment fines can accrue");
    }

    let grace = quote.grace_period_months;
    let mut schedule: Vec<FinesRow> = Vec::with_capacity(term as usize + 1);
    let mut balance = quote.principal;
    let mut installment_fines = Decimal::ZERO;
    let mut outstanding_fines = Decimal::ZERO;

    for month in 1..=term {
        let m = i64::from(month);
        let mut payment = Decimal::ZERO;
        let mut principal_paid = Decimal::ZERO;
        let mut interest_paid = Decimal::ZERO;
        let mut installment_fine = Decimal::ZERO;

        let event = if let Some(amount) = ledger.get(month) {
            payment = amount.min(balance);
            let share = payment
                .checked_div(quote.monthly_payment)
                .ok_or_else(|| out_of_range("payments"))?;
            principal_paid = share
                .checked_mul(quote.monthly_principal)
                .ok_or_else(|| out_of_range("payments"))?;
            interest_paid = share
                .checked_mul(quote.monthly_interest)
                .ok_or_else(|| out_of_range("payments"))?;
            balance -= payment;
            EventKind::LedgerPayment
        } else if month <= grace {
            EventKind::Grace
        } else if m >= late_month && m < late_month + months_late {
            let missed = (m - late_month + 1).min(months_late);
            let outstanding = outstanding_total(balance, installment_fines, outstanding_fines)?;
            installment_fine = fine_on(outstanding)?
                .checked_mul(Decimal::from(missed))
                .ok_or_else(|| out_of_range("months_late"))?;
            installment_fines = checked_sum([installment_fines, installment_fine], "months_late")?;
            balance = checked_sum([balance, installment_fine], "months_late")?;
            EventKind::InstallmentFine
        } else {
            payment = quote.monthly_payment;
            principal_paid = quote.monthly_principal;
            interest_paid = quote.monthly_interest;
            balance -= quote.monthly_principal;
            EventKind::Payment
        };

        balance = clamp_balance(balance);
        let combined = outstanding_total(balance, installment_fines, outstanding_fines)?;
        schedule.push(FinesRow {
            month: Period::Month(month),
            event: Some(event),
            payment,
            principal: principal_paid,
            interest: interest_paid,
            installment_fine,
            outstanding_fine: Decimal::ZERO,
            balance: Some(combined),
        });
    }

    let post_term = post_term_months(term, late_month, months_late);
    let mut combined = schedule
        .last()
        .and_then(|r| r.balance)
        .unwrap_or(Decimal::ZERO);

    let mut charged_post_term = 0u32;
    if combined > SETTLED_THRESHOLD && post_term > 0 {
        for month in (term + 1)..=(term + post_term) {
            if combined <= SETTLED_THRESHOLD {
                break;
            }
            let base = outstanding_total(combined, installment_fines, outstanding_fines)?;
            let installment_fine = fine_on(base)?;
            let outstanding_fine = fine_on(base)?;
            installment_fines = checked_sum([installment_fines, installment_fine], "months_late")?;
            outstanding_fines = checked_sum([outstanding_fines, outstanding_fine], "months_late")?;
            combined = round_cents(checked_sum(
                [combined, installment_fine, outstanding_fine],
                "months_late",
            )?);
            charged_post_term += 1;

            schedule.push(FinesRow::fine_only(
                month,
                EventKind::InstallmentFine,
                installment_fine,
                Decimal::ZERO,
                combined - outstanding_fine,
            ));
            schedule.push(FinesRow::fine_only(
                month,
                EventKind::OutstandingFine,
                Decimal::ZERO,
                outstanding_fine,
                combined,
            ));
        }
    }

    let total_installment_fines =
        checked_sum(schedule.iter().map(|r| r.installment_fine), "months_late")?;
    let total_outstanding_fines =
        checked_sum(schedule.iter().map(|r| r.outstanding_fine), "months_late")?;
    let total_row = FinesRow {
        month: Period::Total,
        event: None,
        payment: checked_sum(schedule.iter().map(|r| r.payment), "payments")?,
        principal: checked_sum(schedule.iter().map(|r| r.principal), "payments")?,
        interest: checked_sum(schedule.iter().map(|r| r.interest), "payments")?,
        installment_fine: total_installment_fines,
        outstanding_fine: total_outstanding_fines,
        balance: None,
    };
    schedule.push(total_row);

    let total_repayment = checked_sum(
        [
            quote.principal,
            quote.total_interest,
            total_installment_fines,
            total_outstanding_fines,
        ],
        "months_late",
    )?;

    debug!(
        "{} fines: late_month={} months_late={} rows={} installment_fines={} outstanding_fines={}",
        quote.loan_type,
        late_month,
        months_late,
        schedule.len(),
        total_installment_fines,
        total_outstanding_fines
    );

    Ok(FinesQuote {
        loan_type: quote.loan_type,
        late_month: late_month as u32,
        months_late,
        post_term_months: charged_post_term,
        fines_schedule: schedule,
        total_installment_fines,
        total_outstanding_fines,
        total_repayment,
    })
}

/// Price the loan, apply recorded payments and missed installments, and
/// wrap the fines schedule in the standard envelope.
pub fn quote_fines(input: &FinesInput) -> SaccoResult<ComputationOutput<FinesQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = products::resolve(&input.loan_type)?;
    let quote = compute_loan_quote(&config, input.principal)?;
    if !quote.allow_fines {
        return Err(SaccoError::FinesNotApplicable {
            loan_type: config.loan_type.key().to_string(),
        });
    }

    let mut ledger = PaymentLedger::new();
    for entry in &input.payments {
        ledger.record(&quote, entry.month, entry.amount)?;
    }

    let fines = compute_fines_quote(&quote, &ledger, input.late_month, input.months_late)?;

    if input.months_late <= 0 {
        warnings.push(format!(
            "months_late is {}; no installment fines accrue",
            input.months_late
        ));
    }
    if fines.post_term_months > 0 {
        warnings.push(format!(
            "Fines continue for {} month(s) after the {}-month loan term",
            fines.post_term_months,
            quote.term_months()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Late-payment fines: 2% of total outstanding per missed installment, compounded into balance",
        &serde_json::json!({
            "loan_type": config.loan_type.key(),
            "principal": input.principal.to_string(),
            "late_month": input.late_month,
            "months_late": input.months_late,
            "recorded_payments": ledger.len(),
            "fine_rate": FINE_RATE.to_string(),
        }),
        warnings,
        elapsed,
        fines,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Months of the missed run that fall after the term ends.
fn post_term_months(term: u32, late_month: i64, months_late: i64) -> u32 {
    let inside_term = i64::from(term) - late_month + 1;
    months_late
        .saturating_sub(inside_term)
        .min(months_late)
        .max(0) as u32
}

/// Balance plus every fine charged so far.
fn outstanding_total(balance: Money, installment: Money, outstanding: Money) -> SaccoResult<Money> {
    checked_sum([balance, installment, outstanding], "months_late")
}

fn fine_on(base: Money) -> SaccoResult<Money> {
    base.checked_mul(FINE_RATE)
        .ok_or_else(|| out_of_range("months_late"))
}

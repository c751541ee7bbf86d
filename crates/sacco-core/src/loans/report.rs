//! Presentation helpers: headline summaries and chart series.

use serde::{Deserialize, Serialize};

use crate::loans::amortization::LoanQuote;
use crate::loans::fines::FinesQuote;
use crate::types::{round_cents, Money, CURRENCY_CODE};

/// One bar/line point for the repayment chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub month: u32,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

fn amount(value: Money) -> String {
    format!("{CURRENCY_CODE} {:.2}", round_cents(value))
}

/// Short textual summary of a loan quote, one line per figure.
pub fn summary_lines(quote: &LoanQuote) -> Vec<String> {
    vec![
        format!(
            "Monthly Payment: {} (from month {})",
            amount(quote.monthly_payment),
            quote.grace_period_months + 1
        ),
        format!("Total Interest: {}", amount(quote.total_interest)),
        format!("Total Repayment: {}", amount(quote.total_repayment)),
    ]
}

pub fn fines_summary_lines(fines: &FinesQuote) -> Vec<String> {
    vec![
        format!(
            "Total Installment Fines: {}",
            amount(fines.total_installment_fines)
        ),
        format!(
            "Total Outstanding Fines: {}",
            amount(fines.total_outstanding_fines)
        ),
        format!(
            "Total Repayment (with fines): {}",
            amount(fines.total_repayment)
        ),
        "Note: All fines are 2% of the total outstanding (principal+interest+previous fines)."
            .to_string(),
    ]
}

/// Chart points for every month of the schedule; the totals row is skipped.
pub fn chart_series(quote: &LoanQuote) -> Vec<ChartPoint> {
    quote
        .monthly_rows()
        .filter_map(|row| {
            let month = row.month.month()?;
            Some(ChartPoint {
                label: format!("Month {month}"),
                month,
                principal: row.principal,
                interest: row.interest,
                balance: row.balance.unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loans::amortization::compute_loan_quote;
    use crate::loans::fines::{compute_fines_quote, PaymentLedger};
    use crate::loans::products::LoanType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_lines() {
        let q = compute_loan_quote(&LoanType::Emergency.configuration(), dec!(1000)).unwrap();
        assert_eq!(
            summary_lines(&q),
            vec![
                "Monthly Payment: KES 363.33 (from month 1)",
                "Total Interest: KES 90.00",
                "Total Repayment: KES 1090.00",
            ]
        );
    }

    #[test]
    fn test_summary_after_grace() {
        let q = compute_loan_quote(&LoanType::ApiCulture.configuration(), dec!(5000)).unwrap();
        assert!(summary_lines(&q)[0].ends_with("(from month 4)"));
    }

    #[test]
    fn test_fines_summary_lines() {
        let q = compute_loan_quote(&LoanType::Medicare.configuration(), dec!(12000)).unwrap();
        let f = compute_fines_quote(&q, &PaymentLedger::new(), 2, 3).unwrap();
        let lines = fines_summary_lines(&f);
        assert_eq!(lines[0], "Total Installment Fines: KES 1418.91");
        assert_eq!(lines[1], "Total Outstanding Fines: KES 0.00");
        assert_eq!(lines[2], "Total Repayment (with fines): KES 13898.91");
    }

    #[test]
    fn test_chart_series_skips_total() {
        let q = compute_loan_quote(&LoanType::ApiCulture.configuration(), dec!(5000)).unwrap();
        let points = chart_series(&q);
        assert_eq!(points.len(), 15);
        assert_eq!(points[0].label, "Month 1");
        assert_eq!(points[0].balance, dec!(5000));
        assert_eq!(points[14].month, 15);
    }
}

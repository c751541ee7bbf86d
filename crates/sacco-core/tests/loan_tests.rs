use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use sacco_core::loans::amortization::{compute_loan_quote, quote_loan, LoanQuoteInput, Period};
use sacco_core::loans::products::{catalog, resolve, LoanType};
use sacco_core::SaccoError;

const CENT: Decimal = dec!(0.01);

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn test_emergency_1000() {
    let config = resolve("emergency").unwrap();
    let q = compute_loan_quote(&config, dec!(1000)).unwrap();

    assert_eq!(q.tenure_months, 3);
    assert_eq!(q.grace_period_months, 0);
    assert_eq!(q.annual_rate, dec!(0.36));
    assert_eq!(q.total_interest, dec!(90));
    assert_eq!(q.total_repayment, dec!(1090));
    assert_eq!(q.monthly_payment.round_dp(2), dec!(363.33));
    assert_eq!(q.amortization_schedule.len(), 4);
    assert!(q.allow_fines);
}

#[test]
fn test_api_culture_grace_window() {
    let config = resolve("apiCulture").unwrap();
    let q = compute_loan_quote(&config, dec!(5000)).unwrap();

    assert_eq!(q.amortization_schedule.len(), 16);
    for row in &q.amortization_schedule[..3] {
        assert_eq!(row.payment, Decimal::ZERO);
        assert_eq!(row.principal, Decimal::ZERO);
        assert_eq!(row.interest, Decimal::ZERO);
        assert_eq!(row.balance, Some(dec!(5000)));
    }
    // 5000 * 2% * 12/12 = 100 interest over 12 repayments
    assert_eq!(q.total_interest, dec!(100));
    assert_eq!(q.amortization_schedule[3].month, Period::Month(4));
    assert_eq!(q.amortization_schedule[3].payment, dec!(425));
    assert!(!q.allow_fines);
}

#[test]
fn test_development_final_balance_zero() {
    let q = compute_loan_quote(&LoanType::Development.configuration(), dec!(24000)).unwrap();
    // 24000 / 12 = 2000 exactly, no rounding drift
    let last = &q.amortization_schedule[11];
    assert_eq!(last.balance, Some(Decimal::ZERO));
    assert_eq!(q.monthly_payment, dec!(2240));
}

#[test]
fn test_envelope_metadata() {
    let out = quote_loan(&LoanQuoteInput {
        loan_type: "education".into(),
        principal: dec!(6000),
    })
    .unwrap();
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(out.warnings.is_empty());
    assert_eq!(out.assumptions["loan_type"], "education");
}

#[test]
fn test_unknown_loan_type() {
    let err = quote_loan(&LoanQuoteInput {
        loan_type: "boda".into(),
        principal: dec!(6000),
    })
    .unwrap_err();
    assert!(matches!(err, SaccoError::InvalidLoanType { ref key } if key == "boda"));
    assert_eq!(
        err.to_string(),
        "Invalid loan type: 'boda' is not a known loan product"
    );
}

#[test]
fn test_catalog_matches_products_table() {
    let rows: Vec<(LoanType, Decimal, u32, u32, bool)> = catalog()
        .into_iter()
        .map(|c| {
            (
                c.loan_type,
                c.annual_rate_percent,
                c.tenure_months,
                c.grace_period_months,
                c.allow_fines,
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            (LoanType::Emergency, dec!(36), 3, 0, true),
            (LoanType::Medicare, dec!(4), 12, 0, true),
            (LoanType::Education, dec!(4), 12, 0, true),
            (LoanType::Development, dec!(12), 12, 0, true),
            (LoanType::ApiCulture, dec!(2), 12, 3, false),
        ]
    );
}

// ===========================================================================
// Properties
// ===========================================================================

fn loan_type_strategy() -> impl Strategy<Value = LoanType> {
    prop::sample::select(LoanType::ALL.to_vec())
}

/// Principal in cents, 1.00 to 10,000,000.00.
fn principal_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Whole principals from 1e20 up to the largest representable amount.
fn huge_principal_strategy() -> impl Strategy<Value = Decimal> {
    (10i128.pow(20)..=Decimal::MAX.mantissa()).prop_map(|m| Decimal::from_i128_with_scale(m, 0))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_row_count_is_term_plus_total(loan_type in loan_type_strategy(), principal in principal_strategy()) {
        let config = loan_type.configuration();
        let q = compute_loan_quote(&config, principal).unwrap();
        prop_assert_eq!(q.amortization_schedule.len() as u32, config.term_months() + 1);
        prop_assert!(q.amortization_schedule.last().unwrap().month.is_total());
    }

    #[test]
    fn prop_principal_repaid_within_rounding(loan_type in loan_type_strategy(), principal in principal_strategy()) {
        let q = compute_loan_quote(&loan_type.configuration(), principal).unwrap();
        let repaid: Decimal = q.monthly_rows().map(|r| r.principal).sum();
        prop_assert!((repaid - principal).abs() <= CENT);
        let final_balance = q.monthly_rows().last().and_then(|r| r.balance).unwrap();
        prop_assert!(final_balance <= CENT * Decimal::from(q.tenure_months));
    }

    #[test]
    fn prop_monthly_payment_times_tenure(loan_type in loan_type_strategy(), principal in principal_strategy()) {
        let q = compute_loan_quote(&loan_type.configuration(), principal).unwrap();
        let product = q.monthly_payment * Decimal::from(q.tenure_months);
        prop_assert!((product - q.total_repayment).abs() <= CENT);
    }

    #[test]
    fn prop_balance_never_negative(loan_type in loan_type_strategy(), principal in principal_strategy()) {
        let q = compute_loan_quote(&loan_type.configuration(), principal).unwrap();
        for row in q.monthly_rows() {
            let balance = row.balance.unwrap();
            prop_assert!(balance >= Decimal::ZERO);
            prop_assert_eq!(balance, balance.round_dp(2));
        }
    }

    #[test]
    fn prop_grace_rows_are_empty(principal in principal_strategy()) {
        let q = compute_loan_quote(&LoanType::ApiCulture.configuration(), principal).unwrap();
        for row in q.monthly_rows().take(q.grace_period_months as usize) {
            prop_assert_eq!(row.payment, Decimal::ZERO);
            prop_assert_eq!(row.principal, Decimal::ZERO);
            prop_assert_eq!(row.interest, Decimal::ZERO);
            prop_assert_eq!(row.balance, Some(principal));
        }
    }

    #[test]
    fn prop_quote_is_deterministic(loan_type in loan_type_strategy(), principal in principal_strategy()) {
        let config = loan_type.configuration();
        let a = compute_loan_quote(&config, principal).unwrap();
        let b = compute_loan_quote(&config, principal).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_huge_principal_quotes_or_errors(loan_type in loan_type_strategy(), principal in huge_principal_strategy()) {
        match compute_loan_quote(&loan_type.configuration(), principal) {
            Ok(q) => prop_assert!(q.total_repayment > principal),
            Err(e) => prop_assert!(matches!(e, SaccoError::InvalidInput { .. }), "unexpected error: {:?}", e),
        }
    }
}

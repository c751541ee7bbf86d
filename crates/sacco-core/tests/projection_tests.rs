#![cfg(feature = "projections")]

use pretty_assertions::assert_eq;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use sacco_core::projections::growth::{project_growth, ProjectionInput};
use sacco_core::SaccoError;

fn sample_input() -> ProjectionInput {
    serde_json::from_str(
        r#"{
            "start": {"members": 400, "contributions": "20000000", "loans": "15000000", "bank_balance": "2000000", "roa_percent": "4"},
            "end": {"members": 440, "contributions": "24000000", "loans": "16500000", "bank_balance": "2500000", "profit": "1200000", "roa_percent": "5.32"}
        }"#,
    )
    .unwrap()
}

#[test]
fn test_defaults_applied() {
    let input = sample_input();
    assert_eq!(input.years, vec![2025, 2026, 2027, 2028, 2029]);
    assert_eq!(input.smoothing, dec!(0.45));
}

#[test]
fn test_five_year_outlook() {
    let out = project_growth(&sample_input()).unwrap().result;
    assert_eq!(out.projections.len(), 5);

    // Growth: members 10%, contributions 20%, loans 10% * 0.2 = 2%, bank 25%
    assert_eq!(out.growth_rates.members, dec!(0.1));
    assert_eq!(out.growth_rates.loans, dec!(0.02));

    let y2026 = &out.projections[1];
    assert_eq!(y2026.year, 2026);
    // 440 * (1 + 0.1 * 0.45) = 459.8 -> 460
    assert_eq!(y2026.members, dec!(460));
    // 16500000 * (1 + 0.02 * 0.45) = 16648500
    assert_eq!(y2026.loans, dec!(16648500));
    assert_eq!(y2026.roa_percent, dec!(5.32));

    for pair in out.projections.windows(2) {
        assert!(pair[1].contributions >= pair[0].contributions);
        assert!(pair[1].loans >= pair[0].loans);
    }
}

#[test]
fn test_profit_follows_roa() {
    let out = project_growth(&sample_input()).unwrap().result;
    let y = &out.projections[2];
    let assets = y.loans + y.contributions + y.bank_balance;
    let expected =
        (dec!(0.0532) * assets).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(y.profit, expected);
}

#[test]
fn test_runaway_growth_is_an_error() {
    let input: ProjectionInput = serde_json::from_str(
        r#"{
            "start": {"members": "1", "contributions": "1", "loans": "1", "bank_balance": "1"},
            "end": {"members": "1000000000000000000000", "contributions": "1000000000000000000000", "loans": "1000000000000000000000", "bank_balance": "1000000000000000000000"},
            "years": [2025, 2026, 2027]
        }"#,
    )
    .unwrap();
    assert!(matches!(
        project_growth(&input),
        Err(SaccoError::InvalidInput { .. })
    ));
}

use napi::Result as NapiResult;
use napi_derive::napi;

use sacco_core::dividends::weighted;
use sacco_core::loans::{amortization, fines, products, report};
use sacco_core::projections::growth;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_products() -> NapiResult<String> {
    serde_json::to_string(&products::catalog()).map_err(to_napi_error)
}

#[napi]
pub fn loan_quote(input_json: String) -> NapiResult<String> {
    let input: amortization::LoanQuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::quote_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn fines_quote(input_json: String) -> NapiResult<String> {
    let input: fines::FinesInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fines::quote_fines(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_chart(input_json: String) -> NapiResult<String> {
    let input: amortization::LoanQuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::quote_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&report::chart_series(&output.result)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dividends
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_dividend(input_json: String) -> NapiResult<String> {
    let input: weighted::DividendInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = weighted::calculate_dividend(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

#[napi]
pub fn project_growth(input_json: String) -> NapiResult<String> {
    let input: growth::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = growth::project_growth(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use sacco_core::loans::amortization::{self, LoanQuoteInput};
use sacco_core::loans::fines::{self, FinesInput, FinesQuote, PaymentEntry};
use sacco_core::loans::{products, report};

use crate::input;
use crate::OutputFormat;

/// Arguments shared by loan quote and chart
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan product key: emergency, medicare, education, development, apiCulture
    #[arg(long)]
    pub loan_type: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Include the short textual summary in the result
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for late-payment fines
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FinesArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan product key
    #[arg(long)]
    pub loan_type: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Month of the first missed installment
    #[arg(long)]
    pub late_month: Option<i64>,

    /// Number of consecutive installments missed
    #[arg(long)]
    pub months_late: Option<i64>,

    /// Recorded payment as MONTH=AMOUNT (repeatable)
    #[arg(long = "payment", value_name = "MONTH=AMOUNT")]
    pub payments: Vec<String>,

    /// Include the short textual summary in the result
    #[arg(long)]
    pub summary: bool,
}

pub fn run_products() -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = products::catalog()
        .into_iter()
        .map(|c| {
            serde_json::json!({
                "loan_type": c.loan_type.key(),
                "rate": c.rate_label,
                "tenure_months": c.tenure_label(),
                "grace_period_months": c.grace_period_months,
                "fines_allowed": c.allow_fines,
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

fn loan_input(args: &LoanArgs) -> Result<LoanQuoteInput, Box<dyn std::error::Error>> {
    if args.input.is_none() {
        if let (Some(loan_type), Some(principal)) = (&args.loan_type, args.principal) {
            return Ok(LoanQuoteInput {
                loan_type: loan_type.clone(),
                principal,
            });
        }
    }
    match input::read_input(args.input.as_deref())? {
        Some(data) => Ok(data),
        None => Err(missing_flag(args.loan_type.is_none(), "--loan-type", "--principal")),
    }
}

fn missing_flag(first_missing: bool, first: &str, second: &str) -> Box<dyn std::error::Error> {
    let flag = if first_missing { first } else { second };
    format!("{flag} is required (or provide --input)").into()
}

pub fn run_loan_quote(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = loan_input(&args)?;
    let output = amortization::quote_loan(&loan_input)?;

    let mut value = serde_json::to_value(&output)?;
    if args.summary {
        value["result"]["summary"] = serde_json::to_value(report::summary_lines(&output.result))?;
    }
    Ok(value)
}

pub fn run_chart(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = loan_input(&args)?;
    let output = amortization::quote_loan(&loan_input)?;
    Ok(serde_json::to_value(report::chart_series(&output.result))?)
}

pub fn run_fines(
    args: FinesArgs,
    format: &OutputFormat,
) -> Result<Value, Box<dyn std::error::Error>> {
    let fines_input: FinesInput = if args.input.is_none() && args.loan_type.is_some() {
        fines_from_flags(&args)?
    } else {
        match input::read_input(args.input.as_deref())? {
            Some(data) => data,
            None => fines_from_flags(&args)?,
        }
    };

    let output = fines::quote_fines(&fines_input)?;

    let mut value = serde_json::to_value(&output)?;
    if args.summary {
        value["result"]["summary"] =
            serde_json::to_value(report::fines_summary_lines(&output.result))?;
    }
    if matches!(format, OutputFormat::Table | OutputFormat::Csv) {
        value["result"]["fines_schedule"] = Value::Array(labelled_rows(&output.result)?);
    }
    Ok(value)
}

/// Fines rows with the month column rendered as a display label.
fn labelled_rows(fines: &FinesQuote) -> Result<Vec<Value>, serde_json::Error> {
    fines
        .fines_schedule
        .iter()
        .map(|row| {
            let mut value = serde_json::to_value(row)?;
            value["month"] = Value::String(row.month_label());
            Ok(value)
        })
        .collect()
}

fn fines_from_flags(args: &FinesArgs) -> Result<FinesInput, Box<dyn std::error::Error>> {
    Ok(FinesInput {
        loan_type: args
            .loan_type
            .clone()
            .ok_or("--loan-type is required (or provide --input)")?,
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        late_month: args
            .late_month
            .ok_or("--late-month is required (or provide --input)")?,
        months_late: args
            .months_late
            .ok_or("--months-late is required (or provide --input)")?,
        payments: args
            .payments
            .iter()
            .map(|p| parse_payment(p))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Parse a `MONTH=AMOUNT` payment flag.
fn parse_payment(raw: &str) -> Result<PaymentEntry, String> {
    let (month, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid --payment '{raw}': expected MONTH=AMOUNT"))?;
    let month: i64 = month
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --payment '{raw}': month must be a whole number"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --payment '{raw}': amount must be numeric"))?;
    Ok(PaymentEntry { month, amount })
}

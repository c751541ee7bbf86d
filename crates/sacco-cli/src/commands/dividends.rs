use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use sacco_core::dividends::weighted::{self, DividendInput};

use crate::input;

/// Arguments for the dividend calculator
#[derive(Args)]
pub struct DividendArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Contributions from January onwards, comma separated; missing months count as zero
    #[arg(long, value_delimiter = ',', num_args = 1..=12)]
    pub contributions: Vec<Decimal>,

    /// Dividend rate as a percentage
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_dividend(args: DividendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dividend_input: DividendInput = if args.input.is_none() && args.rate.is_some() {
        from_flags(&args)?
    } else {
        match input::read_input(args.input.as_deref())? {
            Some(data) => data,
            None => from_flags(&args)?,
        }
    };

    let result = weighted::calculate_dividend(&dividend_input)?;
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &DividendArgs) -> Result<DividendInput, Box<dyn std::error::Error>> {
    if args.contributions.len() > 12 {
        return Err("--contributions takes at most 12 monthly values".into());
    }
    let mut monthly_contributions = [Decimal::ZERO; 12];
    for (slot, value) in monthly_contributions.iter_mut().zip(&args.contributions) {
        *slot = *value;
    }
    Ok(DividendInput {
        monthly_contributions,
        dividend_rate_percent: args
            .rate
            .ok_or("--rate is required (or provide --input)")?,
    })
}

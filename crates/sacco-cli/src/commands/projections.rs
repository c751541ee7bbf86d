use clap::Args;
use serde_json::Value;

use sacco_core::projections::growth::{self, ProjectionInput};

use crate::input;

/// Arguments for growth projections
#[derive(Args)]
pub struct ProjectionArgs {
    /// Path to JSON input file with `start` and `end` snapshots
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_projections(args: ProjectionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection_input: ProjectionInput = input::read_input(args.input.as_deref())?
        .ok_or("--input file is required for growth projections")?;

    let result = growth::project_growth(&projection_input)?;
    Ok(serde_json::to_value(result)?)
}

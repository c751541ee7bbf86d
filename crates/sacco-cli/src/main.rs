mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process;

use commands::dividends::DividendArgs;
use commands::loans::{FinesArgs, LoanArgs};
use commands::projections::ProjectionArgs;

/// Loan, fines, dividend and growth calculations for Soyosoyo SACCO
#[derive(Parser)]
#[command(
    name = "sacco",
    version,
    about = "Loan, fines, dividend and growth calculations for Soyosoyo SACCO",
    long_about = "A CLI for the SACCO member calculators with decimal precision. \
                  Prices loan products, builds amortization schedules, applies \
                  late-payment fines, computes time-weighted dividends, and \
                  projects membership and balance-sheet growth."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the loan products and their terms
    Products,
    /// Price a loan and build its amortization schedule
    LoanQuote(LoanArgs),
    /// Apply missed installments and recorded payments to a loan
    Fines(FinesArgs),
    /// Chart series (principal, interest, balance per month) for a loan
    Chart(LoanArgs),
    /// Time-weighted dividend on monthly contributions
    Dividend(DividendArgs),
    /// Five-year growth projection from two metric snapshots
    Projections(ProjectionArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Products => commands::loans::run_products(),
        Commands::LoanQuote(args) => commands::loans::run_loan_quote(args),
        Commands::Fines(args) => commands::loans::run_fines(args, &cli.output),
        Commands::Chart(args) => commands::loans::run_chart(args),
        Commands::Dividend(args) => commands::dividends::run_dividend(args),
        Commands::Projections(args) => commands::projections::run_projections(args),
        Commands::Version => {
            println!("sacco {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

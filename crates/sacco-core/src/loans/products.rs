//! Fixed catalog of loan products offered to members.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SaccoError;
use crate::types::Rate;

/// Loan product selector. Keys match the website's loan-type dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    #[serde(rename = "emergency")]
    Emergency,
    #[serde(rename = "medicare")]
    Medicare,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "development")]
    Development,
    #[serde(rename = "apiCulture")]
    ApiCulture,
}

impl LoanType {
    pub const ALL: [LoanType; 5] = [
        LoanType::Emergency,
        LoanType::Medicare,
        LoanType::Education,
        LoanType::Development,
        LoanType::ApiCulture,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            LoanType::Emergency => "emergency",
            LoanType::Medicare => "medicare",
            LoanType::Education => "education",
            LoanType::Development => "development",
            LoanType::ApiCulture => "apiCulture",
        }
    }

    pub fn configuration(&self) -> LoanConfiguration {
        match self {
            LoanType::Emergency => LoanConfiguration::new(*self, dec!(36), 3, true, 0),
            LoanType::Medicare => LoanConfiguration::new(*self, dec!(4), 12, true, 0),
            LoanType::Education => LoanConfiguration::new(*self, dec!(4), 12, true, 0),
            LoanType::Development => LoanConfiguration::new(*self, dec!(12), 12, true, 0),
            LoanType::ApiCulture => LoanConfiguration::new(*self, dec!(2), 12, false, 3),
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LoanType {
    type Err = SaccoError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        LoanType::ALL
            .into_iter()
            .find(|t| t.key() == key.trim())
            .ok_or_else(|| SaccoError::InvalidLoanType {
                key: key.to_string(),
            })
    }
}

/// Terms of a loan product. Immutable; obtained from [`LoanType::configuration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfiguration {
    pub loan_type: LoanType,
    /// Annual simple-interest rate as a percentage (36 = 36% p.a.).
    pub annual_rate_percent: Decimal,
    pub tenure_months: u32,
    pub allow_fines: bool,
    /// Months before the first repayment falls due.
    pub grace_period_months: u32,
    pub rate_label: String,
}

impl LoanConfiguration {
    fn new(
        loan_type: LoanType,
        annual_rate_percent: Decimal,
        tenure_months: u32,
        allow_fines: bool,
        grace_period_months: u32,
    ) -> Self {
        Self {
            loan_type,
            annual_rate_percent,
            tenure_months,
            allow_fines,
            grace_period_months,
            rate_label: format!("{}% p.a. (Simple Interest)", annual_rate_percent.normalize()),
        }
    }

    /// Annual rate as a decimal fraction.
    pub fn annual_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(100)
    }

    /// Grace window plus repayment tenure.
    pub fn term_months(&self) -> u32 {
        self.grace_period_months + self.tenure_months
    }

    pub fn tenure_label(&self) -> String {
        if self.grace_period_months > 0 {
            format!(
                "{} (+{} months grace)",
                self.tenure_months, self.grace_period_months
            )
        } else {
            self.tenure_months.to_string()
        }
    }
}

/// Resolve a loan-type key to its product terms.
pub fn resolve(key: &str) -> Result<LoanConfiguration, SaccoError> {
    key.parse::<LoanType>().map(|t| t.configuration())
}

/// Every product in catalog order.
pub fn catalog() -> Vec<LoanConfiguration> {
    LoanType::ALL.iter().map(|t| t.configuration()).collect()
}

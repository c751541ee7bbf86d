use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaccoError {
    #[error("Invalid loan type: '{key}' is not a known loan product")]
    InvalidLoanType { key: String },

    #[error("Invalid principal: {value} (must be a positive amount)")]
    InvalidPrincipal { value: Decimal },

    #[error("Fines are not applicable for loan type '{loan_type}'")]
    FinesNotApplicable { loan_type: String },

    #[error("Month of first missed payment ({month}) must be between 1 and the loan term ({term_months} months)")]
    InvalidLateMonth { month: i64, term_months: u32 },

    #[error("Invalid payment entry: {field}: {reason}")]
    InvalidPaymentInput { field: String, reason: String },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SaccoError {
    fn from(e: serde_json::Error) -> Self {
        SaccoError::SerializationError(e.to_string())
    }
}

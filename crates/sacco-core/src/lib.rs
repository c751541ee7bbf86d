pub mod error;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "dividends")]
pub mod dividends;

#[cfg(feature = "projections")]
pub mod projections;

pub use error::SaccoError;
pub use types::*;

/// Standard result type for all SACCO calculations
pub type SaccoResult<T> = Result<T, SaccoError>;

pub mod dividends;
pub mod loans;
pub mod projections;

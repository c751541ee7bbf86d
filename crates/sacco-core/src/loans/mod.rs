//! SACCO loan products, repayment schedules and late-payment fines.

pub mod amortization;
pub mod fines;
pub mod products;
pub mod report;

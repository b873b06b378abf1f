//! General functions related to finance.
use crate::units::{Dimensionless, Money};

/// Calculates the capital recovery factor (CRF) for a given term and interest rate.
///
/// The CRF gives the fixed annual payment which repays a loan of one unit over the term.
pub fn capital_recovery_factor(term: u32, interest_rate: Dimensionless) -> Dimensionless {
    if term == 0 {
        return Dimensionless(0.0);
    }
    if interest_rate == Dimensionless(0.0) {
        return Dimensionless(1.0) / Dimensionless(term as f64);
    }
    let factor = (Dimensionless(1.0) + interest_rate).powi(term as i32);
    (interest_rate * factor) / (factor - Dimensionless(1.0))
}

/// The factor by which an amount in the given year is multiplied to give its present value
pub fn discount_factor(year: u32, discount_rate: Dimensionless) -> Dimensionless {
    Dimensionless(1.0) / (Dimensionless(1.0) + discount_rate).powi(year as i32)
}

/// Present value of an amount in the given year
pub fn present_value(amount: Money, year: u32, discount_rate: Dimensionless) -> Money {
    amount * discount_factor(year, discount_rate)
}

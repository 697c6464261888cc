use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::utils::error::{AppError, AppResult};

// Prices are stored as integer cents
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn to_cents(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| AppError::ValidationError(format!("Amount {} is out of range", amount)))
}

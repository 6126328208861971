//! credit ledger: reservation and release of a customer's credit line
use tracing::warn;

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::Customer;

impl Customer {
    /// unused portion of the credit line
    pub fn available_credit(&self) -> Money {
        self.credit_limit - self.used_credit_limit
    }

    pub fn can_afford(&self, amount: Money) -> bool {
        self.available_credit() >= amount
    }

    /// commit `amount` of the credit line; no change on failure
    pub fn reserve(&mut self, amount: Money) -> Result<()> {
        if amount.is_negative() {
            return Err(LendingError::InvalidAmount { amount });
        }

        if !self.can_afford(amount) {
            return Err(LendingError::InsufficientCredit {
                available: self.available_credit(),
                required: amount,
            });
        }

        self.used_credit_limit += amount;
        Ok(())
    }

    /// give back `amount` of used credit, never going below zero.
    /// returns what was actually released.
    pub fn release(&mut self, amount: Money) -> Money {
        if !amount.is_positive() {
            return Money::ZERO;
        }

        let released = amount.min(self.used_credit_limit);
        if released < amount {
            warn!(
                customer_id = %self.id,
                requested = %amount,
                released = %released,
                "credit release clamped at zero used credit"
            );
        }

        self.used_credit_limit -= released;
        released
    }
}

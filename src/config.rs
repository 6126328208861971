use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LendingError, Result};

/// lending product configuration, fixed for the lifetime of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingConfig {
    /// installment counts a loan may be issued with
    pub allowed_installment_counts: Vec<u32>,
    /// lowest accepted flat markup (inclusive)
    pub min_interest_rate: Rate,
    /// highest accepted flat markup (inclusive)
    pub max_interest_rate: Rate,
    /// discount per day early and penalty per day late, as a fraction of the nominal amount
    pub daily_adjustment_rate: Rate,
    /// installments due further out than this many months are not payable yet
    pub payment_horizon_months: u32,
}

impl LendingConfig {
    /// standard product: 6/9/12/24 installments, 10%-50% markup, 0.1% per day, 3 month horizon
    pub fn standard() -> Self {
        Self {
            allowed_installment_counts: vec![6, 9, 12, 24],
            min_interest_rate: Rate::from_decimal(dec!(0.1)),
            max_interest_rate: Rate::from_decimal(dec!(0.5)),
            daily_adjustment_rate: Rate::from_decimal(dec!(0.001)),
            payment_horizon_months: 3,
        }
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LendingConfig =
            serde_json::from_str(json).map_err(|e| LendingError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.allowed_installment_counts.is_empty() {
            return Err(LendingError::InvalidConfiguration {
                message: "at least one installment count is required".to_string(),
            });
        }

        if self.allowed_installment_counts.contains(&0) {
            return Err(LendingError::InvalidConfiguration {
                message: "installment count must be positive".to_string(),
            });
        }

        if self.min_interest_rate < Rate::ZERO || self.min_interest_rate > self.max_interest_rate {
            return Err(LendingError::InvalidConfiguration {
                message: format!(
                    "interest rate bounds [{}, {}] are not a valid range",
                    self.min_interest_rate, self.max_interest_rate
                ),
            });
        }

        if self.daily_adjustment_rate < Rate::ZERO {
            return Err(LendingError::InvalidConfiguration {
                message: format!("daily adjustment rate {} is negative", self.daily_adjustment_rate),
            });
        }

        Ok(())
    }

    pub fn is_allowed_installment_count(&self, count: u32) -> bool {
        self.allowed_installment_counts.contains(&count)
    }

    pub fn is_allowed_interest_rate(&self, rate: Rate) -> bool {
        rate >= self.min_interest_rate && rate <= self.max_interest_rate
    }

    /// check installment count then rate, in that order
    pub fn validate_terms(&self, installment_count: u32, interest_rate: Rate) -> Result<()> {
        if !self.is_allowed_installment_count(installment_count) {
            return Err(LendingError::InvalidInstallmentCount {
                count: installment_count,
                allowed: self.allowed_installment_counts.clone(),
            });
        }

        if !self.is_allowed_interest_rate(interest_rate) {
            return Err(LendingError::InvalidInterestRate {
                rate: interest_rate,
                min: self.min_interest_rate,
                max: self.max_interest_rate,
            });
        }

        Ok(())
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

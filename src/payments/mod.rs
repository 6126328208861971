pub mod adjustment;
pub mod allocation;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;

pub use adjustment::{Adjustment, AdjustmentEngine, Timing};
pub use allocation::{Allocation, PaymentAllocator, Settlement};

/// what a `pay_loan` call achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub installments_paid: u32,
    pub total_spent: Money,
    pub loan_fully_paid: bool,
}

impl PaymentOutcome {
    pub fn nothing_paid(&self) -> bool {
        self.installments_paid == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_format() {
        let outcome = PaymentOutcome {
            installments_paid: 2,
            total_spent: Money::from_str_exact("1987.60").unwrap(),
            loan_fully_paid: false,
        };

        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["installmentsPaid"], 2);
        assert_eq!(json["totalSpent"], "1987.60");
        assert_eq!(json["loanFullyPaid"], false);
        assert!(!outcome.nothing_paid());
    }
}

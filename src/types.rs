use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::payments::Adjustment;

pub type CustomerId = Uuid;
pub type LoanId = Uuid;
pub type InstallmentId = Uuid;

/// borrower holding a credit line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub surname: String,
    pub credit_limit: Money,
    pub used_credit_limit: Money,
}

impl Customer {
    pub fn new(name: impl Into<String>, surname: impl Into<String>, credit_limit: Money) -> Result<Self> {
        if credit_limit.is_negative() {
            return Err(LendingError::InvalidAmount {
                amount: credit_limit,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            surname: surname.into(),
            credit_limit,
            used_credit_limit: Money::ZERO,
        })
    }
}

/// issued loan; `loan_amount` is the total repayable, not the principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub loan_amount: Money,
    pub number_of_installments: u32,
    pub create_date: NaiveDate,
    pub is_paid: bool,
}

/// one scheduled repayment of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    /// 1-based position in the schedule
    pub sequence: u32,
    pub amount: Money,
    pub paid_amount: Money,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub is_paid: bool,
}

impl Installment {
    pub fn scheduled(loan_id: LoanId, sequence: u32, amount: Money, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            sequence,
            amount,
            paid_amount: Money::ZERO,
            due_date,
            payment_date: None,
            is_paid: false,
        }
    }

    /// mark paid with the adjusted amount; a paid installment never changes again
    pub fn settle(&mut self, adjustment: &Adjustment, payment_date: NaiveDate) -> Result<()> {
        if self.is_paid {
            return Err(LendingError::InstallmentAlreadyPaid { id: self.id });
        }

        self.is_paid = true;
        self.paid_amount = adjustment.final_amount;
        self.payment_date = Some(payment_date);
        Ok(())
    }
}

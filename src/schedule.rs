use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::{Installment, LoanId};

/// scheduled installment before it is bound to a stored loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub sequence: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// equal-amount monthly plan due on the first day of each month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub total: Money,
    pub installment_amount: Money,
    pub installments: Vec<ScheduledInstallment>,
}

impl InstallmentPlan {
    /// build the plan for `total` split across `count` installments,
    /// the first due on the 1st of the month after `today`
    pub fn generate(total: Money, count: u32, today: NaiveDate) -> Result<Self> {
        if count == 0 {
            return Err(LendingError::EmptySchedule);
        }
        let installment_amount = total.split_even(count).ok_or(LendingError::InvalidAmount { amount: total })?;

        let first_due = first_day_of_next_month(today)?;

        let installments = (0..count)
            .map(|offset| -> Result<ScheduledInstallment> {
                let due_date = first_due
                    .checked_add_months(Months::new(offset))
                    .ok_or(LendingError::DateOutOfRange {
                        start: first_due,
                        months: offset,
                    })?;
                Ok(ScheduledInstallment {
                    sequence: offset + 1,
                    amount: installment_amount,
                    due_date,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            total,
            installment_amount,
            installments,
        })
    }

    /// sum of scheduled amounts
    pub fn scheduled_total(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }

    /// scheduled total minus loan total; non-zero when the total does not divide evenly.
    /// the drift is accepted and never reconciled.
    pub fn rounding_drift(&self) -> Money {
        self.scheduled_total() - self.total
    }

    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.installments.first().map(|i| i.due_date)
    }

    /// bind the plan to a loan as unpaid installment records
    pub fn into_installments(self, loan_id: LoanId) -> Vec<Installment> {
        self.installments
            .into_iter()
            .map(|s| Installment::scheduled(loan_id, s.sequence, s.amount, s.due_date))
            .collect()
    }
}

pub fn first_day_of_next_month(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .ok_or(LendingError::DateOutOfRange {
            start: date,
            months: 1,
        })
}

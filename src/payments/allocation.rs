use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LendingConfig;
use crate::decimal::Money;
use crate::types::{Installment, InstallmentId};

use super::adjustment::{Adjustment, AdjustmentEngine};

/// one installment the payment covered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub installment_id: InstallmentId,
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub adjustment: Adjustment,
}

/// result of walking a payment over a loan's installments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Allocation {
    pub settlements: Vec<Settlement>,
    pub total_spent: Money,
    /// part of the payment nothing consumed; discarded by the caller
    pub unapplied: Money,
    /// unpaid installments passed over for being due beyond the horizon
    pub beyond_horizon: u32,
    /// installment the payment could not cover, ending the walk
    pub halted_at: Option<InstallmentId>,
}

impl Allocation {
    pub fn installments_paid(&self) -> u32 {
        self.settlements.len() as u32
    }
}

/// strict due-date ordered greedy allocation; never partially settles an installment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentAllocator {
    engine: AdjustmentEngine,
    horizon_months: u32,
}

impl PaymentAllocator {
    pub fn new(engine: AdjustmentEngine, horizon_months: u32) -> Self {
        Self {
            engine,
            horizon_months,
        }
    }

    pub fn from_config(config: &LendingConfig) -> Self {
        Self::new(AdjustmentEngine::from_config(config), config.payment_horizon_months)
    }

    /// latest due date payable today
    pub fn horizon(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_months(Months::new(self.horizon_months))
    }

    /// plan which installments `payment` settles on `today`. does not mutate anything.
    pub fn allocate(&self, installments: &[Installment], payment: Money, today: NaiveDate) -> Allocation {
        let mut ordered: Vec<&Installment> = installments.iter().collect();
        ordered.sort_by_key(|i| (i.due_date, i.sequence));

        let horizon = self.horizon(today);
        let mut allocation = Allocation::default();
        let mut remaining = payment;

        for installment in ordered {
            if installment.is_paid {
                continue;
            }

            // later installments are still considered
            if horizon.map_or(false, |limit| installment.due_date > limit) {
                allocation.beyond_horizon += 1;
                debug!(
                    installment_id = %installment.id,
                    due_date = %installment.due_date,
                    "installment beyond payment horizon"
                );
                continue;
            }

            let Some(adjustment) = self
                .engine
                .settlement_amount(installment.amount, installment.due_date, today)
            else {
                debug!(
                    installment_id = %installment.id,
                    due_date = %installment.due_date,
                    "settlement amount out of range"
                );
                allocation.halted_at = Some(installment.id);
                break;
            };

            if remaining < adjustment.final_amount {
                debug!(
                    installment_id = %installment.id,
                    required = %adjustment.final_amount,
                    remaining = %remaining,
                    "payment exhausted"
                );
                allocation.halted_at = Some(installment.id);
                break;
            }

            let (Some(left), Some(spent)) = (
                remaining.checked_sub(adjustment.final_amount),
                allocation.total_spent.checked_add(adjustment.final_amount),
            ) else {
                allocation.halted_at = Some(installment.id);
                break;
            };

            remaining = left;
            allocation.total_spent = spent;
            allocation.settlements.push(Settlement {
                installment_id: installment.id,
                sequence: installment.sequence,
                due_date: installment.due_date,
                adjustment,
            });
        }

        allocation.unapplied = remaining.max(Money::ZERO);
        allocation
    }
}

impl Default for PaymentAllocator {
    fn default() -> Self {
        Self::from_config(&LendingConfig::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::Timing;
    use chrono::Duration;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(loan_id: Uuid, amount: i64, first_due: NaiveDate, count: u32) -> Vec<Installment> {
        (0..count)
            .map(|i| {
                Installment::scheduled(
                    loan_id,
                    i + 1,
                    Money::from_major(amount),
                    first_due.checked_add_months(Months::new(i)).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_single_early_installment() {
        let today = date(2024, 1, 22);
        let installments = vec![Installment::scheduled(
            Uuid::new_v4(),
            1,
            Money::from_major(1_000),
            today + Duration::days(10),
        )];

        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(1_000), today);

        assert_eq!(allocation.installments_paid(), 1);
        assert_eq!(allocation.total_spent.to_string(), "990.00");
        assert_eq!(allocation.unapplied, Money::from_major(10));
        assert_eq!(allocation.settlements[0].adjustment.timing, Timing::Early { days: 10 });
    }

    #[test]
    fn test_late_installment_not_covered_by_nominal() {
        let today = date(2024, 2, 11);
        let installments = vec![Installment::scheduled(
            Uuid::new_v4(),
            1,
            Money::from_major(1_000),
            today - Duration::days(10),
        )];

        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(1_000), today);

        assert_eq!(allocation.installments_paid(), 0);
        assert_eq!(allocation.total_spent, Money::ZERO);
        assert_eq!(allocation.halted_at, Some(installments[0].id));
    }

    #[test]
    fn test_spans_multiple_installments() {
        let today = date(2024, 2, 1);
        let installments = schedule(Uuid::new_v4(), 100, today, 6);

        // feb on time (100), mar early 29 days (97.10), apr early 60 days (94.00)
        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(300), today);

        assert_eq!(allocation.installments_paid(), 3);
        assert_eq!(allocation.total_spent.to_string(), "291.10");
        assert_eq!(allocation.unapplied.to_string(), "8.90");
        // may is 90 days out, within the 3 month horizon, but 91.00 > 8.90
        assert_eq!(allocation.halted_at, Some(installments[3].id));
    }

    #[test]
    fn test_halts_even_if_later_installment_is_cheaper() {
        let today = date(2024, 3, 1);
        let loan_id = Uuid::new_v4();
        let installments = vec![
            Installment::scheduled(loan_id, 1, Money::from_major(500), date(2024, 3, 1)),
            Installment::scheduled(loan_id, 2, Money::from_major(10), date(2024, 4, 1)),
        ];

        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(100), today);

        assert_eq!(allocation.installments_paid(), 0);
        assert_eq!(allocation.unapplied, Money::from_major(100));
    }

    #[test]
    fn test_skips_paid_installments() {
        let today = date(2024, 3, 1);
        let mut installments = schedule(Uuid::new_v4(), 100, date(2024, 2, 1), 3);
        let adjustment = AdjustmentEngine::default().settlement_amount(
            installments[0].amount,
            installments[0].due_date,
            date(2024, 2, 1),
        )
        .unwrap();
        installments[0].settle(&adjustment, date(2024, 2, 1)).unwrap();

        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(100), today);

        assert_eq!(allocation.installments_paid(), 1);
        assert_eq!(allocation.settlements[0].installment_id, installments[1].id);
    }

    #[test]
    fn test_beyond_horizon_skipped_not_halting() {
        let today = date(2024, 1, 15);
        let loan_id = Uuid::new_v4();
        let mut installments = vec![
            Installment::scheduled(loan_id, 1, Money::from_major(100), date(2024, 1, 15)),
            // out of order on purpose; allocation sorts by due date
            Installment::scheduled(loan_id, 2, Money::from_major(100), date(2024, 2, 15)),
            Installment::scheduled(loan_id, 3, Money::from_major(100), date(2024, 6, 1)),
        ];
        installments.swap(1, 2);

        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(1_000_000), today);

        // 2024-04-15 is the last payable due date
        assert_eq!(allocation.installments_paid(), 2);
        assert_eq!(allocation.beyond_horizon, 1);
        assert!(allocation.settlements.iter().all(|s| s.due_date <= date(2024, 4, 15)));
    }

    #[test]
    fn test_horizon_is_inclusive() {
        let today = date(2024, 1, 15);
        let loan_id = Uuid::new_v4();
        let installments = vec![
            Installment::scheduled(loan_id, 1, Money::from_major(100), date(2024, 4, 15)),
            Installment::scheduled(loan_id, 2, Money::from_major(100), date(2024, 4, 16)),
        ];

        let allocation = PaymentAllocator::default().allocate(&installments, Money::from_major(1_000), today);

        assert_eq!(allocation.installments_paid(), 1);
        assert_eq!(allocation.beyond_horizon, 1);
    }

    #[test]
    fn test_out_of_range_penalty_halts() {
        let today = date(2024, 3, 1);
        let loan_id = Uuid::new_v4();
        let huge = Money::from_decimal(rust_decimal::Decimal::MAX / rust_decimal::Decimal::from(4));
        let installments = vec![
            Installment::scheduled(loan_id, 1, huge, date(2020, 3, 1)),
            Installment::scheduled(loan_id, 2, Money::from_major(10), date(2024, 3, 1)),
        ];
        let allocator = PaymentAllocator::new(AdjustmentEngine::new(crate::decimal::Rate::from_percentage(100)), 3);

        let allocation = allocator.allocate(&installments, huge, today);

        assert_eq!(allocation.installments_paid(), 0);
        assert_eq!(allocation.halted_at, Some(installments[0].id));
        assert_eq!(allocation.unapplied, huge);
    }

    #[test]
    fn test_zero_and_negative_payments() {
        let today = date(2024, 2, 1);
        let installments = schedule(Uuid::new_v4(), 100, today, 3);
        let allocator = PaymentAllocator::default();

        for payment in [Money::ZERO, Money::from_major(-50)] {
            let allocation = allocator.allocate(&installments, payment, today);
            assert_eq!(allocation.installments_paid(), 0);
            assert_eq!(allocation.total_spent, Money::ZERO);
            assert_eq!(allocation.unapplied, Money::ZERO);
        }
    }
}

use std::collections::HashMap;

use crate::errors::{LendingError, Result};
use crate::types::{Customer, CustomerId, Installment, InstallmentId, Loan, LoanId};

/// durable storage for customers, loans and installments
pub trait LedgerStore {
    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    fn save_customer(&mut self, customer: Customer) -> Result<Customer>;

    fn get_loan(&self, id: LoanId) -> Result<Option<Loan>>;

    fn get_loans_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>>;

    fn save_loan(&mut self, loan: Loan) -> Result<Loan>;

    /// ordered by due date ascending
    fn get_installments_by_loan(&self, loan_id: LoanId) -> Result<Vec<Installment>>;

    fn save_installment(&mut self, installment: Installment) -> Result<Installment>;

    fn save_installments(&mut self, installments: Vec<Installment>) -> Result<Vec<Installment>> {
        installments
            .into_iter()
            .map(|installment| self.save_installment(installment))
            .collect()
    }

    /// run `f` so that either all of its writes apply or none do
    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}

/// in-memory ledger with snapshot rollback
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    customers: HashMap<CustomerId, Customer>,
    loans: HashMap<LoanId, Loan>,
    installments: HashMap<InstallmentId, Installment>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    pub fn installment_count(&self) -> usize {
        self.installments.len()
    }
}

impl LedgerStore for InMemoryLedger {
    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.customers.get(&id).cloned())
    }

    fn save_customer(&mut self, customer: Customer) -> Result<Customer> {
        if customer.used_credit_limit.is_negative() || customer.used_credit_limit > customer.credit_limit {
            return Err(LendingError::storage(format!(
                "customer {} used credit {} outside [0, {}]",
                customer.id, customer.used_credit_limit, customer.credit_limit
            )));
        }

        self.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    fn get_loan(&self, id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans.get(&id).cloned())
    }

    fn get_loans_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>> {
        let mut loans: Vec<Loan> = self
            .loans
            .values()
            .filter(|loan| loan.customer_id == customer_id)
            .cloned()
            .collect();
        loans.sort_by_key(|loan| (loan.create_date, loan.id));
        Ok(loans)
    }

    fn save_loan(&mut self, loan: Loan) -> Result<Loan> {
        if !self.customers.contains_key(&loan.customer_id) {
            return Err(LendingError::storage(format!(
                "loan {} references unknown customer {}",
                loan.id, loan.customer_id
            )));
        }

        if let Some(existing) = self.loans.get(&loan.id) {
            if existing.is_paid && !loan.is_paid {
                return Err(LendingError::storage(format!("loan {} is paid and cannot reopen", loan.id)));
            }
        }

        self.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    fn get_installments_by_loan(&self, loan_id: LoanId) -> Result<Vec<Installment>> {
        let mut installments: Vec<Installment> = self
            .installments
            .values()
            .filter(|installment| installment.loan_id == loan_id)
            .cloned()
            .collect();
        installments.sort_by_key(|installment| (installment.due_date, installment.sequence));
        Ok(installments)
    }

    fn save_installment(&mut self, installment: Installment) -> Result<Installment> {
        if !self.loans.contains_key(&installment.loan_id) {
            return Err(LendingError::storage(format!(
                "installment {} references unknown loan {}",
                installment.id, installment.loan_id
            )));
        }

        if let Some(existing) = self.installments.get(&installment.id) {
            if existing.is_paid && *existing != installment {
                return Err(LendingError::storage(format!(
                    "installment {} is paid and immutable",
                    installment.id
                )));
            }
        }

        self.installments.insert(installment.id, installment.clone());
        Ok(installment)
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::errors::ErrorKind;
    use crate::payments::AdjustmentEngine;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> (InMemoryLedger, Customer, Loan) {
        let mut store = InMemoryLedger::new();
        let customer = store
            .save_customer(Customer::new("Alan", "Turing", Money::from_major(10_000)).unwrap())
            .unwrap();
        let loan = store
            .save_loan(Loan {
                id: Uuid::new_v4(),
                customer_id: customer.id,
                principal: Money::from_major(500),
                interest_rate: Rate::from_percentage(20),
                loan_amount: Money::from_major(600),
                number_of_installments: 6,
                create_date: date(2024, 1, 10),
                is_paid: false,
            })
            .unwrap();
        (store, customer, loan)
    }

    #[test]
    fn test_installments_ordered_by_due_date() {
        let (mut store, _, loan) = seeded();
        let later = Installment::scheduled(loan.id, 2, Money::from_major(100), date(2024, 3, 1));
        let earlier = Installment::scheduled(loan.id, 1, Money::from_major(100), date(2024, 2, 1));
        store.save_installments(vec![later, earlier]).unwrap();

        let stored = store.get_installments_by_loan(loan.id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].due_date, date(2024, 2, 1));
        assert_eq!(stored[1].due_date, date(2024, 3, 1));

        assert!(store.get_installments_by_loan(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_loans_by_customer() {
        let (store, customer, loan) = seeded();
        assert_eq!(store.get_loans_by_customer(customer.id).unwrap(), vec![loan]);
        assert!(store.get_loans_by_customer(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_referential_constraints() {
        let (mut store, _, _) = seeded();

        let orphan = Installment::scheduled(Uuid::new_v4(), 1, Money::from_major(1), date(2024, 2, 1));
        let err = store.save_installment(orphan).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);

        let mut customer = Customer::new("No", "Limit", Money::from_major(10)).unwrap();
        customer.used_credit_limit = Money::from_major(11);
        assert!(store.save_customer(customer).is_err());
        assert_eq!(store.customer_count(), 1);
    }

    #[test]
    fn test_paid_installment_is_immutable() {
        let (mut store, _, loan) = seeded();
        let mut installment = Installment::scheduled(loan.id, 1, Money::from_major(100), date(2024, 2, 1));
        let adjustment =
            AdjustmentEngine::default()
                .settlement_amount(installment.amount, installment.due_date, date(2024, 2, 1))
                .unwrap();
        installment.settle(&adjustment, date(2024, 2, 1)).unwrap();
        store.save_installment(installment.clone()).unwrap();

        // identical rewrite is harmless
        assert!(store.save_installment(installment.clone()).is_ok());

        let mut tampered = installment.clone();
        tampered.paid_amount = Money::from_major(1);
        assert!(store.save_installment(tampered).is_err());

        let mut reopened = installment;
        reopened.is_paid = false;
        assert!(store.save_installment(reopened).is_err());
    }

    #[test]
    fn test_paid_loan_cannot_reopen() {
        let (mut store, _, mut loan) = seeded();
        loan.is_paid = true;
        store.save_loan(loan.clone()).unwrap();

        loan.is_paid = false;
        assert!(store.save_loan(loan).is_err());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let (mut store, customer, _) = seeded();

        let result: Result<()> = store.transaction(|tx| {
            let mut c = tx.get_customer(customer.id)?.unwrap();
            c.used_credit_limit = Money::from_major(1_000);
            tx.save_customer(c)?;
            Err(LendingError::storage("connection reset"))
        });

        assert!(result.is_err());
        let stored = store.get_customer(customer.id).unwrap().unwrap();
        assert_eq!(stored.used_credit_limit, Money::ZERO);
    }

    #[test]
    fn test_transaction_commits() {
        let (mut store, customer, _) = seeded();

        store
            .transaction(|tx| {
                let mut c = tx.get_customer(customer.id)?.unwrap();
                c.used_credit_limit = Money::from_major(1_000);
                tx.save_customer(c)
            })
            .unwrap();

        let stored = store.get_customer(customer.id).unwrap().unwrap();
        assert_eq!(stored.used_credit_limit, Money::from_major(1_000));
    }
}

use std::collections::HashMap;

use hourglass_rs::SafeTimeProvider;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::LendingConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::payments::{Allocation, PaymentAllocator, PaymentOutcome};
use crate::schedule::InstallmentPlan;
use crate::store::LedgerStore;
use crate::types::{Customer, CustomerId, Installment, InstallmentId, Loan, LoanId};

/// issues loans and allocates payments over a ledger store
pub struct LoanService<S: LedgerStore> {
    store: S,
    config: LendingConfig,
    allocator: PaymentAllocator,
    events: EventStore,
}

/// everything a committed payment touched
struct PaymentReceipt {
    loan: Loan,
    customer: Customer,
    allocation: Allocation,
    released: Money,
    all_paid: bool,
    settled_now: bool,
}

impl<S: LedgerStore> LoanService<S> {
    pub fn new(store: S, config: LendingConfig) -> Result<Self> {
        config.validate()?;
        let allocator = PaymentAllocator::from_config(&config);

        Ok(Self {
            store,
            config,
            allocator,
            events: EventStore::new(),
        })
    }

    /// service with the standard 6/9/12/24 product
    pub fn with_standard_config(store: S) -> Self {
        let config = LendingConfig::standard();
        Self {
            store,
            allocator: PaymentAllocator::from_config(&config),
            config,
            events: EventStore::new(),
        }
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn register_customer(
        &mut self,
        name: impl Into<String>,
        surname: impl Into<String>,
        credit_limit: Money,
    ) -> Result<Customer> {
        let customer = Customer::new(name, surname, credit_limit)?;
        let customer = self.store.save_customer(customer)?;
        info!(customer_id = %customer.id, credit_limit = %customer.credit_limit, "customer registered");
        Ok(customer)
    }

    pub fn customer(&self, customer_id: CustomerId) -> Result<Customer> {
        self.store
            .get_customer(customer_id)?
            .ok_or(LendingError::CustomerNotFound { id: customer_id })
    }

    pub fn loan(&self, loan_id: LoanId) -> Result<Loan> {
        self.store
            .get_loan(loan_id)?
            .ok_or(LendingError::LoanNotFound { id: loan_id })
    }

    /// loans of a customer; empty for an unknown customer
    pub fn loans_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>> {
        self.store.get_loans_by_customer(customer_id)
    }

    /// installments of a loan ordered by due date
    pub fn installments_for_loan(&self, loan_id: LoanId) -> Result<Vec<Installment>> {
        self.store.get_installments_by_loan(loan_id)
    }

    /// create loan with system time
    pub fn create_loan_now(
        &mut self,
        customer_id: CustomerId,
        principal: Money,
        interest_rate: Rate,
        number_of_installments: u32,
    ) -> Result<Loan> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.create_loan(customer_id, principal, interest_rate, number_of_installments, &time)
    }

    /// issue a loan of `principal * (1 + interest_rate)` repaid in equal monthly installments
    #[instrument(skip(self, time_provider))]
    pub fn create_loan(
        &mut self,
        customer_id: CustomerId,
        principal: Money,
        interest_rate: Rate,
        number_of_installments: u32,
        time_provider: &SafeTimeProvider,
    ) -> Result<Loan> {
        // validate
        self.config.validate_terms(number_of_installments, interest_rate)?;

        if !principal.is_positive() {
            return Err(LendingError::InvalidAmount { amount: principal });
        }

        let now = time_provider.now();
        let today = now.date_naive();
        let total = principal
            .with_markup(interest_rate)
            .ok_or(LendingError::InvalidAmount { amount: principal })?;

        let plan = InstallmentPlan::generate(total, number_of_installments, today)?;
        let installment_amount = plan.installment_amount;
        let first_due_date = plan.first_due_date();

        let (loan, customer) = self.store.transaction(|store| {
            let mut customer = store
                .get_customer(customer_id)?
                .ok_or(LendingError::CustomerNotFound { id: customer_id })?;

            customer.reserve(total)?;
            let customer = store.save_customer(customer)?;

            let loan = store.save_loan(Loan {
                id: Uuid::new_v4(),
                customer_id,
                principal,
                interest_rate,
                loan_amount: total,
                number_of_installments,
                create_date: today,
                is_paid: false,
            })?;

            store.save_installments(plan.into_installments(loan.id))?;

            Ok((loan, customer))
        })?;

        self.events.emit(Event::CreditReserved {
            customer_id,
            amount: total,
            used_credit: customer.used_credit_limit,
            available_credit: customer.available_credit(),
            timestamp: now,
        });

        self.events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            customer_id,
            principal,
            interest_rate,
            total_amount: total,
            installment_count: number_of_installments,
            installment_amount,
            first_due_date,
            timestamp: now,
        });

        info!(
            loan_id = %loan.id,
            total = %total,
            installment_amount = %installment_amount,
            available_credit = %customer.available_credit(),
            "loan created"
        );

        Ok(loan)
    }

    /// pay loan with system time
    pub fn pay_loan_now(&mut self, loan_id: LoanId, amount: Money) -> Result<PaymentOutcome> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.pay_loan(loan_id, amount, &time)
    }

    /// settle as many installments as `amount` covers, oldest due date first
    #[instrument(skip(self, time_provider))]
    pub fn pay_loan(
        &mut self,
        loan_id: LoanId,
        amount: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentOutcome> {
        let now = time_provider.now();
        let today = now.date_naive();
        let allocator = self.allocator;

        let receipt = self.store.transaction(|store| {
            let mut loan = store
                .get_loan(loan_id)?
                .ok_or(LendingError::LoanNotFound { id: loan_id })?;

            let installments = store.get_installments_by_loan(loan_id)?;
            let allocation = allocator.allocate(&installments, amount, today);

            let mut by_id: HashMap<InstallmentId, Installment> =
                installments.into_iter().map(|i| (i.id, i)).collect();

            for settlement in &allocation.settlements {
                let mut installment = by_id.remove(&settlement.installment_id).ok_or_else(|| {
                    LendingError::storage(format!("installment {} vanished", settlement.installment_id))
                })?;
                installment.settle(&settlement.adjustment, today)?;
                store.save_installment(installment)?;
            }

            // fresh read after the writes
            let current = store.get_installments_by_loan(loan_id)?;
            let all_paid = !current.is_empty() && current.iter().all(|i| i.is_paid);

            let settled_now = all_paid && !loan.is_paid;
            if settled_now {
                loan.is_paid = true;
                loan = store.save_loan(loan)?;
            }

            let mut customer = store
                .get_customer(loan.customer_id)?
                .ok_or(LendingError::CustomerNotFound { id: loan.customer_id })?;

            let released = customer.release(allocation.total_spent);
            if released.is_positive() {
                customer = store.save_customer(customer)?;
            }

            Ok(PaymentReceipt {
                loan,
                customer,
                allocation,
                released,
                all_paid,
                settled_now,
            })
        })?;

        let outcome = PaymentOutcome {
            installments_paid: receipt.allocation.installments_paid(),
            total_spent: receipt.allocation.total_spent,
            loan_fully_paid: receipt.all_paid,
        };

        self.emit_payment_events(&receipt, amount, now);

        info!(
            loan_id = %loan_id,
            installments_paid = outcome.installments_paid,
            total_spent = %outcome.total_spent,
            unapplied = %receipt.allocation.unapplied,
            loan_fully_paid = outcome.loan_fully_paid,
            "payment applied"
        );

        Ok(outcome)
    }

    fn emit_payment_events(&mut self, receipt: &PaymentReceipt, amount: Money, now: chrono::DateTime<chrono::Utc>) {
        let loan_id = receipt.loan.id;

        for settlement in &receipt.allocation.settlements {
            self.events.emit(Event::InstallmentSettled {
                loan_id,
                installment_id: settlement.installment_id,
                due_date: settlement.due_date,
                nominal_amount: settlement.adjustment.nominal,
                paid_amount: settlement.adjustment.final_amount,
                timing: settlement.adjustment.timing,
                timestamp: now,
            });
        }

        self.events.emit(Event::PaymentApplied {
            loan_id,
            amount,
            installments_paid: receipt.allocation.installments_paid(),
            total_spent: receipt.allocation.total_spent,
            unapplied: receipt.allocation.unapplied,
            timestamp: now,
        });

        if receipt.settled_now {
            self.events.emit(Event::LoanSettled {
                loan_id,
                timestamp: now,
            });
        }

        if receipt.allocation.total_spent.is_positive() {
            self.events.emit(Event::CreditReleased {
                customer_id: receipt.customer.id,
                requested: receipt.allocation.total_spent,
                released: receipt.released,
                used_credit: receipt.customer.used_credit_limit,
                available_credit: receipt.customer.available_credit(),
                timestamp: now,
            });
        }
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

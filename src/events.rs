use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::payments::Timing;
use crate::types::{CustomerId, InstallmentId, LoanId};

/// all events that can be emitted by the loan service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // credit ledger events
    CreditReserved {
        customer_id: CustomerId,
        amount: Money,
        used_credit: Money,
        available_credit: Money,
        timestamp: DateTime<Utc>,
    },
    CreditReleased {
        customer_id: CustomerId,
        requested: Money,
        released: Money,
        used_credit: Money,
        available_credit: Money,
        timestamp: DateTime<Utc>,
    },

    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        customer_id: CustomerId,
        principal: Money,
        interest_rate: Rate,
        total_amount: Money,
        installment_count: u32,
        installment_amount: Money,
        first_due_date: Option<NaiveDate>,
        timestamp: DateTime<Utc>,
    },
    LoanSettled {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // payment events
    InstallmentSettled {
        loan_id: LoanId,
        installment_id: InstallmentId,
        due_date: NaiveDate,
        nominal_amount: Money,
        paid_amount: Money,
        timing: Timing,
        timestamp: DateTime<Utc>,
    },
    PaymentApplied {
        loan_id: LoanId,
        amount: Money,
        installments_paid: u32,
        total_spent: Money,
        unapplied: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

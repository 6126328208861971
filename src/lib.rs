pub mod api;
pub mod config;
pub mod credit;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod payments;
pub mod schedule;
pub mod service;
pub mod store;
pub mod types;

// re-export key types
pub use api::{CreateLoanRequest, InstallmentView, LoanTerms, LoanView, PayLoanRequest};
pub use config::LendingConfig;
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LendingError, Result};
pub use events::{Event, EventStore};
pub use payments::{
    Adjustment, AdjustmentEngine, Allocation, PaymentAllocator, PaymentOutcome, Settlement, Timing,
};
pub use schedule::{InstallmentPlan, ScheduledInstallment};
pub use service::LoanService;
pub use store::{InMemoryLedger, LedgerStore};
pub use types::{Customer, CustomerId, Installment, InstallmentId, Loan, LoanId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

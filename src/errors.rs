use thiserror::Error;

use chrono::NaiveDate;

use crate::decimal::{Money, Rate};
use crate::types::{CustomerId, InstallmentId, LoanId};

/// coarse classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// bad input, rejected before any mutation
    Validation,
    /// unknown customer or loan
    NotFound,
    /// available credit below the loan total
    InsufficientCredit,
    /// storage failure or broken invariant
    Infrastructure,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LendingError {
    #[error("invalid installment count: {count} (allowed: {allowed:?})")]
    InvalidInstallmentCount {
        count: u32,
        allowed: Vec<u32>,
    },

    #[error("invalid interest rate: {rate} outside [{min}, {max}]")]
    InvalidInterestRate {
        rate: Rate,
        min: Rate,
        max: Rate,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("installment plan needs at least one installment")]
    EmptySchedule,

    #[error("due date {months} months after {start} is outside the calendar")]
    DateOutOfRange {
        start: NaiveDate,
        months: u32,
    },

    #[error("malformed input for {field}: {message}")]
    MalformedInput {
        field: String,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: CustomerId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("insufficient credit: available {available}, required {required}")]
    InsufficientCredit {
        available: Money,
        required: Money,
    },

    #[error("installment already paid: {id}")]
    InstallmentAlreadyPaid {
        id: InstallmentId,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::InvalidInstallmentCount { .. }
            | LendingError::InvalidInterestRate { .. }
            | LendingError::InvalidAmount { .. }
            | LendingError::EmptySchedule
            | LendingError::MalformedInput { .. } => ErrorKind::Validation,
            LendingError::CustomerNotFound { .. } | LendingError::LoanNotFound { .. } => {
                ErrorKind::NotFound
            }
            LendingError::InsufficientCredit { .. } => ErrorKind::InsufficientCredit,
            LendingError::InvalidConfiguration { .. }
            | LendingError::DateOutOfRange { .. }
            | LendingError::InstallmentAlreadyPaid { .. }
            | LendingError::Storage { .. } => ErrorKind::Infrastructure,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        LendingError::Storage {
            message: message.into(),
        }
    }

    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        LendingError::MalformedInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;

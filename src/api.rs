//! request parsing and serializable views for a thin transport layer
use std::str::FromStr;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate, MONEY_SCALE};
use crate::errors::{LendingError, Result};
use crate::payments::PaymentOutcome;
use crate::service::LoanService;
use crate::store::LedgerStore;
use crate::types::{CustomerId, Installment, InstallmentId, Loan, LoanId};

/// create-loan request; every field arrives as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub customer_id: String,
    pub amount: String,
    pub interest_rate: String,
    pub installments: String,
}

/// typed terms parsed from a `CreateLoanRequest`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub customer_id: CustomerId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub number_of_installments: u32,
}

impl CreateLoanRequest {
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| LendingError::malformed("body", e.to_string()))
    }

    pub fn parse(&self) -> Result<LoanTerms> {
        Ok(LoanTerms {
            customer_id: parse_id("customerId", &self.customer_id)?,
            principal: parse_money("amount", &self.amount)?,
            interest_rate: parse_rate("interestRate", &self.interest_rate)?,
            number_of_installments: self
                .installments
                .trim()
                .parse::<u32>()
                .map_err(|e| LendingError::malformed("installments", e.to_string()))?,
        })
    }
}

/// pay-loan request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayLoanRequest {
    pub amount: String,
}

impl PayLoanRequest {
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| LendingError::malformed("body", e.to_string()))
    }

    pub fn parse(&self) -> Result<Money> {
        parse_money("amount", &self.amount)
    }
}

/// decimal with at most two fractional digits
pub fn parse_money(field: &str, input: &str) -> Result<Money> {
    let value = Decimal::from_str(input.trim()).map_err(|e| LendingError::malformed(field, e.to_string()))?;
    if value.normalize().scale() > MONEY_SCALE {
        return Err(LendingError::malformed(
            field,
            format!("{} has more than {} fractional digits", input.trim(), MONEY_SCALE),
        ));
    }
    Ok(Money::from_decimal(value))
}

pub fn parse_rate(field: &str, input: &str) -> Result<Rate> {
    Rate::from_str(input.trim()).map_err(|e| LendingError::malformed(field, e.to_string()))
}

pub fn parse_id(field: &str, input: &str) -> Result<Uuid> {
    Uuid::parse_str(input.trim()).map_err(|e| LendingError::malformed(field, e.to_string()))
}

/// serializable view of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub loan_amount: Money,
    pub number_of_installment: u32,
    pub create_date: NaiveDate,
    pub is_paid: bool,
}

impl From<&Loan> for LoanView {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id,
            customer_id: loan.customer_id,
            principal: loan.principal,
            interest_rate: loan.interest_rate,
            loan_amount: loan.loan_amount,
            number_of_installment: loan.number_of_installments,
            create_date: loan.create_date,
            is_paid: loan.is_paid,
        }
    }
}

/// serializable view of an installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentView {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub sequence: u32,
    pub amount: Money,
    pub paid_amount: Money,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub is_paid: bool,
}

impl From<&Installment> for InstallmentView {
    fn from(installment: &Installment) -> Self {
        Self {
            id: installment.id,
            loan_id: installment.loan_id,
            sequence: installment.sequence,
            amount: installment.amount,
            paid_amount: installment.paid_amount,
            due_date: installment.due_date,
            payment_date: installment.payment_date,
            is_paid: installment.is_paid,
        }
    }
}

/// request-facing operations over a loan service
impl<S: LedgerStore> LoanService<S> {
    pub fn handle_create_loan(
        &mut self,
        request: &CreateLoanRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanView> {
        let terms = request.parse()?;
        let loan = self.create_loan(
            terms.customer_id,
            terms.principal,
            terms.interest_rate,
            terms.number_of_installments,
            time_provider,
        )?;
        Ok(LoanView::from(&loan))
    }

    pub fn handle_list_loans(&self, customer_id: &str) -> Result<Vec<LoanView>> {
        let customer_id = parse_id("customerId", customer_id)?;
        Ok(self.loans_for_customer(customer_id)?.iter().map(LoanView::from).collect())
    }

    pub fn handle_list_installments(&self, loan_id: &str) -> Result<Vec<InstallmentView>> {
        let loan_id = parse_id("loanId", loan_id)?;
        Ok(self
            .installments_for_loan(loan_id)?
            .iter()
            .map(InstallmentView::from)
            .collect())
    }

    pub fn handle_pay_loan(
        &mut self,
        loan_id: &str,
        request: &PayLoanRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentOutcome> {
        let loan_id = parse_id("loanId", loan_id)?;
        let amount = request.parse()?;
        self.pay_loan(loan_id, amount, time_provider)
    }
}

/// convert to pretty-printed json string
pub fn to_json_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("JSON error: {}", e))
}

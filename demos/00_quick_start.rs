/// quick start - issue a loan and make a payment
use installment_lending::{InMemoryLedger, LoanService, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut service = LoanService::with_standard_config(InMemoryLedger::new());
    let customer = service.register_customer("Ada", "Lovelace", Money::from_major(20_000))?;

    // 12,000 at a flat 20% markup over 12 months
    let loan = service.create_loan_now(customer.id, Money::from_major(12_000), Rate::from_percentage(20), 12)?;
    println!("loan total: {}", loan.loan_amount);

    let outcome = service.pay_loan_now(loan.id, Money::from_major(1_200))?;
    println!(
        "paid {} installment(s), spent {}, fully paid: {}",
        outcome.installments_paid, outcome.total_spent, outcome.loan_fully_paid
    );

    let customer = service.customer(customer.id)?;
    println!("available credit: {}", customer.available_credit());

    Ok(())
}

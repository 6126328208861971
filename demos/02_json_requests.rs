/// json requests - string-typed request bodies in, json views out
use chrono::{TimeZone, Utc};
use installment_lending::api::to_json_pretty;
use installment_lending::{
    CreateLoanRequest, InMemoryLedger, LoanService, Money, PayLoanRequest, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    ));

    let mut service = LoanService::with_standard_config(InMemoryLedger::new());
    let customer = service.register_customer("Barbara", "Liskov", Money::from_major(30_000))?;

    let body = format!(
        r#"{{"customerId": "{}", "amount": "12000", "interestRate": "0.2", "installments": "12"}}"#,
        customer.id
    );
    let loan = service.handle_create_loan(&CreateLoanRequest::from_json(&body)?, &time)?;
    println!("{}\n", to_json_pretty(&loan));

    let installments = service.handle_list_installments(&loan.id.to_string())?;
    println!("{}\n", to_json_pretty(&installments[..2].to_vec()));

    let pay = PayLoanRequest::from_json(r#"{"amount": "2500"}"#)?;
    let outcome = service.handle_pay_loan(&loan.id.to_string(), &pay, &time)?;
    println!("{}", to_json_pretty(&outcome));

    // a rejected request reports its error kind
    let bad = PayLoanRequest::from_json(r#"{"amount": "12.345"}"#)?;
    if let Err(err) = service.handle_pay_loan(&loan.id.to_string(), &bad, &time) {
        println!("\nrejected ({:?}): {}", err.kind(), err);
    }

    Ok(())
}

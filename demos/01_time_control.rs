/// time control - early discounts, late penalties and the payment horizon
use chrono::{Duration, TimeZone, Utc};
use installment_lending::{InMemoryLedger, LoanService, Money, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let mut service = LoanService::with_standard_config(InMemoryLedger::new());
    let customer = service.register_customer("Grace", "Hopper", Money::from_major(10_000))?;
    let loan = service.create_loan(customer.id, Money::from_major(5_000), Rate::from_percentage(20), 6, &time)?;

    println!("schedule:");
    for installment in service.installments_for_loan(loan.id)? {
        println!("  #{} {} due {}", installment.sequence, installment.amount, installment.due_date);
    }

    // 12 days before the first due date
    controller.advance(Duration::days(10));
    println!("\n{}: paying 1000 early", time.now().format("%Y-%m-%d"));
    let outcome = service.pay_loan(loan.id, Money::from_major(1_000), &time)?;
    println!("  settled {} for {}", outcome.installments_paid, outcome.total_spent);

    // the march installment is now overdue
    controller.advance(Duration::days(60));
    println!("\n{}: paying 1000 late", time.now().format("%Y-%m-%d"));
    let outcome = service.pay_loan(loan.id, Money::from_major(1_000), &time)?;
    println!("  settled {} for {}", outcome.installments_paid, outcome.total_spent);

    // a large payment still stops at the 3 month horizon
    println!("\n{}: paying 10000", time.now().format("%Y-%m-%d"));
    let outcome = service.pay_loan(loan.id, Money::from_major(10_000), &time)?;
    println!("  settled {} for {}, fully paid: {}", outcome.installments_paid, outcome.total_spent, outcome.loan_fully_paid);

    for event in service.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}

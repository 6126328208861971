use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::decimal::{Money, Rate};

/// when a payment lands relative to the installment due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timing {
    /// paid `days` before the due date
    Early { days: i64 },
    /// paid on the due date
    OnTime,
    /// paid `days` after the due date
    Late { days: i64 },
}

impl Timing {
    pub fn between(due_date: NaiveDate, today: NaiveDate) -> Self {
        let days = (due_date - today).num_days();
        match days {
            d if d > 0 => Timing::Early { days: d },
            d if d < 0 => Timing::Late { days: -d },
            _ => Timing::OnTime,
        }
    }
}

/// settlement amount for one installment on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub nominal: Money,
    pub timing: Timing,
    pub final_amount: Money,
}

impl Adjustment {
    /// positive for a penalty, negative for a discount
    pub fn difference(&self) -> Money {
        self.final_amount - self.nominal
    }
}

/// linear per-day discount/penalty on the nominal installment amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentEngine {
    daily_rate: Rate,
}

impl AdjustmentEngine {
    pub fn new(daily_rate: Rate) -> Self {
        Self { daily_rate }
    }

    pub fn from_config(config: &LendingConfig) -> Self {
        Self::new(config.daily_adjustment_rate)
    }

    /// nominal +/- nominal * rate * days, rounded half-up once at the end.
    /// `None` when the adjusted amount leaves the decimal range.
    pub fn settlement_amount(&self, nominal: Money, due_date: NaiveDate, today: NaiveDate) -> Option<Adjustment> {
        let timing = Timing::between(due_date, today);
        let base = nominal.as_decimal();
        let per_day = base.checked_mul(self.daily_rate.as_decimal())?;

        let raw = match timing {
            Timing::Early { days } => base.checked_sub(per_day.checked_mul(Decimal::from(days))?)?,
            Timing::Late { days } => base.checked_add(per_day.checked_mul(Decimal::from(days))?)?,
            Timing::OnTime => base,
        };

        Some(Adjustment {
            nominal,
            timing,
            final_amount: Money::from_decimal(raw),
        })
    }
}

impl Default for AdjustmentEngine {
    fn default() -> Self {
        Self::from_config(&LendingConfig::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_early_discount() {
        let engine = AdjustmentEngine::default();
        let today = date(2024, 1, 22);
        let adj = engine.settlement_amount(Money::from_major(1_000), today + Duration::days(10), today).unwrap();

        assert_eq!(adj.timing, Timing::Early { days: 10 });
        assert_eq!(adj.final_amount.to_string(), "990.00");
        assert_eq!(adj.difference(), Money::from_major(-10));
    }

    #[test]
    fn test_late_penalty() {
        let engine = AdjustmentEngine::default();
        let today = date(2024, 3, 11);
        let adj = engine.settlement_amount(Money::from_major(1_000), today - Duration::days(10), today).unwrap();

        assert_eq!(adj.timing, Timing::Late { days: 10 });
        assert_eq!(adj.final_amount.to_string(), "1010.00");
    }

    #[test]
    fn test_due_today_is_nominal() {
        let engine = AdjustmentEngine::default();
        let today = date(2024, 2, 1);
        let adj = engine.settlement_amount(Money::from_str_exact("1200.00").unwrap(), today, today).unwrap();

        assert_eq!(adj.timing, Timing::OnTime);
        assert_eq!(adj.final_amount, adj.nominal);
        assert_eq!(adj.difference(), Money::ZERO);
    }

    #[test]
    fn test_rounding_after_adjustment() {
        let engine = AdjustmentEngine::default();
        let today = date(2024, 1, 1);

        // 16.67 - 16.67 * 0.001 * 7 = 16.55331
        let early = engine.settlement_amount(Money::from_str_exact("16.67").unwrap(), date(2024, 1, 8), today).unwrap();
        assert_eq!(early.final_amount.to_string(), "16.55");

        // 16.67 + 16.67 * 0.001 * 15 = 16.92005
        let late = engine.settlement_amount(Money::from_str_exact("16.67").unwrap(), date(2023, 12, 17), today).unwrap();
        assert_eq!(late.final_amount.to_string(), "16.92");

        // 5.00 + 5.00 * 0.001 * 1 = 5.005, midpoint rounds up
        let half = engine.settlement_amount(Money::from_major(5), date(2023, 12, 31), today).unwrap();
        assert_eq!(half.final_amount.to_string(), "5.01");
    }

    #[test]
    fn test_overflowing_penalty_is_none() {
        let engine = AdjustmentEngine::new(Rate::from_percentage(100));
        let nominal = Money::from_decimal(Decimal::MAX / Decimal::from(4));
        let today = date(2024, 3, 11);

        assert!(engine.settlement_amount(nominal, today - Duration::days(30), today).is_none());
        assert!(engine.settlement_amount(nominal, today, today).is_some());
    }

    #[test]
    fn test_timing_across_month_boundary() {
        assert_eq!(
            Timing::between(date(2024, 3, 1), date(2024, 2, 28)),
            Timing::Early { days: 2 }
        );
        assert_eq!(
            Timing::between(date(2023, 3, 1), date(2023, 2, 28)),
            Timing::Early { days: 1 }
        );
    }
}

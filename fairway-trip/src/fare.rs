use fairway_store::app_config::BusinessRules;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fare card: flat base plus per-kilometre and per-minute components,
/// rounded to currency precision.
#[derive(Debug, Clone)]
pub struct FareSchedule {
    pub base_fare: Decimal,
    pub per_km: Decimal,
    pub per_minute: Decimal,
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self {
            base_fare: dec!(5.00),
            per_km: dec!(2.00),
            per_minute: dec!(0.50),
        }
    }
}

impl From<&BusinessRules> for FareSchedule {
    fn from(rules: &BusinessRules) -> Self {
        Self {
            base_fare: rules.base_fare,
            per_km: rules.per_km,
            per_minute: rules.per_minute,
        }
    }
}

impl FareSchedule {
    pub fn fare(&self, distance_km: Decimal, duration_minutes: i64) -> Decimal {
        let fare = self.base_fare
            + distance_km * self.per_km
            + Decimal::from(duration_minutes) * self.per_minute;
        fare.round_dp(2)
    }
}

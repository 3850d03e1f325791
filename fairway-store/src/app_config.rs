use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub live: LiveConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Fare schedule and wallet policy. Every field has a default so tests can
/// construct rules without a config file.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_base_fare")]
    pub base_fare: Decimal,
    #[serde(default = "default_per_km")]
    pub per_km: Decimal,
    #[serde(default = "default_per_minute")]
    pub per_minute: Decimal,
    #[serde(default = "default_max_topup")]
    pub max_topup: Decimal,
}

fn default_base_fare() -> Decimal {
    dec!(5.00)
}
fn default_per_km() -> Decimal {
    dec!(2.00)
}
fn default_per_minute() -> Decimal {
    dec!(0.50)
}
fn default_max_topup() -> Decimal {
    dec!(500.00)
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            base_fare: default_base_fare(),
            per_km: default_per_km(),
            per_minute: default_per_minute(),
            max_topup: default_max_topup(),
        }
    }
}

/// Live-location channel tuning.
#[derive(Debug, Deserialize, Clone)]
pub struct LiveConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

fn default_channel_capacity() -> usize {
    64
}
fn default_idle_timeout() -> u64 {
    120
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment file is optional; 'development' when RUN_MODE is unset
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FAIRWAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_fare_card() {
        let rules = BusinessRules::default();
        assert_eq!(rules.base_fare, dec!(5.00));
        assert_eq!(rules.per_km, dec!(2.00));
        assert_eq!(rules.per_minute, dec!(0.50));
        assert_eq!(rules.max_topup, dec!(500.00));
    }
}

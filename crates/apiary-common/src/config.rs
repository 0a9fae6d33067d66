use std::collections::HashMap;
use std::env;

use crate::error::{AppError, AppResult};
use crate::pricing::schedule::{
    FeeSchedule, PLATFORM_RATE, PROCESSOR_FIXED_CENTS, PROCESSOR_RATE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub fees: FeeSchedule,
}

impl MarketConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_map(&env_map())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> AppResult<Self> {
        let fees = FeeSchedule {
            processor_rate: parse_f64(vars, "MARKET_PROCESSOR_RATE", PROCESSOR_RATE)?,
            processor_fixed_cents: parse_i64(
                vars,
                "MARKET_PROCESSOR_FIXED_CENTS",
                PROCESSOR_FIXED_CENTS,
            )?,
            platform_rate: parse_f64(vars, "MARKET_PLATFORM_RATE", PLATFORM_RATE)?,
        };
        fees.validate()?;

        Ok(Self {
            bind_addr: get(vars, "MARKET_BIND_ADDR", "0.0.0.0:8080"),
            database_url: get(vars, "MARKET_DATABASE_URL", "sqlite://apiary.db?mode=rwc"),
            fees,
        })
    }
}

fn env_map() -> HashMap<String, String> {
    env::vars().collect()
}

fn get(vars: &HashMap<String, String>, key: &str, default: &str) -> String {
    vars.get(key)
        .cloned()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_f64(vars: &HashMap<String, String>, key: &str, default: f64) -> AppResult<f64> {
    match vars.get(key).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("invalid value for {key}: {raw}"))),
    }
}

fn parse_i64(vars: &HashMap<String, String>, key: &str, default: i64) -> AppResult<i64> {
    match vars.get(key).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("invalid value for {key}: {raw}"))),
    }
}

use crate::error::{AppError, AppResult};

pub const PROCESSOR_RATE: f64 = 0.03;
pub const PROCESSOR_FIXED_CENTS: i64 = 60;
pub const PLATFORM_RATE: f64 = 0.10;

/// Operator-owned fee configuration.
///
/// Loaded once at process start and passed by value into every computation.
/// A rate change means publishing a new schedule, never mutating one a
/// computation in flight might be reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    /// Payment-processor percentage as a decimal fraction in [0, 1).
    pub processor_rate: f64,
    /// Fixed per-charge processor fee in cents.
    pub processor_fixed_cents: i64,
    /// Platform percentage as a decimal fraction in [0, 1).
    pub platform_rate: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            processor_rate: PROCESSOR_RATE,
            processor_fixed_cents: PROCESSOR_FIXED_CENTS,
            platform_rate: PLATFORM_RATE,
        }
    }
}

impl FeeSchedule {
    pub fn validate(&self) -> AppResult<()> {
        if !self.processor_rate.is_finite() || !(0.0..1.0).contains(&self.processor_rate) {
            return Err(AppError::Config(format!(
                "processor_rate must be in [0, 1), got {}",
                self.processor_rate
            )));
        }
        if self.processor_fixed_cents < 0 {
            return Err(AppError::Config(format!(
                "processor_fixed_cents must be non-negative, got {}",
                self.processor_fixed_cents
            )));
        }
        if !self.platform_rate.is_finite() || !(0.0..1.0).contains(&self.platform_rate) {
            return Err(AppError::Config(format!(
                "platform_rate must be in [0, 1), got {}",
                self.platform_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FeeSchedule;

    #[test]
    fn default_schedule_matches_rate_card() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.processor_rate, 0.03);
        assert_eq!(fees.processor_fixed_cents, 60);
        assert_eq!(fees.platform_rate, 0.10);
        fees.validate().expect("default schedule is valid");
    }

    #[test]
    fn validate_rejects_rates_at_or_above_one() {
        let fees = FeeSchedule {
            platform_rate: 1.0,
            ..FeeSchedule::default()
        };
        let err = fees.validate().expect_err("invalid platform rate");
        assert!(err.to_string().contains("platform_rate"));
    }

    #[test]
    fn validate_rejects_non_finite_and_negative_values() {
        FeeSchedule {
            processor_rate: f64::NAN,
            ..FeeSchedule::default()
        }
        .validate()
        .expect_err("nan processor rate");

        FeeSchedule {
            processor_fixed_cents: -1,
            ..FeeSchedule::default()
        }
        .validate()
        .expect_err("negative fixed fee");
    }
}

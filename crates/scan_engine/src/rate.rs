//! Emission rate limiting on simulation time.

use contracts::ContractError;

/// Gates emissions to at most one per period.
///
/// An emission happens only when strictly more than one period has elapsed
/// since the previous one; the timer starts at sensor setup.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    period: f64,
    last_emit: f64,
}

impl RateLimiter {
    /// # Errors
    /// `ConfigValidation` unless `frequency_hz` is finite and positive.
    pub fn new(frequency_hz: f64, start: f64) -> Result<Self, ContractError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(ContractError::config_validation(
                "sensor.update_rate",
                format!("must be a positive frequency, got {frequency_hz}"),
            ));
        }
        Ok(Self {
            period: 1.0 / frequency_hz,
            last_emit: start,
        })
    }

    /// Minimum interval between emissions (seconds).
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Time of the last emission, or of setup if none yet.
    pub fn last_emit(&self) -> f64 {
        self.last_emit
    }

    /// True when an emission is due at `now`; resets the timer if so.
    pub fn poll(&mut self, now: f64) -> bool {
        if now - self.last_emit > self.period {
            self.last_emit = now;
            true
        } else {
            false
        }
    }
}

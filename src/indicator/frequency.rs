use std::time::Duration;

use crate::error::ConfigError;
use crate::kernel::time::half_period;

/// Linear map from download throughput (bytes/s) to blink frequency (Hz).
///
/// Construction validates `0 < min_hz <= max_hz` and `max_throughput > 0`
/// (all finite), so [`frequency`](Self::frequency) can neither divide by
/// zero nor return a non-positive frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMap {
    min_hz: f64,
    max_hz: f64,
    max_throughput: f64,
}

impl FrequencyMap {
    pub fn new(min_hz: f64, max_hz: f64, max_throughput: f64) -> Result<Self, ConfigError> {
        if !(min_hz.is_finite() && min_hz > 0.0) {
            return Err(ConfigError::invalid(
                "min-frequency",
                format!("must be a positive number of Hz, got {min_hz}"),
            ));
        }
        if !(max_hz.is_finite() && max_hz >= min_hz) {
            return Err(ConfigError::invalid(
                "max-frequency",
                format!("must be finite and >= min-frequency ({min_hz}), got {max_hz}"),
            ));
        }
        if !(max_throughput.is_finite() && max_throughput > 0.0) {
            return Err(ConfigError::invalid(
                "max-download-speed",
                format!("must be a positive number of bytes/s, got {max_throughput}"),
            ));
        }
        Ok(Self {
            min_hz,
            max_hz,
            max_throughput,
        })
    }

    pub fn min_hz(&self) -> f64 {
        self.min_hz
    }

    pub fn max_hz(&self) -> f64 {
        self.max_hz
    }

    pub fn max_throughput(&self) -> f64 {
        self.max_throughput
    }

    /// Blink frequency for `throughput` bytes/s.
    ///
    /// Values are clamped to `[0, max_throughput]`; NaN counts as no traffic.
    pub fn frequency(&self, throughput: f64) -> f64 {
        let s = if throughput.is_nan() {
            0.0
        } else {
            throughput.clamp(0.0, self.max_throughput)
        };
        if s > 0.0 {
            let freq = self.min_hz + (self.max_hz - self.min_hz) * (s / self.max_throughput);
            // Rounding must not push us past the configured bounds.
            freq.clamp(self.min_hz, self.max_hz)
        } else {
            self.min_hz
        }
    }

    /// Half-period of the square wave for `throughput`.
    pub fn half_period(&self, throughput: f64) -> Duration {
        half_period(self.frequency(throughput))
    }
}

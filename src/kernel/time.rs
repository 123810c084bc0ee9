use std::time::Duration;

/// Half-period of a symmetric square wave at `frequency_hz`.
///
/// One full cycle (on + off) lasts `1 / frequency_hz` seconds.
pub fn half_period(frequency_hz: f64) -> Duration {
    Duration::from_secs_f64(1.0 / (2.0 * frequency_hz))
}

/// Convert a configured number of seconds into a `Duration`, rejecting
/// zero, negative and non-finite values.
pub fn positive_secs(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_period_of_one_hertz() {
        assert_eq!(half_period(1.0), Duration::from_millis(500));
    }

    #[test]
    fn positive_secs_rejects_bad_values() {
        assert_eq!(positive_secs(0.0), None);
        assert_eq!(positive_secs(-3.0), None);
        assert_eq!(positive_secs(f64::NAN), None);
        assert_eq!(positive_secs(f64::INFINITY), None);
        assert_eq!(positive_secs(2.5), Some(Duration::from_millis(2500)));
    }
}

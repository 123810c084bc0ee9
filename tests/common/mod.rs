#![allow(dead_code)]

use std::time::Duration;

use tokio::time::Instant;

/// Milliseconds elapsed between `start` and each of `instants`.
pub fn offsets_ms(start: Instant, instants: &[Instant]) -> Vec<u64> {
    instants
        .iter()
        .map(|i| i.duration_since(start).as_millis() as u64)
        .collect()
}

/// Assert `instants` happened at `expected_ms` after `start`, give or take
/// a couple of timer-wheel ticks.
pub fn assert_at(start: Instant, instants: &[Instant], expected_ms: &[u64]) {
    let actual = offsets_ms(start, instants);
    assert_eq!(
        actual.len(),
        expected_ms.len(),
        "expected transitions at {expected_ms:?}, got {actual:?}"
    );
    for (a, e) in actual.iter().zip(expected_ms) {
        assert!(
            a.abs_diff(*e) <= 2,
            "expected transitions at {expected_ms:?}, got {actual:?}"
        );
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

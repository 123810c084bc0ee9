use std::fmt::Debug;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::MonitorConfig;
use crate::kernel::StateWriter;

/// Periodic producer feeding one state cell.
///
/// Each iteration runs the check, publishes its value (or `V::default()`,
/// i.e. `false` / `0.0`, when it fails) and then sleeps `interval`. The
/// sleep starts after the check completes, so a slow check stretches the
/// period instead of overlapping it.
pub struct Monitor<V> {
    name: &'static str,
    config: MonitorConfig<V>,
}

impl<V> Monitor<V>
where
    V: Copy + Default + PartialEq + Debug + Send + Sync + 'static,
{
    pub fn new(name: &'static str, config: MonitorConfig<V>) -> Self {
        Self { name, config }
    }

    /// Run until `cancel` fires. Cancellation interrupts both a pending check
    /// and the interval sleep.
    pub async fn run(self, state: StateWriter<V>, cancel: CancellationToken) {
        let name = self.name;
        let interval = self.config.interval;
        let mut previous: Option<V> = None;

        info!(monitor = name, interval_ms = interval.as_millis() as u64, "Monitor started");

        loop {
            let observed = tokio::select! {
                _ = cancel.cancelled() => break,
                result = (self.config.check)() => result,
            };

            let value = match observed {
                Ok(value) => value,
                Err(e) => {
                    warn!(monitor = name, error = %e, "Check failed, reporting worst case");
                    V::default()
                }
            };

            state.publish(value);
            if previous != Some(value) {
                info!(monitor = name, ?value, "State changed");
                previous = Some(value);
            } else {
                debug!(monitor = name, ?value, "State unchanged");
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!(monitor = name, "Monitor stopped");
    }
}

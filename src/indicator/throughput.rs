use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::frequency::FrequencyMap;
use crate::kernel::StateReader;
use crate::outputs::{DrivenLine, Level, OutputLine};

/// Single-LED throughput indicator: blinks faster as the download speed
/// grows, between `mapping.min_hz()` (idle) and `mapping.max_hz()`.
pub struct ThroughputIndicator<L: OutputLine> {
    pub output: L,
    pub mapping: FrequencyMap,
}

impl<L: OutputLine> ThroughputIndicator<L> {
    /// Blink `output` from `state` until `cancel` fires, then release it.
    ///
    /// The throughput is sampled once per full cycle, never mid-cycle.
    pub async fn run(self, state: StateReader<f64>, cancel: CancellationToken) {
        let mapping = self.mapping;
        let mut led = DrivenLine::acquire(self.output);
        let mut previous_hz = None;

        info!(
            min_hz = mapping.min_hz(),
            max_hz = mapping.max_hz(),
            max_throughput = mapping.max_throughput(),
            "Throughput indicator started"
        );

        loop {
            let throughput = state.latest();
            let hz = mapping.frequency(throughput);
            if previous_hz != Some(hz) {
                debug!(throughput, hz, "Throughput indicator frequency");
                previous_hz = Some(hz);
            }
            let half = mapping.half_period(throughput);

            let cycle = async {
                led.set(Level::High);
                tokio::time::sleep(half).await;
                led.set(Level::Low);
                tokio::time::sleep(half).await;
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = cycle => {}
            }
        }

        drop(led);
        info!("Throughput indicator stopped");
    }
}

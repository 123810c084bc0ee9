use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::kernel::StateReader;
use crate::outputs::{DrivenLine, Level, OutputLine};

/// Two-LED localization indicator.
///
/// Licit IP: `on_output` lit steadily, `off_output` dark.
/// Illicit IP (or unknown): `on_output` dark, `off_output` blinking at 50 %
/// duty cycle with half-period `blink_period`.
pub struct LocalizationIndicator<L: OutputLine> {
    pub on_output: L,
    pub off_output: L,
    pub blink_period: Duration,
}

impl<L: OutputLine> LocalizationIndicator<L> {
    /// Drive both lines from `state` until `cancel` fires, then release them.
    ///
    /// The state is re-sampled at the start of every cycle, so a flip shows
    /// up within one cycle (at most two `blink_period`s when blinking).
    pub async fn run(self, state: StateReader<bool>, cancel: CancellationToken) {
        let blink = self.blink_period;
        let mut on = DrivenLine::acquire(self.on_output);
        let mut off = DrivenLine::acquire(self.off_output);
        let mut previous = None;

        info!(blink_ms = blink.as_millis() as u64, "Localization indicator started");

        loop {
            let licit = state.latest();
            if previous != Some(licit) {
                debug!(licit, "Localization indicator state");
                previous = Some(licit);
            }

            let cycle = async {
                if licit {
                    off.set(Level::Low);
                    on.set(Level::High);
                    tokio::time::sleep(blink).await;
                } else {
                    on.set(Level::Low);
                    off.set(Level::High);
                    tokio::time::sleep(blink).await;
                    off.set(Level::Low);
                    tokio::time::sleep(blink).await;
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = cycle => {}
            }
        }

        // Dropping the guards releases both lines.
        drop(on);
        drop(off);
        info!("Localization indicator stopped");
    }
}

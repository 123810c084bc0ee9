//! Lifecycle of the two monitor → indicator pipelines.
//!
//! [`Supervisor::start`] validates everything, then spawns four tasks
//! (localization monitor + indicator, throughput monitor + indicator) on a
//! shared [`TaskTracker`]. The pipelines share nothing but the cancellation
//! token; each pair communicates only through its own state cell.
//! [`SupervisorHandle::shutdown`] cancels the token and waits for every task,
//! which means every output line has been released when it returns.

use std::collections::HashSet;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, Instrument};

use crate::error::ConfigError;
use crate::indicator::{LocalizationIndicator, ThroughputIndicator};
use crate::kernel::StateCell;
use crate::monitor::{Monitor, MonitorConfig};
use crate::outputs::OutputLine;

/// Monitor + indicator for the "is the box in a licit country" quantity.
pub struct LocalizationPipeline {
    pub monitor: MonitorConfig<bool>,
    pub indicator: LocalizationIndicator<Box<dyn OutputLine>>,
}

/// Monitor + indicator for the download throughput quantity.
pub struct ThroughputPipeline {
    pub monitor: MonitorConfig<f64>,
    pub indicator: ThroughputIndicator<Box<dyn OutputLine>>,
}

pub struct SupervisorConfig {
    pub localization: LocalizationPipeline,
    pub throughput: ThroughputPipeline,
}

impl SupervisorConfig {
    /// Reject anything that would make a pipeline misbehave.
    ///
    /// The frequency map is validated when it is built; here we check the
    /// remaining invariants, including that no output line is shared.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_interval("ip-check-delay", self.localization.monitor.interval)?;
        check_interval("download-speed-delay", self.throughput.monitor.interval)?;
        check_interval("blink-period", self.localization.indicator.blink_period)?;

        let mut seen = HashSet::new();
        for id in [
            self.localization.indicator.on_output.id(),
            self.localization.indicator.off_output.id(),
            self.throughput.indicator.output.id(),
        ] {
            if !seen.insert(id.clone()) {
                return Err(ConfigError::SharedOutputLine(id));
            }
        }
        Ok(())
    }
}

fn check_interval(field: &'static str, interval: Duration) -> Result<(), ConfigError> {
    if interval.is_zero() {
        return Err(ConfigError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

pub struct Supervisor;

impl Supervisor {
    /// Validate `config` and spawn both pipelines on the current runtime.
    ///
    /// Nothing is spawned and no line is touched when validation fails.
    pub fn start(config: SupervisorConfig) -> Result<SupervisorHandle, ConfigError> {
        config.validate()?;

        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let SupervisorConfig {
            localization,
            throughput,
        } = config;

        // 1. Localization
        let (writer, reader) = StateCell::new(false, localization.monitor.interval);
        let span = tracing::info_span!("pipeline", name = "localization");
        tracker.spawn(
            Monitor::new("localization", localization.monitor)
                .run(writer, cancel.clone())
                .instrument(span.clone()),
        );
        tracker.spawn(
            localization
                .indicator
                .run(reader, cancel.clone())
                .instrument(span),
        );

        // 2. Throughput
        let (writer, reader) = StateCell::new(0.0_f64, throughput.monitor.interval);
        let span = tracing::info_span!("pipeline", name = "throughput");
        tracker.spawn(
            Monitor::new("throughput", throughput.monitor)
                .run(writer, cancel.clone())
                .instrument(span.clone()),
        );
        tracker.spawn(
            throughput
                .indicator
                .run(reader, cancel.clone())
                .instrument(span),
        );

        tracker.close();
        info!(tasks = tracker.len(), "Supervisor started");

        Ok(SupervisorHandle { cancel, tracker })
    }
}

/// Handle on the running pipelines.
pub struct SupervisorHandle {
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl SupervisorHandle {
    /// Token shared by every task; cancelling it from elsewhere starts the
    /// same teardown as [`shutdown`](Self::shutdown).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Number of tasks still running.
    pub fn running(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel every loop and wait until all of them have exited, indicators
    /// included, i.e. until every output line has been released.
    pub async fn shutdown(self) {
        info!(running = self.tracker.len(), "Supervisor shutting down");
        self.cancel.cancel();
        self.tracker.wait().await;
        info!("All pipelines stopped, outputs released");
    }
}


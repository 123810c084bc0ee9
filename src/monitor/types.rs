use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::CheckError;

pub type CheckFuture<V> = Pin<Box<dyn Future<Output = Result<V, CheckError>> + Send>>;

/// The injected check: each call performs one observation.
pub type CheckFn<V> = Box<dyn Fn() -> CheckFuture<V> + Send + Sync>;

/// What a monitor observes and how often.
pub struct MonitorConfig<V> {
    pub interval: Duration,
    pub check: CheckFn<V>,
}

impl<V> MonitorConfig<V> {
    /// Wrap an async closure as the monitor's check.
    pub fn new<F, Fut>(interval: Duration, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, CheckError>> + Send + 'static,
    {
        Self {
            interval,
            check: Box::new(move || Box::pin(check())),
        }
    }
}

impl<V> std::fmt::Debug for MonitorConfig<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

use std::time::Duration;

use tokio::sync::watch;

/// Single-slot "latest value wins" cell shared by one monitor and one
/// indicator driver.
///
/// The cell is split on creation: the [`StateWriter`] goes to the monitor,
/// the [`StateReader`] to the driver. Neither half can be cloned, so there
/// is exactly one writer and one reader for the cell's lifetime.
///
/// Backed by a `watch` slot: a read always returns a complete value written
/// by some earlier `publish` (or the initial value), never a torn one.
pub struct StateCell;

impl StateCell {
    pub fn new<V>(initial: V, interval: Duration) -> (StateWriter<V>, StateReader<V>)
    where
        V: Copy + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(initial);
        (StateWriter { tx, interval }, StateReader { rx, interval })
    }
}

/// Writing half of a [`StateCell`]. Owned by the monitor.
#[derive(Debug)]
pub struct StateWriter<V> {
    tx: watch::Sender<V>,
    interval: Duration,
}

impl<V: Copy> StateWriter<V> {
    /// Overwrite the slot. Succeeds even if the reader is gone.
    pub fn publish(&self, value: V) {
        self.tx.send_replace(value);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Reading half of a [`StateCell`]. Owned by the indicator driver.
#[derive(Debug)]
pub struct StateReader<V> {
    rx: watch::Receiver<V>,
    interval: Duration,
}

impl<V: Copy> StateReader<V> {
    /// Current value of the slot. Never waits for a new write.
    pub fn latest(&self) -> V {
        *self.rx.borrow()
    }

    /// Refresh interval of the monitor feeding this cell, i.e. the worst-case
    /// staleness of [`latest`](Self::latest).
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

//! Binary output lines (LEDs) and the guard that owns one while an indicator
//! drives it.
//!
//! [`OutputLine`] is the capability boundary toward the hardware. Two
//! backends ship with the crate: [`GpioLine`] for Linux sysfs GPIO and
//! [`LogLine`] for hosts without one. [`OutputBackend::detect`] picks between
//! them at startup.

pub mod gpio;
pub mod log;
pub mod mock;

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::OutputError;

pub use gpio::GpioLine;
pub use log::LogLine;
pub use mock::{LineAction, LineEvent, LineLog, RecordingLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => f.write_str("LOW"),
            Level::High => f.write_str("HIGH"),
        }
    }
}

/// A binary-drivable pin.
pub trait OutputLine: Send {
    /// Stable identifier, used to refuse configurations where two
    /// indicators would drive the same line.
    fn id(&self) -> String;

    /// Put the line in drive mode (if it is not already) at `level`.
    fn drive(&mut self, level: Level) -> Result<(), OutputError>;

    /// Return the line to a non-driving state. Must be idempotent and must
    /// not fail: problems are logged by the implementation.
    fn release(&mut self);
}

impl OutputLine for Box<dyn OutputLine> {
    fn id(&self) -> String {
        (**self).id()
    }

    fn drive(&mut self, level: Level) -> Result<(), OutputError> {
        (**self).drive(level)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Exclusive ownership of an [`OutputLine`] for the lifetime of one driver.
///
/// Skips writes that would not change the level and releases the line when
/// dropped, whether the driver returned, was cancelled mid-sleep, was
/// aborted or panicked.
pub struct DrivenLine<L: OutputLine> {
    line: L,
    level: Option<Level>,
}

impl<L: OutputLine> DrivenLine<L> {
    /// Take ownership of `line` and drive it LOW.
    pub fn acquire(line: L) -> Self {
        let mut guard = Self { line, level: None };
        guard.set(Level::Low);
        guard
    }

    /// Drive the line to `level`. A failed write is logged and forgotten so
    /// the next call retries it.
    pub fn set(&mut self, level: Level) {
        if self.level == Some(level) {
            return;
        }
        match self.line.drive(level) {
            Ok(()) => self.level = Some(level),
            Err(e) => {
                warn!(line = %self.line.id(), %level, error = %e, "Output write failed");
                self.level = None;
            }
        }
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }
}

impl<L: OutputLine> Drop for DrivenLine<L> {
    fn drop(&mut self) {
        debug!(line = %self.line.id(), "Releasing output line");
        self.line.release();
    }
}

/// Which [`OutputLine`] implementation the process uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    /// Pick `Gpio` when the sysfs GPIO interface is present, `Log` otherwise.
    #[default]
    Auto,
    Gpio,
    Log,
}

impl OutputBackend {
    /// Resolve `Auto` against the running platform.
    pub fn detect(self, gpio_root: &Path) -> OutputBackend {
        match self {
            OutputBackend::Auto if gpio::is_available(gpio_root) => OutputBackend::Gpio,
            OutputBackend::Auto => OutputBackend::Log,
            other => other,
        }
    }

    /// Build the line for `pin`. `Auto` must have been resolved first; it is
    /// treated as `Log`.
    pub fn line(self, gpio_root: &Path, pin: u32) -> Box<dyn OutputLine> {
        match self {
            OutputBackend::Gpio => Box::new(GpioLine::with_root(gpio_root, pin)),
            OutputBackend::Auto | OutputBackend::Log => Box::new(LogLine::new(pin)),
        }
    }
}

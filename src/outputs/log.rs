use tracing::{debug, info};

use super::{Level, OutputLine};
use crate::error::OutputError;

/// Stand-in for a GPIO line on hosts without one: every transition is
/// logged, nothing is driven.
#[derive(Debug)]
pub struct LogLine {
    pin: u32,
    driving: bool,
}

impl LogLine {
    pub fn new(pin: u32) -> Self {
        Self { pin, driving: false }
    }
}

impl OutputLine for LogLine {
    fn id(&self) -> String {
        format!("gpio{}", self.pin)
    }

    fn drive(&mut self, level: Level) -> Result<(), OutputError> {
        if !self.driving {
            info!(pin = self.pin, "No GPIO available, logging output transitions instead");
            self.driving = true;
        }
        debug!(pin = self.pin, %level, "LED");
        Ok(())
    }

    fn release(&mut self) {
        if self.driving {
            debug!(pin = self.pin, "LED released");
            self.driving = false;
        }
    }
}

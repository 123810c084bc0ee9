//! In-memory output line that records every transition with a timestamp.
//!
//! Timestamps come from `tokio::time::Instant`, so they follow the paused
//! test clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use super::{Level, OutputLine};
use crate::error::OutputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Drive(Level),
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEvent {
    pub line: String,
    pub action: LineAction,
    pub at: Instant,
}

/// Shared, append-only transition log. Several [`RecordingLine`]s may write
/// into the same log so their relative order is preserved.
#[derive(Debug, Clone, Default)]
pub struct LineLog {
    events: Arc<Mutex<Vec<LineEvent>>>,
}

impl LineLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LineEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn line(&self, name: &str) -> RecordingLine {
        RecordingLine {
            name: name.to_string(),
            log: self.clone(),
            fail_writes: false,
        }
    }

    pub fn events(&self) -> Vec<LineEvent> {
        self.lock().clone()
    }

    /// Events of one line, in order.
    pub fn events_for(&self, name: &str) -> Vec<LineEvent> {
        self.lock()
            .iter()
            .filter(|e| e.line == name)
            .cloned()
            .collect()
    }

    /// Instants at which `name` was driven to `level`.
    pub fn times(&self, name: &str, level: Level) -> Vec<Instant> {
        self.events_for(name)
            .into_iter()
            .filter(|e| e.action == LineAction::Drive(level))
            .map(|e| e.at)
            .collect()
    }

    pub fn released(&self, name: &str) -> bool {
        self.events_for(name)
            .iter()
            .any(|e| e.action == LineAction::Release)
    }

    /// Last action recorded for `name`, if any.
    pub fn last(&self, name: &str) -> Option<LineAction> {
        self.events_for(name).last().map(|e| e.action)
    }

    fn push(&self, line: &str, action: LineAction) {
        self.lock().push(LineEvent {
            line: line.to_string(),
            action,
            at: Instant::now(),
        });
    }
}

#[derive(Debug)]
pub struct RecordingLine {
    name: String,
    log: LineLog,
    fail_writes: bool,
}

impl RecordingLine {
    /// Make every `drive` fail (the failure is not recorded).
    pub fn failing(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl OutputLine for RecordingLine {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn drive(&mut self, level: Level) -> Result<(), OutputError> {
        if self.fail_writes {
            return Err(OutputError::Write {
                pin: 0,
                path: self.name.clone().into(),
                source: std::io::Error::other("simulated write failure"),
            });
        }
        self.log.push(&self.name, LineAction::Drive(level));
        Ok(())
    }

    fn release(&mut self) {
        self.log.push(&self.name, LineAction::Release);
    }
}

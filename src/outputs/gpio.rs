//! Linux sysfs GPIO backend (`/sys/class/gpio`).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Level, OutputLine};
use crate::error::OutputError;

pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// True when `root` exposes the sysfs export interface.
pub fn is_available(root: &Path) -> bool {
    root.join("export").exists()
}

/// One GPIO line driven through sysfs.
///
/// The line is exported lazily on the first `drive` and unexported again on
/// `release`, after its direction has been set back to input.
#[derive(Debug)]
pub struct GpioLine {
    root: PathBuf,
    pin: u32,
    exported: bool,
}

impl GpioLine {
    pub fn new(pin: u32) -> Self {
        Self::with_root(DEFAULT_GPIO_ROOT, pin)
    }

    pub fn with_root(root: impl AsRef<Path>, pin: u32) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pin,
            exported: false,
        }
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.pin))
    }

    fn write(&self, path: PathBuf, contents: &str) -> Result<(), OutputError> {
        fs::write(&path, contents).map_err(|source| OutputError::Write {
            pin: self.pin,
            path,
            source,
        })
    }

    fn export(&mut self) -> Result<(), OutputError> {
        if !self.pin_dir().exists() {
            let export = self.root.join("export");
            if let Err(source) = fs::write(&export, self.pin.to_string()) {
                // Exported by someone else in the meantime.
                if !self.pin_dir().exists() {
                    return Err(OutputError::Write {
                        pin: self.pin,
                        path: export,
                        source,
                    });
                }
            }
        }
        self.write(self.pin_dir().join("direction"), "out")?;
        self.exported = true;
        debug!(pin = self.pin, "GPIO exported as output");
        Ok(())
    }
}

impl OutputLine for GpioLine {
    fn id(&self) -> String {
        format!("gpio{}", self.pin)
    }

    fn drive(&mut self, level: Level) -> Result<(), OutputError> {
        if !self.exported {
            self.export()?;
        }
        let value = match level {
            Level::High => "1",
            Level::Low => "0",
        };
        self.write(self.pin_dir().join("value"), value)
    }

    fn release(&mut self) {
        if !self.exported {
            return;
        }
        self.exported = false;

        if let Err(e) = self.write(self.pin_dir().join("direction"), "in") {
            warn!(pin = self.pin, error = %e, "Failed to switch GPIO back to input");
        }
        if let Err(e) = fs::write(self.root.join("unexport"), self.pin.to_string()) {
            debug!(pin = self.pin, error = %e, "Failed to unexport GPIO");
        }
    }
}

//! `config.json` loading and validation.
//!
//! Keys are kebab-case. Durations are in seconds, frequencies in Hz and
//! speeds in bytes/s. Every invariant the pipelines rely on is checked in
//! [`Config::validate`] so that a bad file is rejected before any task
//! starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::indicator::FrequencyMap;
use crate::kernel::time::positive_secs;
use crate::outputs::gpio::DEFAULT_GPIO_ROOT;
use crate::outputs::OutputBackend;
use crate::services::geo::{CountryPolicy, DEFAULT_LOOKUP_URL};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const REQUIRED_KEYS: &[&str] = &[
    "transmission-rpc-url",
    "seedbox-local-addr",
    "seedbox-user",
    "ip-check-delay",
    "download-speed-delay",
    "led-ok",
    "led-ko",
    "led-speed",
    "min-frequency",
    "max-frequency",
    "max-download-speed",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub transmission_rpc_url: String,
    #[serde(default = "default_transmission_credential")]
    pub transmission_user: String,
    #[serde(default = "default_transmission_credential")]
    pub transmission_password: String,

    pub seedbox_local_addr: String,
    pub seedbox_user: String,
    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,
    #[serde(default)]
    pub country_policy: CountryPolicy,

    /// Seconds between two localization checks.
    pub ip_check_delay: f64,
    /// Seconds between two download speed samples.
    pub download_speed_delay: f64,
    /// Seconds before a single check is abandoned.
    #[serde(default = "default_check_timeout")]
    pub check_timeout: f64,

    pub led_ok: u32,
    pub led_ko: u32,
    pub led_speed: u32,
    /// Half-period of the localization LEDs, seconds.
    #[serde(default = "default_blink_period")]
    pub blink_period: f64,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub max_download_speed: f64,

    #[serde(default)]
    pub output_backend: OutputBackend,
    #[serde(default = "default_gpio_root")]
    pub gpio_root: PathBuf,
}

fn default_transmission_credential() -> String {
    "transmission".to_string()
}

fn default_geolocation_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

fn default_check_timeout() -> f64 {
    30.0
}

fn default_blink_period() -> f64 {
    0.5
}

fn default_gpio_root() -> PathBuf {
    PathBuf::from(DEFAULT_GPIO_ROOT)
}

impl Config {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document. All missing required keys are
    /// reported at once.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if let Some(object) = value.as_object() {
            let missing: Vec<String> = REQUIRED_KEYS
                .iter()
                .filter(|key| !object.contains_key(**key))
                .map(|key| key.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(ConfigError::MissingKeys(missing));
            }
        }
        let config: Config = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ip_check_interval()?;
        self.download_speed_interval()?;
        self.check_timeout()?;
        self.blink_period()?;
        self.frequency_map()?;

        if self.transmission_rpc_url.trim().is_empty() {
            return Err(ConfigError::invalid("transmission-rpc-url", "must not be empty"));
        }
        if self.seedbox_local_addr.trim().is_empty() {
            return Err(ConfigError::invalid("seedbox-local-addr", "must not be empty"));
        }
        if self.seedbox_user.trim().is_empty() {
            return Err(ConfigError::invalid("seedbox-user", "must not be empty"));
        }

        let pins = [
            ("led-ok", self.led_ok),
            ("led-ko", self.led_ko),
            ("led-speed", self.led_speed),
        ];
        for (i, &(name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[..i].iter().find(|(_, p)| *p == pin) {
                return Err(ConfigError::invalid(
                    name,
                    format!("pin {pin} is already used by '{other}'"),
                ));
            }
        }
        Ok(())
    }

    pub fn ip_check_interval(&self) -> Result<Duration, ConfigError> {
        seconds("ip-check-delay", self.ip_check_delay)
    }

    pub fn download_speed_interval(&self) -> Result<Duration, ConfigError> {
        seconds("download-speed-delay", self.download_speed_delay)
    }

    pub fn check_timeout(&self) -> Result<Duration, ConfigError> {
        seconds("check-timeout", self.check_timeout)
    }

    pub fn blink_period(&self) -> Result<Duration, ConfigError> {
        seconds("blink-period", self.blink_period)
    }

    pub fn frequency_map(&self) -> Result<FrequencyMap, ConfigError> {
        FrequencyMap::new(self.min_frequency, self.max_frequency, self.max_download_speed)
    }
}

fn seconds(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    positive_secs(secs)
        .ok_or_else(|| ConfigError::invalid(field, format!("must be a positive number of seconds, got {secs}")))
}

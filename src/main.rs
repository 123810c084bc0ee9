//! `seed_watcher` -- keep an eye on a seed box with two LEDs.
//!
//! One LED pair tells whether the box's public IP is located in a licit
//! country (steady "ok" LED, or blinking "ko" LED). A third LED blinks
//! faster as the Transmission download speed grows.
//!
//! Usage: `seed_watcher [CONFIG]` (default `config.json`). Log verbosity is
//! controlled by `RUST_LOG` (default `seed_watcher=info`).
//!
//! Exit codes: 0 on interruption, 1 when the configuration file is missing,
//! 2 when it is malformed or invalid.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seed_watcher::config::{Config, DEFAULT_CONFIG_PATH};
use seed_watcher::error::ConfigError;
use seed_watcher::indicator::{LocalizationIndicator, ThroughputIndicator};
use seed_watcher::kernel::cancel::shutdown_signal;
use seed_watcher::monitor::MonitorConfig;
use seed_watcher::services::{GeoLocator, TransmissionClient};
use seed_watcher::supervisor::{
    LocalizationPipeline, Supervisor, SupervisorConfig, ThroughputPipeline,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_watcher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(e @ ConfigError::NotFound { .. }) => {
            tracing::error!(error = %e, "Cannot start without a configuration file");
            return ExitCode::from(1);
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Configuration file is not well formed");
            return ExitCode::from(2);
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "seed_watcher failed");
            ExitCode::from(2)
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let timeout = config.check_timeout()?;

    let backend = config.output_backend.detect(&config.gpio_root);
    tracing::info!(
        ?backend,
        gpio_root = %config.gpio_root.display(),
        seedbox = %config.seedbox_local_addr,
        rpc = %config.transmission_rpc_url,
        "Starting seed_watcher",
    );

    let geo = Arc::new(GeoLocator::new(
        &config.seedbox_user,
        &config.seedbox_local_addr,
        &config.geolocation_url,
        config.country_policy.clone(),
        timeout,
    ));
    let transmission = Arc::new(TransmissionClient::new(
        &config.transmission_rpc_url,
        &config.transmission_user,
        &config.transmission_password,
        timeout,
    ));

    let supervisor_config = SupervisorConfig {
        localization: LocalizationPipeline {
            monitor: MonitorConfig::new(config.ip_check_interval()?, move || {
                let geo = Arc::clone(&geo);
                async move { geo.check_licit().await }
            }),
            indicator: LocalizationIndicator {
                on_output: backend.line(&config.gpio_root, config.led_ok),
                off_output: backend.line(&config.gpio_root, config.led_ko),
                blink_period: config.blink_period()?,
            },
        },
        throughput: ThroughputPipeline {
            monitor: MonitorConfig::new(config.download_speed_interval()?, move || {
                let transmission = Arc::clone(&transmission);
                async move { transmission.download_speed().await }
            }),
            indicator: ThroughputIndicator {
                output: backend.line(&config.gpio_root, config.led_speed),
                mapping: config.frequency_map()?,
            },
        },
    };

    let handle = Supervisor::start(supervisor_config).context("refusing to start pipelines")?;

    shutdown_signal().await;
    tracing::info!("User interruption!");
    handle.shutdown().await;

    Ok(())
}

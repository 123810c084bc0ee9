mod common;

use common::{assert_at, ms, offsets_ms};
use seed_watcher::error::{CheckError, ConfigError};
use seed_watcher::indicator::{FrequencyMap, LocalizationIndicator, ThroughputIndicator};
use seed_watcher::monitor::MonitorConfig;
use seed_watcher::outputs::{Level, LineAction, LineLog, OutputLine};
use seed_watcher::supervisor::{
    LocalizationPipeline, Supervisor, SupervisorConfig, ThroughputPipeline,
};
use std::time::Duration;
use tokio::time::{sleep, Instant};

fn boxed(line: impl OutputLine + 'static) -> Box<dyn OutputLine> {
    Box::new(line)
}

fn config(
    log: &LineLog,
    licit: MonitorConfig<bool>,
    speed: MonitorConfig<f64>,
) -> SupervisorConfig {
    SupervisorConfig {
        localization: LocalizationPipeline {
            monitor: licit,
            indicator: LocalizationIndicator {
                on_output: boxed(log.line("ok")),
                off_output: boxed(log.line("ko")),
                blink_period: ms(500),
            },
        },
        throughput: ThroughputPipeline {
            monitor: speed,
            indicator: ThroughputIndicator {
                output: boxed(log.line("speed")),
                mapping: FrequencyMap::new(0.5, 12.0, 750_000.0).unwrap(),
            },
        },
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_every_line() {
    let log = LineLog::new();
    let handle = Supervisor::start(config(
        &log,
        MonitorConfig::new(ms(600_000), || async { Ok(false) }),
        MonitorConfig::new(ms(60_000), || async { Ok(375_000.0) }),
    ))
    .unwrap();
    assert_eq!(handle.running(), 4);

    // Lands mid-sleep for both indicators.
    sleep(ms(2_310)).await;
    handle.shutdown().await;

    for line in ["ok", "ko", "speed"] {
        assert!(log.released(line), "{line} was not released");
        assert_eq!(log.last(line), Some(LineAction::Release), "{line} driven after release");
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_throughput_blinks_at_min_frequency() {
    let log = LineLog::new();
    let start = Instant::now();
    let handle = Supervisor::start(config(
        &log,
        MonitorConfig::new(ms(600_000), || async { Ok(true) }),
        MonitorConfig::new(ms(1_000), || async {
            Err(CheckError::Timeout(Duration::from_secs(30)))
        }),
    ))
    .unwrap();

    sleep(ms(9_000)).await;
    assert_eq!(handle.running(), 4, "no pipeline may stop on check failures");
    handle.shutdown().await;

    // 0.5 Hz: HIGH every 2 s.
    assert_at(start, &log.times("speed", Level::High), &[0, 2_000, 4_000, 6_000, 8_000]);

    // The localization pipeline is unaffected: once the first sample is in,
    // the ok LED is lit for good and the ko LED stays dark.
    let ok_high = offsets_ms(start, &log.times("ok", Level::High));
    assert_eq!(ok_high.len(), 1, "ok LED should be lit once and stay lit");
    assert!(ok_high[0] <= 1_000);
    assert!(offsets_ms(start, &log.times("ko", Level::High))
        .iter()
        .all(|t| *t < 1_000));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_check_does_not_take_down_other_pipeline() {
    let log = LineLog::new();
    let handle = Supervisor::start(config(
        &log,
        MonitorConfig::new(ms(1_000), || async {
            if true {
                panic!("lookup exploded");
            }
            Ok(true)
        }),
        MonitorConfig::new(ms(1_000), || async { Ok(750_000.0) }),
    ))
    .unwrap();

    sleep(ms(1_000)).await;
    // Localization monitor is gone, the other three tasks keep running.
    assert_eq!(handle.running(), 3);
    handle.shutdown().await;

    // 12 Hz for a second.
    assert!(log.times("speed", Level::High).len() >= 10);
    for line in ["ok", "ko", "speed"] {
        assert_eq!(log.last(line), Some(LineAction::Release));
    }
}

#[tokio::test(start_paused = true)]
async fn test_external_cancellation_token() {
    let log = LineLog::new();
    let handle = Supervisor::start(config(
        &log,
        MonitorConfig::new(ms(1_000), || async { Ok(true) }),
        MonitorConfig::new(ms(1_000), || async { Ok(0.0) }),
    ))
    .unwrap();

    let token = handle.cancellation_token();
    sleep(ms(750)).await;
    token.cancel();
    sleep(ms(10)).await;
    assert_eq!(handle.running(), 0);

    handle.shutdown().await;
    assert!(log.released("ok") && log.released("ko") && log.released("speed"));
}

#[tokio::test]
async fn test_zero_interval_is_refused_before_anything_runs() {
    let log = LineLog::new();
    let result = Supervisor::start(config(
        &log,
        MonitorConfig::new(Duration::ZERO, || async { Ok(true) }),
        MonitorConfig::new(ms(1_000), || async { Ok(0.0) }),
    ));

    match result {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "ip-check-delay"),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("zero interval accepted"),
    }
    assert!(log.events().is_empty(), "no line may be touched");
}

#[tokio::test]
async fn test_zero_blink_period_is_refused() {
    let log = LineLog::new();
    let mut cfg = config(
        &log,
        MonitorConfig::new(ms(1_000), || async { Ok(true) }),
        MonitorConfig::new(ms(1_000), || async { Ok(0.0) }),
    );
    cfg.localization.indicator.blink_period = Duration::ZERO;

    assert!(matches!(
        Supervisor::start(cfg),
        Err(ConfigError::Invalid { field: "blink-period", .. })
    ));
}

#[tokio::test]
async fn test_shared_output_line_is_refused() {
    let log = LineLog::new();
    let mut cfg = config(
        &log,
        MonitorConfig::new(ms(1_000), || async { Ok(true) }),
        MonitorConfig::new(ms(1_000), || async { Ok(0.0) }),
    );
    cfg.throughput.indicator.output = boxed(log.line("ko"));

    match Supervisor::start(cfg) {
        Err(ConfigError::SharedOutputLine(id)) => assert_eq!(id, "ko"),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("shared line accepted"),
    }
    assert!(log.events().is_empty());
}

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use common::{assert_at, ms};
use seed_watcher::error::CheckError;
use seed_watcher::kernel::StateCell;
use seed_watcher::monitor::{Monitor, MonitorConfig};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_monitor_publishes_each_sample() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let config = MonitorConfig::new(ms(10_000), move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move { Ok(f64::from(n) * 1000.0) }
    });

    let (writer, reader) = StateCell::new(0.0, config.interval);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Monitor::new("throughput", config).run(writer, cancel.clone()));

    sleep(ms(5_000)).await;
    assert_eq!(reader.latest(), 1000.0);
    sleep(ms(10_000)).await;
    assert_eq!(reader.latest(), 2000.0);

    cancel.cancel();
    task.await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_check_reports_worst_case() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let config = MonitorConfig::new(ms(10_000), move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n % 2 == 0 {
                Ok(true)
            } else {
                Err(CheckError::LookupRejected("fail".to_string()))
            }
        }
    });

    let (writer, reader) = StateCell::new(false, config.interval);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Monitor::new("localization", config).run(writer, cancel.clone()));

    sleep(ms(5_000)).await;
    assert!(reader.latest());
    // The failure is not left stale: it overwrites the previous `true`.
    sleep(ms(10_000)).await;
    assert!(!reader.latest());
    // And the loop keeps going at its normal pace.
    sleep(ms(10_000)).await;
    assert!(reader.latest());

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_interval_starts_after_slow_check() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorder = calls.clone();
    let config = MonitorConfig::new(ms(10_000), move || {
        recorder.lock().unwrap().push(Instant::now());
        async move {
            sleep(ms(3_000)).await;
            Ok(1.0)
        }
    });

    let start = Instant::now();
    let (writer, _reader) = StateCell::new(0.0, config.interval);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Monitor::new("throughput", config).run(writer, cancel.clone()));

    sleep(ms(30_000)).await;
    cancel.cancel();
    task.await.unwrap();

    // check (3 s) then wait (10 s): not wall-clock aligned.
    assert_at(start, &calls.lock().unwrap(), &[0, 13_000, 26_000]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_hung_check() {
    let config = MonitorConfig::new(ms(1_000), || std::future::pending::<Result<bool, CheckError>>());

    let (writer, reader) = StateCell::new(true, config.interval);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Monitor::new("localization", config).run(writer, cancel.clone()));

    sleep(ms(60_000)).await;
    assert!(!task.is_finished());
    // Nothing was ever published.
    assert!(reader.latest());

    cancel.cancel();
    task.await.unwrap();
}

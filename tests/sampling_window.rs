//! Timing of the sampling window as seen by a client, on paused tokio time.

use std::{sync::Arc, time::Duration};

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use frequency_sensor_node::{
    config::{Config, TEMPERATURE_PIN, TEMPERATURE_SENSOR},
    counter::EdgeCounter,
    models::{edge_event::EdgeEvent, status::StatusCode},
    ports::VariableReader,
    publisher::ReadingPublisher,
    readings::ReadingStore,
    sampler::Sampler,
    tasks::sampling::task_sample_sensors,
};

#[tokio::test(start_paused = true)]
async fn test_five_edges_in_one_window() {
    let config = Config::default();
    let sensors = Arc::new(config.sensor_table().unwrap());
    let counter = Arc::new(EdgeCounter::new());
    let readings = Arc::new(ReadingStore::new());
    let sampler = Sampler::new(
        sensors.clone(),
        counter.clone(),
        readings.clone(),
        config.sampling_interval(),
    );
    let publisher = ReadingPublisher::new(sensors, readings, config.zero_readings);

    let start = Instant::now();
    let at = |ms: u64| start + Duration::from_millis(ms);
    let token = CancellationToken::new();
    let handle = tokio::spawn(task_sample_sensors(token.clone(), sampler));

    sleep_until(at(50)).await;
    assert_eq!(
        publisher.read_variable(TEMPERATURE_SENSOR),
        Err(StatusCode::BadDataUnavailable)
    );

    for ms in [100, 300, 500, 700, 900] {
        sleep_until(at(ms)).await;
        counter.record(EdgeEvent::rising(TEMPERATURE_PIN));
        counter.record(EdgeEvent::falling(TEMPERATURE_PIN));
    }
    assert_eq!(counter.peek(TEMPERATURE_PIN), 5);

    sleep_until(at(1001)).await;
    assert_eq!(counter.peek(TEMPERATURE_PIN), 0);
    assert_eq!(publisher.read_variable(TEMPERATURE_SENSOR), Ok(5f64));

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_quiet_window_reads_as_unavailable() {
    let config = Config::default();
    let sensors = Arc::new(config.sensor_table().unwrap());
    let counter = Arc::new(EdgeCounter::new());
    let readings = Arc::new(ReadingStore::new());
    let sampler = Sampler::new(
        sensors.clone(),
        counter.clone(),
        readings.clone(),
        config.sampling_interval(),
    );
    let publisher = ReadingPublisher::new(sensors, readings.clone(), config.zero_readings);

    let start = Instant::now();
    let token = CancellationToken::new();
    let handle = tokio::spawn(task_sample_sensors(token.clone(), sampler));

    counter.record(EdgeEvent::rising(TEMPERATURE_PIN));
    sleep_until(start + Duration::from_millis(1001)).await;
    assert_eq!(publisher.read_variable(TEMPERATURE_SENSOR), Ok(1f64));

    // Second window sees no edges.
    sleep_until(start + Duration::from_millis(2001)).await;
    assert_eq!(readings.latest(TEMPERATURE_SENSOR).map(|r| r.count), Some(0));
    assert_eq!(
        publisher.read_variable(TEMPERATURE_SENSOR),
        Err(StatusCode::BadDataUnavailable)
    );

    token.cancel();
    handle.await.unwrap();
}

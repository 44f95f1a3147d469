use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::{signal, sync::mpsc};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{info, level_filters::LevelFilter};

use frequency_sensor_node::{
    config::{Config, EdgeSourceConfig},
    counter::EdgeCounter,
    externals::{
        gpio::{simulated::SimulatedEdgeSource, task::task_run_edge_source},
        modbus::task::task_serve_sensor_variables,
    },
    ports::VariableReader,
    publisher::ReadingPublisher,
    readings::ReadingStore,
    sampler::Sampler,
    tasks::{edge_counting::task_count_edges, sampling::task_sample_sensors},
};

#[cfg(feature = "rpi")]
use frequency_sensor_node::externals::gpio::rpi::RpiEdgeSource;

/// Publishes pulse-frequency sensor readings over Modbus TCP
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file. Built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Modbus TCP port, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(LevelFilter::from(args.log_level))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => {
            info!("No configuration file given. Using defaults.");
            Config::default()
        }
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let sensors = Arc::new(config.sensor_table()?);
    for sensor in sensors.iter() {
        info!(
            "Sensor <{}> on pin {}, scaling {}.",
            sensor.name, sensor.pin, sensor.scaling
        );
    }

    let counter = Arc::new(EdgeCounter::new());
    let readings = Arc::new(ReadingStore::new());
    let sampler = Sampler::new(
        sensors.clone(),
        counter.clone(),
        readings.clone(),
        config.sampling_interval(),
    );
    let reader: Arc<dyn VariableReader> = Arc::new(ReadingPublisher::new(
        sensors.clone(),
        readings,
        config.zero_readings,
    ));

    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    // NOTE: Edges from interrupt handlers or the simulator, consumed by the counter.
    let (tx_edges, rx_edges) = mpsc::unbounded_channel();

    // NOTE: Tasks that can fail at startup. A failure cancels the token and is
    // reported as the exit status once everything has stopped.
    let mut fallible_tasks = Vec::new();

    match config.edge_source {
        EdgeSourceConfig::Simulated { frequency_hz } => {
            let source = SimulatedEdgeSource::new(sensors.pins(), frequency_hz);
            fallible_tasks.push(tracker.spawn(task_run_edge_source(
                token.clone(),
                source,
                tx_edges,
            )));
        }
        #[cfg(feature = "rpi")]
        EdgeSourceConfig::Gpio => {
            let source = RpiEdgeSource::new(sensors.pins());
            fallible_tasks.push(tracker.spawn(task_run_edge_source(
                token.clone(),
                source,
                tx_edges,
            )));
        }
        #[cfg(not(feature = "rpi"))]
        EdgeSourceConfig::Gpio => {
            return Err(frequency_sensor_node::config::ConfigError::GpioUnsupported.into())
        }
    }

    tracker.spawn(task_count_edges(token.clone(), rx_edges, counter));
    tracker.spawn(task_sample_sensors(token.clone(), sampler));
    fallible_tasks.push(tracker.spawn(task_serve_sensor_variables(
        token.clone(),
        config.server.clone(),
        sensors,
        reader,
    )));

    let token_clone = token.clone();

    tokio::select! {
        _ = token_clone.cancelled() => {}
        res = signal::ctrl_c() => {
            match res {
                Ok(_) => {
                    token.cancel();
                },
                Err(e)=>{
                    tracing::error!("Failed to listen for ctrl_c. Error: {}", e);
                    token.cancel();
                }
            };
        },
    }

    tracker.close();
    tracker.wait().await;

    for task in fallible_tasks {
        task.await.context("A task panicked")??;
    }
    info!("Stopped.");

    Ok(())
}

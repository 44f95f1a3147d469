use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{config::ServerConfig, ports::VariableReader, sensors::SensorTable};

use super::server::SensorServer;

/// Publish the sensor variables over Modbus TCP. A server that can't start
/// takes the whole service down.
#[tracing::instrument(skip_all)]
pub async fn task_serve_sensor_variables(
    token: CancellationToken,
    settings: ServerConfig,
    sensors: Arc<SensorTable>,
    reader: Arc<dyn VariableReader>,
) -> Result<()> {
    info!("Started.");
    let result = run_server(token.clone(), settings, &sensors, reader).await;
    if let Err(e) = &result {
        error!("Modbus server failed. Error: {:#}", e);
        token.cancel();
    }
    result
}

async fn run_server(
    token: CancellationToken,
    settings: ServerConfig,
    sensors: &SensorTable,
    reader: Arc<dyn VariableReader>,
) -> Result<()> {
    let mut server = SensorServer::new(settings, reader);
    server
        .initialize(sensors)
        .context("Failed to construct address space")?;
    let listener = server
        .listen()
        .await
        .context("Failed to start Modbus server")?;
    server.serve(token, listener).await
}

use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{config::ServerConfig, ports::VariableReader, sensors::SensorTable};

use super::{address_space::AddressSpace, service::SensorVariableService};

/// Lifecycle of the Modbus server. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Uninitialized,
    Initializing,
    AddressSpaceConstructed,
    Listening,
    Stopped,
}

/// Modbus TCP server publishing one variable per sensor.
pub struct SensorServer {
    settings: ServerConfig,
    reader: Arc<dyn VariableReader>,
    state: ServerState,
    address_space: Option<Arc<AddressSpace>>,
}

impl SensorServer {
    pub fn new(settings: ServerConfig, reader: Arc<dyn VariableReader>) -> Self {
        Self {
            settings,
            reader,
            state: ServerState::Uninitialized,
            address_space: None,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    fn transition(&mut self, next: ServerState) {
        debug!("Server state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Build the `Sensors` folder with one variable per sensor.
    pub fn initialize(&mut self, sensors: &SensorTable) -> Result<Arc<AddressSpace>> {
        if self.state != ServerState::Uninitialized {
            bail!("Server was already initialized. State: {:?}", self.state);
        }
        if sensors.is_empty() {
            bail!("No sensors to publish.");
        }
        self.transition(ServerState::Initializing);
        info!("Server Initialized");

        let address_space = Arc::new(AddressSpace::from_sensors(sensors)?);
        for node in address_space.nodes() {
            info!("Added {} to folder '{}'.", node, address_space.folder());
        }

        self.address_space = Some(address_space.clone());
        self.transition(ServerState::AddressSpaceConstructed);
        Ok(address_space)
    }

    /// Bind the configured address and announce the endpoint.
    pub async fn listen(&mut self) -> Result<TcpListener> {
        if self.state != ServerState::AddressSpaceConstructed {
            bail!(
                "Address space must be constructed before listening. State: {:?}",
                self.state
            );
        }

        let address = self.settings.socket_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind Modbus listener to {}", address))?;
        let bound = listener.local_addr()?;

        self.transition(ServerState::Listening);
        info!("Server is now listening ... ( press CTRL+C to stop)");
        info!("Build info: {}", self.settings.build_info);
        info!("Port: {}", bound.port());
        info!("Primary endpoint URL: {}", self.settings.endpoint_url(bound));
        Ok(listener)
    }

    /// Accept clients until `token` is cancelled.
    pub async fn serve(mut self, token: CancellationToken, listener: TcpListener) -> Result<()> {
        let address_space = match (self.state, &self.address_space) {
            (ServerState::Listening, Some(address_space)) => address_space.clone(),
            _ => bail!("Server is not listening. State: {:?}", self.state),
        };
        let reader = self.reader.clone();

        let server = Server::new(listener);
        let on_connected = move |stream: TcpStream, socket_addr: SocketAddr| {
            let address_space = address_space.clone();
            let reader = reader.clone();
            async move {
                accept_tcp_connection(stream, socket_addr, move |client: SocketAddr| {
                    info!("Client connected from {}.", client);
                    Ok(Some(SensorVariableService::new(
                        address_space.clone(),
                        reader.clone(),
                    )))
                })
            }
        };
        let on_process_error = |err| {
            error!("Failed to process Modbus connection. Error: {}", err);
        };

        let result = tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                Ok(())
            }
            res = server.serve(&on_connected, on_process_error) => {
                res.context("Modbus server stopped unexpectedly")
            }
        };

        self.transition(ServerState::Stopped);
        result
    }
}

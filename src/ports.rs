use std::future::Future;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::models::{edge_event::EdgeEvent, status::StatusCode};

/// A producer of pin transitions (GPIO interrupts, simulation, ...).
pub trait EdgeSource: Send + 'static {
    /// Emit every observed transition over `tx_edges` until `token` is
    /// cancelled. Returns an error if the source can't be set up.
    fn run(
        self,
        token: CancellationToken,
        tx_edges: UnboundedSender<EdgeEvent>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Answers protocol reads of a sensor variable.
pub trait VariableReader: Send + Sync {
    fn read_variable(&self, sensor: &str) -> Result<f64, StatusCode>;
}

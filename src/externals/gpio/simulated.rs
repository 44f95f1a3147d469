use std::time::Duration;

use anyhow::Context;
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::wrappers::IntervalStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    models::{
        edge_event::{EdgeEvent, Level},
        pin::Pin,
    },
    ports::EdgeSource,
};

/// Drives a square wave of a fixed frequency on every configured pin.
/// Stands in for real hardware on hosts without GPIO.
pub struct SimulatedEdgeSource {
    pins: Vec<Pin>,
    frequency_hz: f64,
}

impl SimulatedEdgeSource {
    pub fn new(pins: Vec<Pin>, frequency_hz: f64) -> Self {
        Self { pins, frequency_hz }
    }

    fn half_period(&self) -> anyhow::Result<Duration> {
        let half_period =
            Duration::try_from_secs_f64(0.5 / self.frequency_hz).with_context(|| {
                format!("Cannot simulate a {} Hz square wave", self.frequency_hz)
            })?;
        Ok(half_period.max(Duration::from_nanos(1)))
    }
}

impl EdgeSource for SimulatedEdgeSource {
    async fn run(
        self,
        token: CancellationToken,
        tx_edges: UnboundedSender<EdgeEvent>,
    ) -> anyhow::Result<()> {
        let half_period = self.half_period()?;
        info!(
            "Simulating a {} Hz square wave on {} pin(s).",
            self.frequency_hz,
            self.pins.len()
        );

        let mut level = Level::Low;
        let ticks = IntervalStream::new(tokio::time::interval(half_period))
            .take_until(token.cancelled());
        tokio::pin!(ticks);

        while ticks.next().await.is_some() {
            level = match level {
                Level::Low => Level::High,
                Level::High => Level::Low,
            };
            for pin in self.pins.iter() {
                if tx_edges.send(EdgeEvent { pin: *pin, level }).is_err() {
                    warn!("Edge channel closed. Stopping simulation.");
                    return Ok(());
                }
            }
        }

        warn!("Cancelled.");
        Ok(())
    }
}

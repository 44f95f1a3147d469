use anyhow::Context;
use rppal::gpio::{Gpio, InputPin, Level as GpioLevel, Trigger};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    models::{
        edge_event::{EdgeEvent, Level},
        pin::Pin,
    },
    ports::EdgeSource,
};

/// Raspberry Pi GPIO inputs with both-edge interrupts.
pub struct RpiEdgeSource {
    pins: Vec<Pin>,
}

impl RpiEdgeSource {
    pub fn new(pins: Vec<Pin>) -> Self {
        Self { pins }
    }
}

impl EdgeSource for RpiEdgeSource {
    async fn run(
        self,
        token: CancellationToken,
        tx_edges: UnboundedSender<EdgeEvent>,
    ) -> anyhow::Result<()> {
        let gpio = Gpio::new().context("Failed to open the GPIO peripheral")?;

        let mut inputs: Vec<InputPin> = Vec::with_capacity(self.pins.len());
        for pin in self.pins {
            let bcm = pin
                .bcm()
                .with_context(|| format!("Pin {} is not a GPIO pin", pin))?;
            let mut input = gpio
                .get(bcm)
                .with_context(|| format!("Failed to claim pin {} (BCM {})", pin, bcm))?
                .into_input();

            let tx = tx_edges.clone();
            input
                .set_async_interrupt(Trigger::Both, move |level| {
                    let level = match level {
                        GpioLevel::High => Level::High,
                        GpioLevel::Low => Level::Low,
                    };
                    // NOTE: The receiver only goes away during shutdown.
                    let _ = tx.send(EdgeEvent { pin, level });
                })
                .with_context(|| format!("Failed to set up edge interrupt on pin {}", pin))?;

            info!("Watching pin {} (BCM {}) for edges.", pin, bcm);
            inputs.push(input);
        }
        drop(gpio);

        token.cancelled().await;
        warn!("Cancelled.");

        for input in inputs.iter_mut() {
            if let Err(e) = input.clear_async_interrupt() {
                warn!("Failed to clear edge interrupt. Error: {}", e);
            }
        }
        Ok(())
    }
}

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::{counter::EdgeCounter, models::edge_event::EdgeEvent};

/// Feed every edge event into the counter.
#[tracing::instrument(skip_all)]
pub async fn task_count_edges(
    token: CancellationToken,
    mut rx_edges: UnboundedReceiver<EdgeEvent>,
    counter: Arc<EdgeCounter>,
) {
    info!("Started.");
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            event = rx_edges.recv() => {
                match event {
                    Some(event) => {
                        trace!("Got edge event: {}", event);
                        counter.record(event);
                    }
                    None => {
                        warn!("Edge channel closed.");
                        break;
                    }
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::models::pin::Pin;

    #[tokio::test]
    async fn test_counts_rising_edges_until_channel_closes() {
        let pin = Pin::try_from(11).unwrap();
        let counter = Arc::new(EdgeCounter::new());
        let (tx, rx) = mpsc::unbounded_channel();

        for _ in 0..3 {
            tx.send(EdgeEvent::rising(pin)).unwrap();
            tx.send(EdgeEvent::falling(pin)).unwrap();
        }
        drop(tx);

        task_count_edges(CancellationToken::new(), rx, counter.clone()).await;
        assert_eq!(counter.peek(pin), 3);
    }

    #[tokio::test]
    async fn test_stops_on_cancel() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        token.cancel();
        task_count_edges(token, rx, Arc::new(EdgeCounter::new())).await;
    }
}

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{models::edge_event::EdgeEvent, ports::EdgeSource};

/// Run an edge source until cancellation. Without edges there is nothing to
/// publish, so a failing source stops the service.
#[tracing::instrument(skip_all)]
pub async fn task_run_edge_source<S: EdgeSource>(
    token: CancellationToken,
    source: S,
    tx_edges: UnboundedSender<EdgeEvent>,
) -> Result<()> {
    info!("Started.");
    if let Err(e) = source.run(token.clone(), tx_edges).await {
        error!("Edge source failed. Error: {:#}", e);
        token.cancel();
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use tokio::sync::mpsc;

    use super::*;

    struct BrokenSource;

    impl EdgeSource for BrokenSource {
        async fn run(
            self,
            _token: CancellationToken,
            _tx_edges: UnboundedSender<EdgeEvent>,
        ) -> Result<()> {
            Err(anyhow!("Failed to open the GPIO peripheral"))
        }
    }

    struct IdleSource;

    impl EdgeSource for IdleSource {
        async fn run(
            self,
            token: CancellationToken,
            _tx_edges: UnboundedSender<EdgeEvent>,
        ) -> Result<()> {
            token.cancelled().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failing_source_cancels_token() {
        let token = CancellationToken::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = task_run_edge_source(token.clone(), BrokenSource, tx).await;

        assert!(result.is_err());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_source_is_ok() {
        let token = CancellationToken::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        token.cancel();

        let result = task_run_edge_source(token.clone(), IdleSource, tx).await;
        assert!(result.is_ok());
    }
}

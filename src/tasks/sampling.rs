use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::sampler::Sampler;

/// Sample every sensor once per window. The first sample is taken one full
/// window after start so it never covers a partial window.
#[tracing::instrument(skip_all)]
pub async fn task_sample_sensors(token: CancellationToken, sampler: Sampler) {
    info!("Started. Window: {:?}", sampler.window());

    let period = sampler.window();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            _ = ticker.tick() => {
                sampler.sample();
            }
        };
    }
}

//! Background liveness simulation.
//!
//! Two independent tickers share one task: the article drift (coverage,
//! sources, views) and the daily index nudge. Both mutate the store through its
//! locks, the same way request handlers do.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::select;
use tokio::sync::Notify;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use common::UpdaterSettings;

use crate::store::NewsStore;

/// Runs until `shutdown` is notified.
///
/// The first ticks fire one full period after start, so freshly seeded data is
/// served unchanged until then.
pub async fn run_updater(
    store: Arc<NewsStore>,
    settings: UpdaterSettings,
    shutdown: Arc<Notify>,
) -> anyhow::Result<()> {
    info!(
        article_interval = ?settings.article_interval,
        index_interval = ?settings.index_interval,
        "updater: starting"
    );

    let mut rng = StdRng::from_entropy();
    let mut article_ticks = interval_at(Instant::now() + settings.article_interval, settings.article_interval);
    let mut index_ticks = interval_at(Instant::now() + settings.index_interval, settings.index_interval);
    article_ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    index_ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            _ = article_ticks.tick() => {
                store.drift_articles(&mut rng);
                debug!("updater: article counters drifted");
            }
            _ = index_ticks.tick() => {
                let index = store.nudge_index(&mut rng);
                debug!(score = index.score, sentiment = ?index.sentiment, "updater: daily index nudged");
            }
            _ = shutdown.notified() => {
                info!("updater: shutdown requested, exiting loop");
                break;
            }
        }
    }

    info!("updater: stopped");
    Ok(())
}

use crate::metrics::Metrics;
use greenline_inventory::SeatInventory;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::info;

/// Background reclamation of due holds. Lazy expiry already covers touched
/// instances; this sweep bounds how long an untouched instance can keep
/// seats held past their TTL.
pub fn spawn_expiry_sweeper(
    inventory: Arc<SeatInventory>,
    metrics: Arc<Metrics>,
    interval_seconds: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_seconds.max(1)));
        info!(interval_seconds, "expiry sweeper started");
        loop {
            ticker.tick().await;
            let expired = inventory.release_expired_holds().await;
            if expired > 0 {
                metrics.expired_holds_total.inc_by(expired as u64);
                info!(reservations = expired, "expiry sweep released holds");
            }
        }
    })
}

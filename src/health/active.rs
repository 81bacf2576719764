//! Active health checking.
//!
//! # Responsibilities
//! - Periodically check every registered service
//! - Stop when the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::health::registry::ServiceRegistry;

pub struct HealthMonitor {
    registry: Arc<ServiceRegistry>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(registry: Arc<ServiceRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            services = self.registry.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.registry.check_all().await;
                    let stats = self.registry.stats();
                    tracing::debug!(healthy = stats.healthy, total = stats.total, "Health sweep complete");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

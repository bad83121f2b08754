//! Re-fetch of dependent display components after a successful submission.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::protocol::DashboardSnapshot;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::{transport::SnapshotSource, ClientEvent};

#[async_trait]
pub trait RefreshTarget: Send + Sync {
    fn name(&self) -> &str;
    async fn refresh(&self) -> Result<()>;
}

#[derive(Default)]
pub struct ComponentRefresher {
    targets: RwLock<Vec<Arc<dyn RefreshTarget>>>,
}

impl ComponentRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, target: Arc<dyn RefreshTarget>) {
        self.targets.write().await.push(target);
    }

    pub async fn target_count(&self) -> usize {
        self.targets.read().await.len()
    }

    /// One target failing never aborts its siblings.
    pub async fn refresh_all(&self) {
        let targets = self.targets.read().await.clone();
        for target in targets {
            match target.refresh().await {
                Ok(()) => debug!(target = target.name(), "component refreshed"),
                Err(err) => warn!(
                    target = target.name(),
                    error = %err,
                    "component refresh failed; continuing with remaining components"
                ),
            }
        }
    }
}

/// Re-fetches the dashboard snapshot and republishes its stats.
pub struct DashboardSummaryTarget {
    source: Arc<dyn SnapshotSource>,
    events: broadcast::Sender<ClientEvent>,
}

impl DashboardSummaryTarget {
    pub fn new(source: Arc<dyn SnapshotSource>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self { source, events }
    }
}

#[async_trait]
impl RefreshTarget for DashboardSummaryTarget {
    fn name(&self) -> &str {
        "dashboard-summary"
    }

    async fn refresh(&self) -> Result<()> {
        let snapshot: DashboardSnapshot = self.source.fetch_dashboard().await?;
        let _ = self.events.send(ClientEvent::DashboardUpdated {
            stats: snapshot.stats,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/refresh_tests.rs"]
mod tests;

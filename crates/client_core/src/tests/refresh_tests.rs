use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::anyhow;
use shared::protocol::DashboardSnapshot;

use super::*;
use crate::ClientEvent;

struct CountingTarget {
    label: &'static str,
    refreshes: AtomicUsize,
}

#[async_trait]
impl RefreshTarget for CountingTarget {
    fn name(&self) -> &str {
        self.label
    }

    async fn refresh(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingTarget;

#[async_trait]
impl RefreshTarget for FailingTarget {
    fn name(&self) -> &str {
        "broken-grid"
    }

    async fn refresh(&self) -> Result<()> {
        Err(anyhow!("grid endpoint returned 500"))
    }
}

struct StubSnapshotSource {
    stats: BTreeMap<String, f64>,
}

#[async_trait]
impl SnapshotSource for StubSnapshotSource {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot> {
        Ok(DashboardSnapshot {
            stats: self.stats.clone(),
            ..DashboardSnapshot::default()
        })
    }
}

#[tokio::test]
async fn one_failing_target_never_aborts_its_siblings() {
    let refresher = ComponentRefresher::new();
    let before = Arc::new(CountingTarget {
        label: "customers-grid",
        refreshes: AtomicUsize::new(0),
    });
    let after = Arc::new(CountingTarget {
        label: "payments-grid",
        refreshes: AtomicUsize::new(0),
    });

    refresher
        .register(Arc::clone(&before) as Arc<dyn RefreshTarget>)
        .await;
    refresher.register(Arc::new(FailingTarget)).await;
    refresher
        .register(Arc::clone(&after) as Arc<dyn RefreshTarget>)
        .await;

    refresher.refresh_all().await;
    refresher.refresh_all().await;

    assert_eq!(before.refreshes.load(Ordering::SeqCst), 2);
    assert_eq!(after.refreshes.load(Ordering::SeqCst), 2);
    assert_eq!(refresher.target_count().await, 3);
}

#[tokio::test]
async fn dashboard_summary_republishes_fetched_stats() {
    let (events, mut rx) = tokio::sync::broadcast::channel(16);
    let mut stats = BTreeMap::new();
    stats.insert("total_customers".to_string(), 412.0);
    stats.insert("monthly_revenue".to_string(), 1_250_000.5);

    let target = DashboardSummaryTarget::new(
        Arc::new(StubSnapshotSource {
            stats: stats.clone(),
        }),
        events,
    );
    target.refresh().await.expect("summary refresh");

    match rx.try_recv().expect("dashboard event") {
        ClientEvent::DashboardUpdated { stats: published } => assert_eq!(published, stats),
        other => panic!("unexpected event: {other:?}"),
    }
}

//! Client-side core for the hosted dashboard: background form submission
//! with user feedback, transient notifications, per-field validation
//! errors, dependent-component refresh, debounced search, and the one-way
//! server-push channel.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use anyhow::Result;
use shared::domain::{FormId, SearchTarget, Severity};
use shared::protocol::SearchHit;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};

pub mod field_errors;
pub mod form;
pub mod notify;
pub mod refresh;
pub mod search;
mod stream;
pub mod submission;
pub mod transport;
pub mod widgets;

pub use field_errors::FieldErrorPresenter;
pub use form::{FieldValue, FileAttachment, FormControl, FormDescriptor, FormPhase};
pub use notify::{
    AlertPermission, DesktopAlerter, MissingDesktopAlerter, NotificationId, NotificationRequest,
    Notifier,
};
pub use refresh::{ComponentRefresher, DashboardSummaryTarget, RefreshTarget};
pub use search::Searcher;
pub use submission::{
    MissingNavigator, Navigator, SubmissionController, SubmissionDisposition, SubmissionResult,
};
pub use transport::{Gateways, HttpTransport, SubmissionTransport};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Everything observable about the client, for surfaces that render it.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    NotificationPosted {
        id: NotificationId,
        message: String,
        severity: Severity,
        duration: Duration,
    },
    NotificationDismissed {
        id: NotificationId,
    },
    SubmissionSettled {
        form_id: FormId,
        result: SubmissionResult,
    },
    RedirectScheduled {
        form_id: FormId,
        url: String,
        delay: Duration,
    },
    DashboardUpdated {
        stats: BTreeMap<String, f64>,
    },
    SearchResults {
        target: SearchTarget,
        hits: Vec<SearchHit>,
    },
    SearchCleared {
        target: SearchTarget,
    },
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub csrf_token: Option<String>,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            csrf_token: None,
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }
}

pub struct DashboardClient {
    config: ClientConfig,
    notifier: Arc<Notifier>,
    refresher: Arc<ComponentRefresher>,
    controller: SubmissionController,
    searcher: Arc<Searcher>,
    snapshots: Arc<dyn transport::SnapshotSource>,
    events: broadcast::Sender<ClientEvent>,
    push_task: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardClient {
    /// HTTP-backed client with no desktop alerts or host navigation; the
    /// missing collaborators are logged and skipped, never fatal.
    pub async fn connect(config: ClientConfig) -> Result<Arc<Self>> {
        let gateways = Gateways::http(&config.server_url)?;
        Ok(Self::new_with_dependencies(
            config,
            gateways,
            Arc::new(MissingDesktopAlerter),
            Arc::new(MissingNavigator),
        )
        .await)
    }

    pub async fn new_with_dependencies(
        config: ClientConfig,
        gateways: Gateways,
        alerter: Arc<dyn DesktopAlerter>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let notifier = Notifier::new(alerter, events.clone());
        notifier.resolve_alert_permission().await;

        let refresher = Arc::new(ComponentRefresher::new());
        refresher
            .register(Arc::new(DashboardSummaryTarget::new(
                Arc::clone(&gateways.snapshots),
                events.clone(),
            )))
            .await;

        let controller = SubmissionController::new(
            gateways.submission,
            Arc::clone(&notifier),
            Arc::clone(&refresher),
            navigator,
            config.csrf_token.clone(),
            events.clone(),
        );
        let searcher = Arc::new(Searcher::new(gateways.search, events.clone()));

        Arc::new(Self {
            config,
            notifier,
            refresher,
            controller,
            searcher,
            snapshots: gateways.snapshots,
            events,
            push_task: Mutex::new(None),
        })
    }

    /// Direct snapshot fetch for surfaces that render the recent-activity
    /// lists rather than just the stat counters.
    pub async fn dashboard_snapshot(&self) -> Result<shared::protocol::DashboardSnapshot> {
        self.snapshots.fetch_dashboard().await
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn refresher(&self) -> &ComponentRefresher {
        &self.refresher
    }

    pub async fn register_form(&self, form: FormDescriptor) -> Arc<Mutex<FormDescriptor>> {
        self.controller.register_form(form).await
    }

    pub async fn form(&self, form_id: &FormId) -> Option<Arc<Mutex<FormDescriptor>>> {
        self.controller.form(form_id).await
    }

    pub async fn submit(&self, form_id: &FormId) -> SubmissionDisposition {
        self.controller.handle_submit(form_id).await
    }

    pub async fn search_input(&self, target: &SearchTarget, query: &str) {
        self.searcher.input(target, query).await;
    }

    pub async fn refresh_components(&self) {
        self.refresher.refresh_all().await;
    }

    /// Starts the server-push listener; events are routed to the same
    /// Notifier and stat publisher the submission pipeline uses.
    pub async fn spawn_push_events(self: &Arc<Self>) -> Result<()> {
        stream::connect_and_route(self).await
    }

    pub async fn shutdown(&self) {
        if let Some(task) = self.push_task.lock().await.take() {
            task.abort();
        }
    }

    pub(crate) fn events(&self) -> &broadcast::Sender<ClientEvent> {
        &self.events
    }

    pub(crate) async fn store_push_task(&self, task: JoinHandle<()>) {
        if let Some(previous) = self.push_task.lock().await.replace(task) {
            previous.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

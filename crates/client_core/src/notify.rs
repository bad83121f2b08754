//! Transient user notifications with auto-dismiss, plus optional native
//! desktop alerts behind a permission gate.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::Severity;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ClientEvent;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);
const ALERT_TITLE: &str = "DataLink CRM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

impl NotificationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

impl NotificationRequest {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPermission {
    Granted,
    Denied,
    Undecided,
}

/// Native desktop alert capability of the host environment.
#[async_trait]
pub trait DesktopAlerter: Send + Sync {
    fn permission(&self) -> AlertPermission;
    async fn request_permission(&self) -> AlertPermission;
    fn alert(&self, title: &str, body: &str) -> Result<()>;
}

pub struct MissingDesktopAlerter;

#[async_trait]
impl DesktopAlerter for MissingDesktopAlerter {
    fn permission(&self) -> AlertPermission {
        AlertPermission::Denied
    }

    async fn request_permission(&self) -> AlertPermission {
        AlertPermission::Denied
    }

    fn alert(&self, _title: &str, _body: &str) -> Result<()> {
        Err(anyhow!("desktop alerts unavailable"))
    }
}

struct ActiveNotification {
    request: NotificationRequest,
    expiry_task: Option<JoinHandle<()>>,
}

pub struct Notifier {
    active: Mutex<HashMap<NotificationId, ActiveNotification>>,
    alerter: Arc<dyn DesktopAlerter>,
    alerts_granted: AtomicBool,
    permission_resolved: AtomicBool,
    events: broadcast::Sender<ClientEvent>,
}

impl Notifier {
    pub fn new(alerter: Arc<dyn DesktopAlerter>, events: broadcast::Sender<ClientEvent>) -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(HashMap::new()),
            alerter,
            alerts_granted: AtomicBool::new(false),
            permission_resolved: AtomicBool::new(false),
            events,
        })
    }

    /// Resolves the desktop alert permission once per process: an undecided
    /// permission is requested, a denied one is never re-requested.
    pub async fn resolve_alert_permission(&self) {
        if self.permission_resolved.swap(true, Ordering::SeqCst) {
            return;
        }
        let permission = match self.alerter.permission() {
            AlertPermission::Undecided => self.alerter.request_permission().await,
            decided => decided,
        };
        let granted = permission == AlertPermission::Granted;
        self.alerts_granted.store(granted, Ordering::SeqCst);
        debug!(granted, "desktop alert permission resolved");
    }

    /// Fire-and-forget for callers; the returned handle only matters to a
    /// surface that wants to dismiss early.
    pub async fn notify(self: &Arc<Self>, request: NotificationRequest) -> NotificationId {
        let id = NotificationId::new();
        let _ = self.events.send(ClientEvent::NotificationPosted {
            id,
            message: request.message.clone(),
            severity: request.severity,
            duration: request.duration,
        });

        if self.alerts_granted.load(Ordering::SeqCst) {
            if let Err(err) = self.alerter.alert(ALERT_TITLE, &request.message) {
                warn!(error = %err, "desktop alert failed");
            }
        }

        if request.duration.is_zero() {
            let _ = self.events.send(ClientEvent::NotificationDismissed { id });
            return id;
        }

        let duration = request.duration;
        self.active.lock().await.insert(
            id,
            ActiveNotification {
                request,
                expiry_task: None,
            },
        );

        let notifier = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            notifier.dismiss(id).await;
        });

        match self.active.lock().await.get_mut(&id) {
            Some(active) => active.expiry_task = Some(task),
            // Dismissed before the timer was attached; the stray timer will
            // find nothing to remove.
            None => task.abort(),
        }

        id
    }

    /// True when the notification was still active. Dismissing twice, or
    /// racing the auto-dismiss timer, is a no-op.
    pub async fn dismiss(&self, id: NotificationId) -> bool {
        let Some(active) = self.active.lock().await.remove(&id) else {
            return false;
        };
        debug!(notification = %id, severity = active.request.severity.as_str(), "notification dismissed");
        let _ = self.events.send(ClientEvent::NotificationDismissed { id });
        if let Some(task) = active.expiry_task {
            task.abort();
        }
        true
    }

    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

struct ScriptedAlerter {
    initial: AlertPermission,
    granted_on_request: bool,
    permission_requests: AtomicUsize,
    alerts: AtomicUsize,
    fail_alerts: bool,
}

impl ScriptedAlerter {
    fn undecided_then_granted() -> Self {
        Self {
            initial: AlertPermission::Undecided,
            granted_on_request: true,
            permission_requests: AtomicUsize::new(0),
            alerts: AtomicUsize::new(0),
            fail_alerts: false,
        }
    }

    fn denied() -> Self {
        Self {
            initial: AlertPermission::Denied,
            granted_on_request: false,
            permission_requests: AtomicUsize::new(0),
            alerts: AtomicUsize::new(0),
            fail_alerts: false,
        }
    }

    fn granted_but_failing() -> Self {
        Self {
            initial: AlertPermission::Granted,
            granted_on_request: false,
            permission_requests: AtomicUsize::new(0),
            alerts: AtomicUsize::new(0),
            fail_alerts: true,
        }
    }
}

#[async_trait::async_trait]
impl DesktopAlerter for ScriptedAlerter {
    fn permission(&self) -> AlertPermission {
        self.initial
    }

    async fn request_permission(&self) -> AlertPermission {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        if self.granted_on_request {
            AlertPermission::Granted
        } else {
            AlertPermission::Denied
        }
    }

    fn alert(&self, _title: &str, _body: &str) -> Result<()> {
        self.alerts.fetch_add(1, Ordering::SeqCst);
        if self.fail_alerts {
            Err(anyhow!("alert backend crashed"))
        } else {
            Ok(())
        }
    }
}

fn channel() -> broadcast::Sender<ClientEvent> {
    let (events, _) = broadcast::channel(64);
    events
}

fn dismissed_count(rx: &mut broadcast::Receiver<ClientEvent>) -> usize {
    let mut count = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, ClientEvent::NotificationDismissed { .. }) {
            count += 1;
        }
    }
    count
}

#[tokio::test]
async fn zero_duration_notification_is_removed_immediately() {
    let events = channel();
    let mut rx = events.subscribe();
    let notifier = Notifier::new(Arc::new(MissingDesktopAlerter), events);

    notifier
        .notify(NotificationRequest::info("gone already").with_duration(Duration::ZERO))
        .await;

    assert_eq!(notifier.active_count().await, 0);
    let drained: Vec<ClientEvent> = {
        let mut collected = Vec::new();
        while let Ok(event) = rx.try_recv() {
            collected.push(event);
        }
        collected
    };
    assert!(matches!(drained[0], ClientEvent::NotificationPosted { .. }));
    assert!(matches!(drained[1], ClientEvent::NotificationDismissed { .. }));
}

#[tokio::test]
async fn manual_dismiss_cancels_the_pending_timer() {
    let events = channel();
    let mut rx = events.subscribe();
    let notifier = Notifier::new(Arc::new(MissingDesktopAlerter), events);

    let id = notifier
        .notify(NotificationRequest::success("saved").with_duration(Duration::from_millis(40)))
        .await;

    assert!(notifier.dismiss(id).await);
    assert!(!notifier.dismiss(id).await);
    assert_eq!(notifier.active_count().await, 0);

    // Give the (aborted) timer a chance to have fired; there must be no
    // second removal.
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(dismissed_count(&mut rx), 1);
}

#[tokio::test]
async fn notification_auto_dismisses_after_its_duration() {
    let events = channel();
    let mut rx = events.subscribe();
    let notifier = Notifier::new(Arc::new(MissingDesktopAlerter), events);

    notifier
        .notify(NotificationRequest::warning("expiring").with_duration(Duration::from_millis(30)))
        .await;
    assert_eq!(notifier.active_count().await, 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(notifier.active_count().await, 0);
    assert_eq!(dismissed_count(&mut rx), 1);
}

#[tokio::test]
async fn undecided_permission_is_requested_exactly_once() {
    let alerter = Arc::new(ScriptedAlerter::undecided_then_granted());
    let notifier = Notifier::new(Arc::clone(&alerter) as Arc<dyn DesktopAlerter>, channel());

    notifier.resolve_alert_permission().await;
    notifier.resolve_alert_permission().await;
    assert_eq!(alerter.permission_requests.load(Ordering::SeqCst), 1);

    notifier
        .notify(NotificationRequest::info("with native alert").with_duration(Duration::ZERO))
        .await;
    assert_eq!(alerter.alerts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn denied_permission_is_never_rerequested_and_suppresses_alerts() {
    let alerter = Arc::new(ScriptedAlerter::denied());
    let notifier = Notifier::new(Arc::clone(&alerter) as Arc<dyn DesktopAlerter>, channel());

    notifier.resolve_alert_permission().await;
    notifier.resolve_alert_permission().await;
    assert_eq!(alerter.permission_requests.load(Ordering::SeqCst), 0);

    notifier
        .notify(NotificationRequest::error("quiet").with_duration(Duration::ZERO))
        .await;
    assert_eq!(alerter.alerts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn alert_failure_never_reaches_the_caller() {
    let alerter = Arc::new(ScriptedAlerter::granted_but_failing());
    let notifier = Notifier::new(Arc::clone(&alerter) as Arc<dyn DesktopAlerter>, channel());
    notifier.resolve_alert_permission().await;

    let id = notifier
        .notify(NotificationRequest::error("still posts").with_duration(Duration::ZERO))
        .await;

    assert_eq!(alerter.alerts.load(Ordering::SeqCst), 1);
    assert!(!notifier.dismiss(id).await);
}

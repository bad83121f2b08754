//! One-way server-push channel: notifications and dashboard updates arrive
//! at any time and are routed to the same components submissions use.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use shared::protocol::ServerEvent;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

use crate::{notify::NotificationRequest, ClientEvent, DashboardClient};

pub(crate) const STREAM_PATH: &str = "api/v1/stream/";

pub(crate) fn websocket_url(server_url: &str) -> Result<String> {
    let ws_base = if server_url.starts_with("https://") {
        server_url.replacen("https://", "wss://", 1)
    } else if server_url.starts_with("http://") {
        server_url.replacen("http://", "ws://", 1)
    } else {
        return Err(anyhow!("server_url must start with http:// or https://"));
    };
    Ok(format!("{}/{STREAM_PATH}", ws_base.trim_end_matches('/')))
}

pub(crate) async fn connect_and_route(client: &Arc<DashboardClient>) -> Result<()> {
    let ws_url = websocket_url(client.server_url())?;
    let (ws_stream, _) = connect_async(&ws_url)
        .await
        .with_context(|| format!("failed to connect push channel: {ws_url}"))?;
    let (_, mut reader) = ws_stream.split();

    let reader_client = Arc::clone(client);
    let ws_url_for_task = ws_url.clone();
    let task = tokio::spawn(async move {
        while let Some(frame) = reader.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => route_server_event(&reader_client, event).await,
                    Err(err) => {
                        let _ = reader_client
                            .events()
                            .send(ClientEvent::Error(format!("invalid server event: {err}")));
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    let _ = reader_client.events().send(ClientEvent::Error(format!(
                        "push channel receive failed: {err}"
                    )));
                    break;
                }
            }
        }
        info!(url = %ws_url_for_task, "push channel closed");
    });

    client.store_push_task(task).await;
    Ok(())
}

pub(crate) async fn route_server_event(client: &Arc<DashboardClient>, event: ServerEvent) {
    match event {
        ServerEvent::Notification {
            message,
            severity,
            duration_ms,
        } => {
            let mut request = NotificationRequest::new(severity, message);
            if let Some(ms) = duration_ms {
                request = request.with_duration(Duration::from_millis(ms));
            }
            client.notifier().notify(request).await;
        }
        ServerEvent::DashboardUpdate { stats } => {
            let _ = client.events().send(ClientEvent::DashboardUpdated { stats });
        }
        ServerEvent::Error(api_error) => {
            warn!(code = ?api_error.code, message = %api_error.message, "server pushed an error event");
            let _ = client.events().send(ClientEvent::Error(api_error.message));
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::Severity;

    use super::*;
    use crate::{
        notify::MissingDesktopAlerter,
        submission::MissingNavigator,
        transport::Gateways,
        ClientConfig, DashboardClient,
    };

    async fn offline_client() -> Arc<DashboardClient> {
        DashboardClient::new_with_dependencies(
            ClientConfig::new("http://127.0.0.1:1"),
            Gateways::missing(),
            Arc::new(MissingDesktopAlerter),
            Arc::new(MissingNavigator),
        )
        .await
    }

    #[tokio::test]
    async fn pushed_notifications_reach_the_shared_notifier() {
        let client = offline_client().await;
        let mut rx = client.subscribe_events();

        route_server_event(
            &client,
            ServerEvent::Notification {
                message: "Invoice paid".to_string(),
                severity: Severity::Success,
                duration_ms: Some(0),
            },
        )
        .await;

        let first = rx.try_recv().expect("posted event");
        assert!(matches!(
            first,
            ClientEvent::NotificationPosted { ref message, severity, .. }
                if message == "Invoice paid" && severity == Severity::Success
        ));
        let second = rx.try_recv().expect("dismissed event");
        assert!(matches!(second, ClientEvent::NotificationDismissed { .. }));
    }

    #[tokio::test]
    async fn pushed_dashboard_updates_are_republished() {
        let client = offline_client().await;
        let mut rx = client.subscribe_events();

        let mut stats = std::collections::BTreeMap::new();
        stats.insert("total_customers".to_string(), 413.0);
        route_server_event(&client, ServerEvent::DashboardUpdate { stats }).await;

        match rx.try_recv().expect("dashboard event") {
            ClientEvent::DashboardUpdated { stats } => {
                assert_eq!(stats.get("total_customers"), Some(&413.0));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn rewrites_http_schemes_to_websocket() {
        assert_eq!(
            websocket_url("http://127.0.0.1:8000").expect("ws url"),
            "ws://127.0.0.1:8000/api/v1/stream/"
        );
        assert_eq!(
            websocket_url("https://crm.example.com/").expect("wss url"),
            "wss://crm.example.com/api/v1/stream/"
        );
    }

    #[test]
    fn rejects_unknown_schemes() {
        assert!(websocket_url("ftp://example.com").is_err());
    }
}

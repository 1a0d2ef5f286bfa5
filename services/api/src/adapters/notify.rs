//! services/api/src/adapters/notify.rs
//!
//! This module contains the adapter for the team's email endpoint.
//! It implements the `NotificationService` port from the `core` crate.

use async_trait::async_trait;
use recruit_core::domain::Notification;
use recruit_core::ports::{NotificationService, NotifyReceipt, PortError, PortResult};
use reqwest::header::ACCEPT;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Posts `{ type, data }` JSON to a fixed email endpoint.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Creates a new `HttpNotifier`.
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

//=========================================================================================
// `NotificationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotificationService for HttpNotifier {
    async fn notify(&self, notification: &Notification) -> PortResult<NotifyReceipt> {
        let res = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(notification)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !res.status().is_success() {
            debug!("Email endpoint answered {}", res.status());
            return Ok(NotifyReceipt { success: false });
        }

        // An endpoint that answers 2xx without a body still counts as delivered.
        let receipt = res
            .json::<NotifyReceipt>()
            .await
            .unwrap_or(NotifyReceipt { success: true });
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use recruit_core::domain::NotificationKind;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn accept(State(seen): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        seen.lock().unwrap().push(body);
        Json(json!({ "success": true }))
    }

    /// Serves a fake email endpoint on an ephemeral port and returns its base URL.
    async fn spawn_endpoint(seen: Captured) -> String {
        let app = Router::new()
            .route("/send", post(accept))
            .route("/down", post(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/empty", post(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/refuse",
                post(|| async { Json(json!({ "success": false })) }),
            )
            .with_state(seen);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn contact_notification() -> Notification {
        Notification {
            kind: NotificationKind::Contact,
            data: json!({ "name": "Asha", "email": "asha@example.com" }),
        }
    }

    #[tokio::test]
    async fn posts_type_and_data() {
        let seen = Captured::default();
        let base = spawn_endpoint(seen.clone()).await;
        let notifier = HttpNotifier::new(reqwest::Client::new(), format!("{}/send", base));

        let receipt = notifier.notify(&contact_notification()).await.unwrap();
        assert!(receipt.success);

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["type"], "contact");
        assert_eq!(bodies[0]["data"]["email"], "asha@example.com");
    }

    #[tokio::test]
    async fn error_status_is_not_delivered() {
        let base = spawn_endpoint(Captured::default()).await;
        let notifier = HttpNotifier::new(reqwest::Client::new(), format!("{}/down", base));
        let receipt = notifier.notify(&contact_notification()).await.unwrap();
        assert!(!receipt.success);
    }

    #[tokio::test]
    async fn bodyless_success_counts_as_delivered() {
        let base = spawn_endpoint(Captured::default()).await;
        let notifier = HttpNotifier::new(reqwest::Client::new(), format!("{}/empty", base));
        let receipt = notifier.notify(&contact_notification()).await.unwrap();
        assert!(receipt.success);
    }

    #[tokio::test]
    async fn endpoint_can_decline() {
        let base = spawn_endpoint(Captured::default()).await;
        let notifier = HttpNotifier::new(reqwest::Client::new(), format!("{}/refuse", base));
        let receipt = notifier.notify(&contact_notification()).await.unwrap();
        assert!(!receipt.success);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let notifier = HttpNotifier::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/send".to_string(),
        );
        assert!(notifier.notify(&contact_notification()).await.is_err());
    }
}

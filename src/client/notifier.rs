//! Realtime notifier
//!
//! Tells IFTTT that new trigger events are available so it polls right away
//! instead of waiting for its next scheduled poll.

use reqwest::{Client as HttpClient, ClientBuilder, StatusCode};
use std::time::Duration;
use url::Url;

use crate::errors::Error;
use crate::protocol::{Notification, REQUEST_ID_HEADER, SERVICE_KEY_HEADER};

/// Endpoint IFTTT accepts realtime notifications on
pub const REALTIME_ENDPOINT: &str = "https://realtime.ifttt.com/v1/notifications";

/// Default timeout for a notification request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for the realtime notifier
#[derive(Clone, Debug)]
pub struct NotifierOptions {
    /// URL notifications are posted to
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            endpoint: REALTIME_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for IFTTT's realtime notification API
#[derive(Clone, Debug)]
pub struct Notifier {
    http_client: HttpClient,
    endpoint: Url,
    service_key: String,
}

impl Notifier {
    /// Create a notifier posting to the public realtime endpoint
    pub fn new(service_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_options(service_key, NotifierOptions::default())
    }

    /// Create a notifier with custom options
    pub fn with_options(
        service_key: impl Into<String>,
        options: NotifierOptions,
    ) -> Result<Self, Error> {
        let endpoint = Url::parse(&options.endpoint).map_err(|e| {
            Error::Config(format!("Invalid notification endpoint {}: {}", options.endpoint, e))
        })?;

        let http_client = ClientBuilder::new().timeout(options.timeout).build()?;
        tracing::debug!(
            "Notifier configured for {} with timeout: {:?}",
            endpoint,
            options.timeout
        );

        Ok(Self {
            http_client,
            endpoint,
            service_key: service_key.into(),
        })
    }

    /// The URL notifications are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Post a notification
    ///
    /// Anything other than `200 OK` from IFTTT is reported as
    /// [`Error::Remote`] carrying the status and response body.
    pub async fn notify(&self, notification: &Notification) -> Result<(), Error> {
        let body = serde_json::to_vec(notification)?;
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(
            request_id = %request_id,
            entries = notification.len(),
            "Sending realtime notification to {}",
            self.endpoint
        );

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("Accept", "application/json")
            .header("Accept-Charset", "utf-8")
            .header("Content-Type", "application/json")
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .header(SERVICE_KEY_HEADER, self.service_key.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            tracing::error!(
                request_id = %request_id,
                "Realtime notification rejected with status {}: {}",
                status,
                body
            );
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(request_id = %request_id, "Realtime notification accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorded {
        requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    }

    async fn accept(
        State(recorded): State<Recorded>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> AxumStatus {
        recorded.requests.lock().await.push((headers, body));
        AxumStatus::OK
    }

    async fn reject() -> (AxumStatus, &'static str) {
        (AxumStatus::UNAUTHORIZED, "bad key")
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/notifications", addr)
    }

    #[tokio::test]
    async fn test_notify_reports_unreadable_error_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            // Read the whole request (headers plus JSON body) before answering.
            while !received.ends_with(b"}") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            // Promise more body than is sent, then hang up.
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let notifier = Notifier::with_options(
            "secret",
            NotifierOptions {
                endpoint: format!("http://{}/v1/notifications", addr),
                ..NotifierOptions::default()
            },
        )
        .unwrap();

        let mut notification = Notification::new();
        notification.add_user("u1").unwrap();
        let err = notifier.notify(&notification).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)), "unexpected error: {:?}", err);
    }

    #[test]
    fn test_invalid_endpoint() {
        let options = NotifierOptions {
            endpoint: "not a url".to_string(),
            ..NotifierOptions::default()
        };
        assert!(matches!(
            Notifier::with_options("key", options),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_default_endpoint() {
        let notifier = Notifier::new("key").unwrap();
        assert_eq!(notifier.endpoint().as_str(), REALTIME_ENDPOINT);
    }

    #[tokio::test]
    async fn test_notify_sends_headers_and_body() {
        let recorded = Recorded::default();
        let app = Router::new()
            .route("/v1/notifications", post(accept))
            .with_state(recorded.clone());
        let endpoint = spawn(app).await;

        let notifier = Notifier::with_options(
            "secret",
            NotifierOptions {
                endpoint,
                ..NotifierOptions::default()
            },
        )
        .unwrap();

        let mut notification = Notification::new();
        notification.add_user("u1").unwrap();
        notification.add_trigger("t1").unwrap();
        notifier.notify(&notification).await.unwrap();

        let requests = recorded.requests.lock().await;
        assert_eq!(requests.len(), 1);
        let (headers, body) = &requests[0];
        assert_eq!(headers.get("ifttt-service-key").unwrap(), "secret");
        assert_eq!(headers.get("accept").unwrap(), "application/json");
        assert_eq!(headers.get("accept-charset").unwrap(), "utf-8");
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        let request_id = headers.get("x-request-id").unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(request_id).is_ok());
        assert_eq!(
            body,
            &json!({ "data": [{ "trigger_identity": "t1" }, { "user_id": "u1" }] })
        );
    }

    #[tokio::test]
    async fn test_notify_reports_remote_failure() {
        let app = Router::new().route("/v1/notifications", post(reject));
        let endpoint = spawn(app).await;

        let notifier = Notifier::with_options(
            "secret",
            NotifierOptions {
                endpoint,
                ..NotifierOptions::default()
            },
        )
        .unwrap();

        let mut notification = Notification::new();
        notification.add_user("u1").unwrap();
        let err = notifier.notify(&notification).await.unwrap_err();
        match &err {
            Error::Remote { status, body } => {
                assert_eq!(*status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "Remote returned code 401 with: bad key");
    }
}

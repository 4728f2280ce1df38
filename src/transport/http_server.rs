//! HTTP transport
//!
//! Serves a [`Service`] over HTTP with axum. Every request, whatever its path,
//! is buffered and handed to [`Service::dispatch`]; routing happens there, so
//! the axum router only carries a fallback handler and a trace layer.

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    response::Response,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::errors::Error;
use crate::server::Service;
use crate::server::response;

/// Configuration options for the HTTP server
#[derive(Debug, Clone)]
pub struct HttpServerOptions {
    /// Address to bind the server to
    pub bind_address: String,
    /// Largest request body accepted, in bytes
    pub max_body_bytes: usize,
}

impl Default for HttpServerOptions {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Clone)]
struct AppState {
    service: Arc<Service>,
    max_body_bytes: usize,
}

/// Create a transport error
fn transport_error<S: Into<String>>(message: S) -> Error {
    Error::Io(std::io::Error::other(message.into()))
}

/// Build an axum router that forwards every request to `service`
pub fn router(service: Arc<Service>) -> Router {
    router_with_options(service, &HttpServerOptions::default())
}

fn router_with_options(service: Arc<Service>, options: &HttpServerOptions) -> Router {
    let state = AppState {
        service,
        max_body_bytes: options.max_body_bytes,
    };

    Router::new()
        .fallback(handle_request)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn handle_request(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read body of {} {}: {}", parts.method, parts.uri, e);
            let err = Error::MalformedRequest(format!("unreadable request body: {}", e));
            return response::from_error(&err).map(Body::from);
        }
    };

    let request = http::Request::from_parts(parts, bytes);
    state.service.dispatch(request).await.map(Body::from)
}

/// HTTP server hosting an IFTTT service
pub struct HttpServer {
    /// Options for the server
    options: HttpServerOptions,

    /// Service answering requests
    service: Arc<Service>,

    /// Address actually bound, once started
    local_addr: Option<SocketAddr>,

    /// Server task handle
    server_handle: Option<tokio::task::JoinHandle<Result<(), Error>>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given options
    pub fn new(service: Arc<Service>, options: HttpServerOptions) -> Self {
        Self {
            options,
            service,
            local_addr: None,
            server_handle: None,
        }
    }

    /// The bound address, once the server has started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listener and start serving in a background task
    ///
    /// Returns the bound address, which differs from the configured one when
    /// binding to port 0.
    pub async fn start(&mut self) -> Result<SocketAddr, Error> {
        if let Some(addr) = self.local_addr {
            tracing::warn!("HTTP server already started on {}", addr);
            return Ok(addr);
        }

        let addr = self
            .options
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| {
                tracing::error!("Failed to parse bind address: {}", e);
                Error::Config(format!("Invalid bind address: {}", e))
            })?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| transport_error(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        let app = router_with_options(self.service.clone(), &self.options);
        let server_handle = tokio::spawn(async move {
            tracing::info!("Starting IFTTT service on {}", local_addr);
            axum::serve(listener, app.into_make_service())
                .await
                .map_err(|e| transport_error(format!("Server error: {}", e)))
        });

        self.local_addr = Some(local_addr);
        self.server_handle = Some(server_handle);
        Ok(local_addr)
    }

    /// Stop the server task
    pub async fn close(&mut self) -> Result<(), Error> {
        tracing::info!("Closing HTTP server");
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
        self.local_addr = None;
        Ok(())
    }

    /// Serve in the foreground until `shutdown` resolves
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self
            .options
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| transport_error(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!("Starting IFTTT service on {}", listener.local_addr()?);
        let app = router_with_options(self.service, &self.options);
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| transport_error(format!("Server error: {}", e)))
    }
}

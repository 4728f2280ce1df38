//! Transports serving an IFTTT service
//!
//! IFTTT talks plain HTTP, so the HTTP server is the only transport.

pub mod http_server;

pub use http_server::{HttpServer, HttpServerOptions, router};

//! HTTP/HTTPS server startup logic.

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;

use crate::config::{AppConfig, TlsMode};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Invalid listen address: {0}")]
    Address(String),

    #[error("Failed to load TLS configuration: {0}")]
    TlsConfig(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP or HTTPS server based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| ServerError::Address(format!("{}:{} ({e})", config.http.host, config.http.port)))?;

    let handle = Handle::new();
    shutdown::setup_shutdown_handler(handle.clone());

    match config.http.tls.mode {
        TlsMode::None => {
            tracing::info!(%addr, "Starting HTTP server (no TLS)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(|e| ServerError::Server(e.to_string()))
        }
        TlsMode::Manual => {
            // Presence of both paths is validated at config load.
            let cert_path = config.http.tls.cert_path.clone().unwrap_or_default();
            let key_path = config.http.tls.key_path.clone().unwrap_or_default();

            tracing::info!(%addr, cert = %cert_path, key = %key_path, "Starting HTTPS server");

            let rustls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
                .await
                .map_err(|e| {
                    ServerError::TlsConfig(format!("Failed to load certificates: {e}"))
                })?;

            shutdown::setup_reload_handler(rustls_config.clone(), cert_path, key_path);

            axum_server::bind_rustls(addr, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(|e| ServerError::Server(e.to_string()))
        }
    }
}

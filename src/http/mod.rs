//! HTTP server startup and lifecycle.
//!
//! Two serving modes:
//! - **None**: Plain HTTP (development, or behind a reverse proxy)
//! - **Manual**: HTTPS with user-provided certificate files
//!
//! The server includes graceful shutdown on SIGTERM/SIGINT and
//! certificate hot-reload via SIGHUP in manual mode.

mod server;
mod shutdown;

pub use server::start_server;

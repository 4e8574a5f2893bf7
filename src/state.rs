//! Shared application state for request handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenSigner;
use crate::config::AppConfig;
use crate::support::SupportModel;

/// Shared application state, cloneable across handlers via Arc-wrapped
/// fields. Holds the configuration, the database pool, the token signer,
/// and the support completion provider.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: SqlitePool,
    pub signer: TokenSigner,
    pub support: Arc<dyn SupportModel>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: SqlitePool,
        signer: TokenSigner,
        support: Arc<dyn SupportModel>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db,
            signer,
            support,
        }
    }
}

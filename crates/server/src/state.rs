//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::services::{AuthService, RecordService, TokenKeys};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// record store, token keys and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn Store>,
    tokens: TokenKeys,
    expose_error_details: bool,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Record store backend
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn Store>) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl_days);
        let expose_error_details = !config.environment.is_production();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                expose_error_details,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Whether 5xx bodies include internal error detail (off in production).
    #[must_use]
    pub fn expose_error_details(&self) -> bool {
        self.inner.expose_error_details
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), self.tokens())
    }

    /// Record service bound to this state.
    #[must_use]
    pub fn records(&self) -> RecordService<'_> {
        RecordService::new(self.store())
    }
}

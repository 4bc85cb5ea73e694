//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::auth::TokenKeys;
use crate::config::Settings;
use crate::voting::SessionStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// The deployment's single voting session (has internal locking)
    pub session: SessionStore,
    /// Verifies caller bearer tokens
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            session: SessionStore::new(settings.voting.administrator_identity()),
            tokens: TokenKeys::from_config(&settings.auth),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;

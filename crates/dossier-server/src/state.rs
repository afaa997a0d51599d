//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use dossier_config::Secret;
use dossier_core::{AgentStore, CodenameGenerator};

/// Shared state accessible to all route handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<AgentStore>,
    api_key: Option<Secret>,
    generator: CodenameGenerator,
    started_at: Instant,
}

impl AppState {
    /// Create new app state wrapping an agent store.
    pub fn new(store: AgentStore, api_key: Option<Secret>) -> Self {
        Self::with_generator(store, api_key, CodenameGenerator::default())
    }

    /// Create new app state with a tuned codename generator.
    pub fn with_generator(
        store: AgentStore,
        api_key: Option<Secret>,
        generator: CodenameGenerator,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Arc::new(store),
                api_key,
                generator,
                started_at: Instant::now(),
            }),
        }
    }

    /// Get a handle to the agent store.
    pub fn store(&self) -> &Arc<AgentStore> {
        &self.inner.store
    }

    /// The generator used when a request doesn't ask for its own attempt count.
    pub fn generator(&self) -> CodenameGenerator {
        self.inner.generator
    }

    /// Check if the given API key is valid.
    /// Returns true if no API key is configured (open access) or if the key matches.
    pub fn check_auth(&self, key: Option<&str>) -> bool {
        match &self.inner.api_key {
            None => true,
            Some(expected) => key == Some(expected.expose()),
        }
    }

    /// Get server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_state(key: Option<&str>) -> AppState {
        AppState::new(AgentStore::in_memory().unwrap(), key.map(Secret::new))
    }

    #[test]
    fn test_auth_no_key_configured() {
        let state = make_state(None);
        assert!(state.check_auth(None));
        assert!(state.check_auth(Some("anything")));
    }

    #[test]
    fn test_auth_with_key() {
        let state = make_state(Some("secret123"));
        assert!(!state.check_auth(None));
        assert!(!state.check_auth(Some("wrong")));
        assert!(state.check_auth(Some("secret123")));
    }

    #[test]
    fn test_default_generator() {
        let state = make_state(None);
        assert_eq!(state.generator().max_attempts(), 20);
        assert!(state.uptime_secs() < 2);
    }

    #[test]
    fn test_clones_share_store() {
        let state = make_state(None);
        let clone = state.clone();
        assert!(Arc::ptr_eq(state.store(), clone.store()));
    }
}

//! Session Registry
//!
//! Each console tab evaluates code in its own evaluator-side context. The
//! evaluator tells contexts apart by a session id the client picks, so the
//! registry hands out one id per tab and lets a tab start over with a new
//! one.

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Tab id to session id, shared by concurrent evaluations.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tab's session id, created on first use.
    pub fn session_for(&self, tab: &str) -> String {
        self.sessions
            .entry(tab.to_owned())
            .or_insert_with(|| {
                let session = new_session_id();
                debug!(tab, session = %session, "created session");
                session
            })
            .value()
            .clone()
    }

    /// Replace the tab's session with a fresh one.
    pub fn reset(&self, tab: &str) -> String {
        let session = new_session_id();
        debug!(tab, session = %session, "reset session");
        self.sessions.insert(tab.to_owned(), session.clone());
        session
    }

    /// Drop the tab's session. Returns the id it had.
    pub fn forget(&self, tab: &str) -> Option<String> {
        self.sessions.remove(tab).map(|(_, session)| session)
    }

    /// Current session id of a tab without creating one.
    pub fn get(&self, tab: &str) -> Option<String> {
        self.sessions.get(tab).map(|entry| entry.value().clone())
    }

    /// Number of tabs with a session.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_is_stable_per_tab() {
        let registry = SessionRegistry::new();
        let first = registry.session_for("tab-1");
        assert_eq!(registry.session_for("tab-1"), first);
        assert_ne!(registry.session_for("tab-2"), first);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reset_replaces_session() {
        let registry = SessionRegistry::new();
        let before = registry.session_for("tab");
        let after = registry.reset("tab");
        assert_ne!(before, after);
        assert_eq!(registry.session_for("tab"), after);
    }

    #[test]
    fn reset_creates_missing_session() {
        let registry = SessionRegistry::new();
        let session = registry.reset("new");
        assert_eq!(registry.get("new"), Some(session));
    }

    #[test]
    fn forget_drops_session() {
        let registry = SessionRegistry::new();
        let session = registry.session_for("tab");
        assert_eq!(registry.forget("tab"), Some(session));
        assert!(registry.get("tab").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn session_ids_are_uuids() {
        let registry = SessionRegistry::new();
        let session = registry.session_for("tab");
        assert!(Uuid::parse_str(&session).is_ok());
    }
}

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::models::UserId;

/// Online user ids as last broadcast by the backend.
///
/// Replaced wholesale on every broadcast; there is no incremental add/remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceSet {
    online: HashSet<UserId>,
    received: bool,
}

impl PresenceSet {
    pub fn from_broadcast<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        Self {
            online: ids.into_iter().collect(),
            received: true,
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    /// Whether any broadcast arrived since the last reset
    pub fn has_received(&self) -> bool {
        self.received
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.online.iter()
    }
}

pub type PresenceHandler = Arc<dyn Fn(&PresenceSet) + Send + Sync>;

/// Presence callbacks, one per subscriber slot
#[derive(Clone, Default)]
pub struct PresenceHub {
    handlers: Arc<RwLock<HashMap<String, PresenceHandler>>>,
}

impl PresenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `slot`, replacing any previous handler there
    pub fn register<F>(&self, slot: impl Into<String>, handler: F)
    where
        F: Fn(&PresenceSet) + Send + Sync + 'static,
    {
        let slot = slot.into();
        let replaced = self
            .handlers
            .write()
            .insert(slot.clone(), Arc::new(handler))
            .is_some();
        tracing::debug!(%slot, replaced, "presence handler registered");
    }

    pub fn unregister(&self, slot: &str) -> bool {
        self.handlers.write().remove(slot).is_some()
    }

    pub fn notify(&self, set: &PresenceSet) {
        // Clone out so a handler may re-register without deadlocking
        let handlers: Vec<PresenceHandler> = self.handlers.read().values().cloned().collect();
        for handler in handlers {
            handler(set);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

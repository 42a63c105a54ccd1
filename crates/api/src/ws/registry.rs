//! User-to-channel session bindings for live update delivery.
//!
//! Each user has at most one active channel at any instant; a later
//! binding silently supersedes an earlier one. Bindings are process-local
//! and lost on restart, which is acceptable: live connections do not
//! survive a restart either.

use std::collections::HashMap;

use tokio::sync::RwLock;

use reel_core::types::DbId;

/// Maps a user id to the id of their currently-active WebSocket connection.
///
/// Constructed once at startup and shared via `Arc` between the channel
/// handler (which registers/removes bindings) and the update router (which
/// resolves them).
pub struct SessionRegistry {
    bindings: RwLock<HashMap<DbId, String>>,
}

impl SessionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a user to a channel, overwriting any existing binding.
    pub async fn register(&self, user_id: DbId, channel_id: String) {
        self.bindings.write().await.insert(user_id, channel_id);
    }

    /// Remove the binding whose value equals `channel_id`, leaving all
    /// others untouched.
    ///
    /// Closure events carry only the channel id, so this is a reverse
    /// lookup by value. Comparing the stored channel id (not just the user
    /// id) means a close event from a superseded channel never evicts the
    /// user's newer binding.
    pub async fn remove(&self, channel_id: &str) {
        let mut bindings = self.bindings.write().await;
        bindings.retain(|_, bound| bound != channel_id);
    }

    /// Resolve a user to their active channel id, if any.
    pub async fn resolve(&self, user_id: DbId) -> Option<String> {
        self.bindings.read().await.get(&user_id).cloned()
    }

    /// Return the current number of bindings.
    pub async fn binding_count(&self) -> usize {
        self.bindings.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! # Session store
//!
//! Per-user conversation state keyed by Telegram username: the ordered chat history and the
//! model picked with /setmodel. Process memory only; nothing survives a restart.
//!
//! History and model selection are independent: [`SessionStore::reset`] clears the history and
//! keeps the selected model. History is unbounded until reset.
//!
//! ## Thread Safety
//!
//! The store is a cheap-to-clone handle over `Arc<RwLock<HashMap>>`. Every operation takes the
//! lock once and performs its whole mutation under it, so concurrent updates never interleave
//! inside an operation.

use prompt::{ChatMessage, MessageRole};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State kept for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Conversation turns, oldest first.
    pub history: Vec<ChatMessage>,
    pub selected_model: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties `user`'s history, creating the entry if needed. Idempotent.
    pub async fn reset(&self, user: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(user.to_string()).or_default().history.clear();
        debug!(user = %user, "Session history reset");
    }

    /// Appends one turn to `user`'s history, creating the session if needed.
    pub async fn append_turn(&self, user: &str, role: MessageRole, content: impl Into<String>) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user.to_string()).or_default();
        session.history.push(ChatMessage::new(role, content));
        debug!(user = %user, role = %role, turns = session.history.len(), "Turn appended");
    }

    /// Current history of `user`; empty for unknown users.
    pub async fn history(&self, user: &str) -> Vec<ChatMessage> {
        let sessions = self.sessions.read().await;
        sessions
            .get(user)
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Records `model_id` as `user`'s selection, overwriting any previous one.
    pub async fn set_model(&self, user: &str, model_id: impl Into<String>) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(user.to_string()).or_default().selected_model = Some(model_id.into());
    }

    /// The model `user` selected, if any.
    pub async fn model(&self, user: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.get(user).and_then(|s| s.selected_model.clone())
    }

    /// Whether `user` has an entry at all.
    pub async fn contains(&self, user: &str) -> bool {
        self.sessions.read().await.contains_key(user)
    }

    /// Snapshot of `user`'s whole session.
    pub async fn session(&self, user: &str) -> Option<Session> {
        self.sessions.read().await.get(user).cloned()
    }

    /// Number of users with an entry.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

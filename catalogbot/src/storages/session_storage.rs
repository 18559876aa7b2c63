use std::{collections::HashMap, sync::Arc};

use teloxide::types::ChatId;
use tokio::sync::Mutex;

/// Per-chat conversation flags
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionFlags {
    /// Every plain text message is treated as bulk update input
    pub bulk_update: bool,
}

/// Trait for per-chat session state
#[async_trait::async_trait]
pub trait SessionStorageTrait: Send + Sync {
    async fn get_session(&self, chat_id: ChatId) -> SessionFlags;

    async fn is_bulk_update(&self, chat_id: ChatId) -> bool {
        self.get_session(chat_id).await.bulk_update
    }

    /// Set or clear bulk update mode, returning the previous value
    async fn set_bulk_update(&self, chat_id: ChatId, enabled: bool) -> bool;
}

/// In-memory session storage; a chat without flags has no entry
#[derive(Clone, Default)]
pub struct SessionStorage {
    sessions: Arc<Mutex<HashMap<ChatId, SessionFlags>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStorageTrait for SessionStorage {
    async fn get_session(&self, chat_id: ChatId) -> SessionFlags {
        self.sessions
            .lock()
            .await
            .get(&chat_id)
            .copied()
            .unwrap_or_default()
    }

    async fn set_bulk_update(&self, chat_id: ChatId, enabled: bool) -> bool {
        let mut sessions = self.sessions.lock().await;
        let previous = sessions.get(&chat_id).copied().unwrap_or_default();
        let updated = SessionFlags {
            bulk_update: enabled,
            ..previous
        };
        if updated == SessionFlags::default() {
            sessions.remove(&chat_id);
        } else {
            sessions.insert(chat_id, updated);
        }
        previous.bulk_update
    }
}

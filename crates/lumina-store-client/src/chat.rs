//! Typed client for the `chat_messages` table.

use lumina_core::{ChatMessageId, ChatRole, ChatTurn, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::rest::{eq, Query, Table};

pub(crate) const TABLE: &str = "chat_messages";

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub role: ChatRole,
    pub text: String,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// The message as a history turn for the Sage.
    pub fn turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role,
            text: self.text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    user_id: UserId,
    role: ChatRole,
    text: &'a str,
}

/// Client for one user's conversation with the Sage.
#[derive(Debug, Clone)]
pub struct ChatClient {
    table: Table,
    user_id: UserId,
}

impl ChatClient {
    pub(crate) fn new(table: Table, user_id: UserId) -> Self {
        Self { table, user_id }
    }

    pub async fn save_message(&self, role: ChatRole, text: &str) -> Result<ChatMessage, StoreError> {
        let body = NewMessage {
            user_id: self.user_id,
            role,
            text,
        };
        self.table.insert(&body).await
    }

    /// Full conversation, oldest first.
    pub async fn history(&self) -> Result<Vec<ChatMessage>, StoreError> {
        let query: Query = vec![
            ("user_id", eq(self.user_id)),
            ("order", "created_at.asc".to_string()),
        ];
        self.table.select(&query).await
    }

    /// Delete every message this user has stored.
    pub async fn clear_history(&self) -> Result<(), StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id))];
        self.table.delete(&query).await?;
        tracing::info!("chat history cleared");
        Ok(())
    }
}

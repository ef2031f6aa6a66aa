use thiserror::Error;

use crate::db_types::{DisputeId, NewPersistedMessage, PersistedMessage};

#[derive(Debug, Clone, Error)]
pub enum MessageLogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Dispute {0} is resolved or does not exist. No new messages can be recorded for it.")]
    DisputeClosed(DisputeId),
}

impl From<sqlx::Error> for MessageLogError {
    fn from(e: sqlx::Error) -> Self {
        MessageLogError::DatabaseError(e.to_string())
    }
}

/// Durable, append-only storage for chat messages. Messages are never updated or deleted.
#[allow(async_fn_in_trait)]
pub trait MessageLog {
    /// Appends a message to the dispute's history.
    ///
    /// The insert is guarded: if the dispute does not exist, or has been resolved, nothing is written and
    /// [`MessageLogError::DisputeClosed`] is returned.
    async fn append_message(&self, message: NewPersistedMessage) -> Result<PersistedMessage, MessageLogError>;

    /// Fetches the full message history for a dispute, oldest first.
    async fn fetch_messages_for_dispute(&self, id: &DisputeId) -> Result<Vec<PersistedMessage>, MessageLogError>;
}

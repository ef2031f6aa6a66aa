use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{DisputeId, NewPersistedMessage, PersistedMessage},
    traits::MessageLogError,
};

/// Appends a chat message, but only if the dispute exists and is still open. The check and the insert happen in one
/// statement, so a message can never be recorded against a dispute that was resolved before the insert ran.
pub async fn append_message(
    message: NewPersistedMessage,
    conn: &mut SqliteConnection,
) -> Result<PersistedMessage, MessageLogError> {
    let NewPersistedMessage { dispute_id, sender_id, content } = message;
    let saved: Option<PersistedMessage> = sqlx::query_as(
        r#"
        INSERT INTO chat_messages (dispute_id, sender_id, content)
        SELECT $1, $2, $3
        WHERE EXISTS (SELECT 1 FROM disputes WHERE id = $1 AND resolved = FALSE)
        RETURNING *;
        "#,
    )
    .bind(dispute_id.as_str())
    .bind(sender_id.as_str())
    .bind(content)
    .fetch_optional(conn)
    .await?;
    match saved {
        Some(m) => {
            trace!("🗃️ Message #{} from {} saved in dispute {}", m.id, m.sender_id, m.dispute_id);
            Ok(m)
        },
        None => Err(MessageLogError::DisputeClosed(dispute_id)),
    }
}

pub async fn fetch_messages(
    id: &DisputeId,
    conn: &mut SqliteConnection,
) -> Result<Vec<PersistedMessage>, sqlx::Error> {
    let messages = sqlx::query_as("SELECT * FROM chat_messages WHERE dispute_id = $1 ORDER BY id")
        .bind(id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(messages)
}

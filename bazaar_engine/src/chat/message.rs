use serde::{Deserialize, Serialize};

use crate::db_types::{DisputeId, NewPersistedMessage, UserId};

/// A chat message as it travels through the hub.
///
/// `sender` is the authenticated identity of the author and is what echo suppression keys on. `username` is the
/// display name the author chose when joining and is only ever shown to other participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: DisputeId,
    pub sender: UserId,
    pub username: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new<S: Into<String>>(room: DisputeId, sender: UserId, username: S, content: S) -> Self {
        Self { room, sender, username: username.into(), content: content.into() }
    }

    pub fn to_wire(&self) -> WireMessage {
        WireMessage { content: self.content.clone(), room_id: self.room.to_string(), username: self.username.clone() }
    }

    pub fn to_persisted(&self) -> NewPersistedMessage {
        NewPersistedMessage { dispute_id: self.room.clone(), sender_id: self.sender.clone(), content: self.content.clone() }
    }
}

/// The JSON shape of a single outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub content: String,
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub username: String,
}

#[derive(Deserialize)]
struct InboundFrame {
    content: String,
}

/// Extracts the message body from an inbound text frame.
///
/// Clients may send either the wire JSON shape, in which case only `content` is used (the room and display name are
/// fixed when the connection is made), or plain text, which is taken verbatim.
pub fn inbound_content(frame: &str) -> String {
    match serde_json::from_str::<InboundFrame>(frame) {
        Ok(f) => f.content,
        Err(_) => frame.to_string(),
    }
}

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Declares a string-backed identifier newtype. All Bazaar entity ids are UUID strings.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh, random (v4 UUID) identifier.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

//--------------------------------------        Identifiers      -------------------------------------------------------
id_type!(
    /// The identity of a marketplace user, as issued by the authentication layer.
    UserId
);
id_type!(OrderId);
id_type!(
    /// A dispute identifier. Chat rooms are keyed by the dispute they belong to, so this doubles as the room id.
    DisputeId
);
id_type!(ImageId);

//--------------------------------------         Dispute         -------------------------------------------------------
/// A disagreement over a single order. `resolved` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub order_id: OrderId,
    pub description: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDispute {
    pub order_id: OrderId,
    pub description: String,
}

impl NewDispute {
    pub fn new<S: Into<String>>(order_id: OrderId, description: S) -> Self {
        Self { order_id, description: description.into() }
    }
}

//--------------------------------------       DisputeImage      -------------------------------------------------------
/// Evidence attached to a dispute. The image itself lives in the object store; only its URL is recorded here.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DisputeImage {
    pub id: ImageId,
    pub dispute_id: DisputeId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     PersistedMessage    -------------------------------------------------------
/// The durable record of a chat message that was accepted into a dispute room.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PersistedMessage {
    pub id: i64,
    pub dispute_id: DisputeId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPersistedMessage {
    pub dispute_id: DisputeId,
    pub sender_id: UserId,
    pub content: String,
}

//--------------------------------------     ParticipantRole     -------------------------------------------------------
/// The relationship between a user and a dispute (or the order underlying it), as resolved through the
/// dispute → order → product → store ownership chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// The user placed the order.
    Buyer,
    /// The user owns the store that sold the product.
    Seller,
    /// The user is neither the buyer nor the seller.
    Unrelated,
    /// The dispute has been closed. Takes precedence over every other role.
    Resolved,
}

impl ParticipantRole {
    /// Only buyers and sellers of an open dispute may take part in it.
    pub fn is_participant(&self) -> bool {
        matches!(self, Self::Buyer | Self::Seller)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid participant role: {0}")]
pub struct ParticipantRoleParseError(String);

impl FromStr for ParticipantRole {
    type Err = ParticipantRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "unrelated" => Ok(Self::Unrelated),
            "resolved" => Ok(Self::Resolved),
            s => Err(ParticipantRoleParseError(s.to_string())),
        }
    }
}

impl Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
            Self::Unrelated => write!(f, "unrelated"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

//! Bazaar Dispute Engine
//!
//! The dispute engine holds the core of the Bazaar marketplace's dispute-resolution service: the dispute records
//! themselves, the access gate that decides who may take part in a dispute, the durable chat log, and the in-memory
//! hub that relays chat messages between the parties of a dispute in real time.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@traits`] and the SQLite backend). You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@dispute_api`]). The [`AccessGate`] authorizes participants, and [`DisputeApi`]
//!    raises, fetches and closes disputes and reads and writes their chat history.
//! 3. The chat [`Hub`] ([`mod@chat`]), a single coordinator task that owns every chat room and fans messages out to
//!    the members of a room. It is transport-agnostic; the server crate connects it to WebSockets.
pub mod chat;
pub mod db_types;
pub mod dispute_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

pub use chat::{
    hub::{Hub, HubConfig, HubCoordinator},
    message::{ChatMessage, WireMessage},
    room::{ConnectionHandle, ConnectionId, ConnectionKey},
};
pub use dispute_api::{
    access_gate::AccessGate,
    dispute_objects::DisputeWithImages,
    disputes_api::DisputeApi,
    errors::{AccessError, DisputeApiError},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

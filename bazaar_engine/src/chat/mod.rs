//! # Real-time dispute chat
//!
//! * [`hub`] owns the rooms and fans messages out to their members.
//! * [`room`] is the per-dispute membership registry, and the hub-side handle of each connection.
//! * [`message`] defines the in-process chat message and its JSON wire form.
//!
//! The transport itself (WebSockets) lives in the server crate. From the hub's point of view a connection is just a
//! bounded queue of outbound messages.
pub mod hub;
pub mod message;
pub mod room;

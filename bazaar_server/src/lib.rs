//! # Bazaar dispute server
//! This crate hosts the HTTP and WebSocket front end for Bazaar's dispute resolution. It is responsible for:
//! * Letting buyers and sellers raise, inspect and resolve disputes over their orders.
//! * Upgrading authorised participants to WebSocket connections and joining them to the dispute's chat room.
//! * Persisting every chat message before relaying it to the other participants in the room.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/ws/rooms`: The chat rooms currently held by the hub.
//! * `/api/ws/create` and `/api/ws/join/{id}`: Chat room creation and WebSocket joins.
//! * `/api/disputes/...`: Dispute records, evidence images and chat history.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod room_reaper;
pub mod routes;
pub mod server;
pub mod ws;

#[cfg(test)]
mod endpoint_tests;

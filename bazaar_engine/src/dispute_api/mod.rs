//! # Bazaar dispute engine public API
//!
//! The `dispute_api` module exposes the programmatic API for the dispute subsystem.
//!
//! * [`access_gate`] decides whether a user may join, read or post to a dispute.
//! * [`disputes_api`] raises, fetches and closes disputes, attaches evidence and reads and writes chat history.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use bazaar_engine::{AccessGate, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let gate = AccessGate::new(db);
//! let role = gate.authorize(&dispute_id, &user_id).await?;
//! ```
pub mod access_gate;
pub mod dispute_objects;
pub mod disputes_api;
pub mod errors;

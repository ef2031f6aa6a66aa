//! # Database backend contracts
//!
//! This module defines the behaviour that a database backend must expose in order to back the Bazaar dispute engine.
//!
//! ## Disputes
//! A dispute is raised against a single order by either the buyer or the seller. It may carry evidence images, and it
//! can be closed (resolved) exactly once.
//!
//! ## Traits
//! * [`DisputeManagement`] creates, fetches and closes disputes, and records evidence images.
//! * [`AccessManagement`] resolves the role of a user with respect to a dispute or an order by walking the
//!   dispute → order → product → store ownership chain. It is the data source for the access gate.
//! * [`MessageLog`] is the durable, append-only history of chat messages.
mod access_management;
mod dispute_management;
mod message_log;

pub use access_management::{AccessManagement, AccessManagementError};
pub use dispute_management::{DisputeManagement, DisputeManagementError};
pub use message_log::{MessageLog, MessageLogError};

//! SQLite backend for the Bazaar dispute engine.
//!
//! The embedded migrations in `migrations/` create the full schema, including the marketplace tables that the access
//! gate joins over.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

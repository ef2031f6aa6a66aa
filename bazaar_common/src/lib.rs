//! Small helpers shared by the Bazaar dispute engine and server crates.
mod helpers;
mod secret;

pub use helpers::{parse_boolean_flag, parse_number_or_default};
pub use secret::Secret;

//! Helpers for tests that need a real database: throwaway SQLite files with the schema applied, and a minimal
//! marketplace (a buyer, a seller with a store and product, an order, and a bystander) to raise disputes against.
pub mod fixtures;
pub mod prepare_env;

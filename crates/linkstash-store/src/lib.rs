// ABOUTME: SQLite persistence for linkstash users and content items.
// ABOUTME: All content mutations are conditional and scoped to the owning user.

pub mod sqlite;

pub use sqlite::{Store, StoreError};

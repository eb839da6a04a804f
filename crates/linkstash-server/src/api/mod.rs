// ABOUTME: API module containing all HTTP handler functions for the linkstash REST API.
// ABOUTME: Organized into sub-modules for user auth, content CRUD, and sharing.

pub mod content;
pub mod share;
pub mod users;

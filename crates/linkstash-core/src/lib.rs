// ABOUTME: Core library for linkstash, containing the shared domain types.
// ABOUTME: Defines users, content items, token claims, and input validation.

pub mod claims;
pub mod content;
pub mod user;

pub use claims::Claims;
pub use content::{Content, ContentPatch, NewContent, normalize_tags};
pub use user::{NewUser, User, ValidationError};

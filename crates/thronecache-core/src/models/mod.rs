//! Data models for the character catalog.
//!
//! - `Character`: a catalog record, optionally decorated with a store id
//! - `PageNumber`: validated 1-based page index for remote fetches

pub mod character;

pub use character::{Character, CharacterId, InvalidPage, PageNumber};

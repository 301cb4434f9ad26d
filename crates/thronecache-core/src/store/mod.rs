//! Local character store.
//!
//! `CharacterStore` keeps the character table in memory, optionally backed
//! by a JSON file in the cache directory, and pushes the full table to every
//! subscriber after each committed change.
//!
//! The file is wrapped in a `CachedData` envelope so the last write time
//! survives restarts.

pub mod cached;
pub mod error;
pub mod feed;
pub mod table;

pub use cached::CachedData;
pub use error::StoreError;
pub use feed::{CharacterFeed, Snapshot};
pub use table::{CharacterStore, TABLE_FILE};

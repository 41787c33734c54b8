//! Key-value persistence abstraction.
//!
//! The engine stores each record as one JSON blob under a fixed key.
//! Backends:
//! - In-memory store (tests, ephemeral sessions)
//! - JSON file store (one file per key)

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{read_json, write_json, KeyValueStore};

//! Storage backends.
//!
//! - [`JsonFileBackend`] - one pretty-printed JSON file, atomic writes
//! - [`MemoryBackend`] - in-process slot, for tests and tools
//!
//! Anything else implements [`StorageBackend`](crate::StorageBackend)
//! directly.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

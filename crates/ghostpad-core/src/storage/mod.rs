//! Key-value persistence for non-secret state such as the password record
//!
//! Two backends:
//! 1. In-memory (ephemeral, used for session-only data and tests)
//! 2. JSON file in the user's data directory

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;

pub mod filestore;
pub mod memory;

pub use filestore::FileStore;
pub use memory::MemoryStore;
pub use relaycore::store::{CallLogStore, ConversationStore, Result, StoreError};

//! Storage layer: a narrow [`kv::KvStore`] contract with
//! two adapters (local filesystem, object store), and a typed
//! [`adapter::StorageAdapter`] view over it that the rest of the engine
//! uses exclusively.

mod adapter;
mod keys;
mod kv;
mod local;
mod memory;
#[cfg(feature = "s3")]
mod object_store;

pub use adapter::StorageAdapter;
pub use kv::{KvError, KvResult, KvStore};
pub use local::LocalStore;
pub use memory::InMemoryStore;
#[cfg(feature = "s3")]
pub use object_store::ObjectStoreBackend;

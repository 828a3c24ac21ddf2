//! Durable persistence for the picker: a synchronous string-keyed
//! [`Storage`] abstraction and the [`LocationStore`] built on top of it.

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{LocationStore, CURRENT_LOCATION_KEY, SAVED_LOCATIONS_KEY};

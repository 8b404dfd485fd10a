// FICHIER : docstash/src/lib.rs

pub mod identity;
pub mod query;
pub mod storage;
pub mod utils;

pub use identity::{resolve, IdentityTriple, Selector};
pub use query::{FilterSpec, Operator, PropertyFilter, TypeTag};
pub use storage::{
    open_store, CollectionPolicy, CollectionState, Document, DocumentStore, FileStore,
    MemoryStore, OverwriteMode, RemoteStore, SaveOptions, StorageSystem, WithCollections,
    WithQueries,
};
pub use utils::{init_logging, StoreConfig, StoreError, StoreResult};

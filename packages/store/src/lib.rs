pub mod blob;
pub mod collection;
pub mod error;
pub mod lookup;
pub mod models;
pub mod profile;
pub mod table;

mod memory;
pub use memory::MemoryTableStore;

pub use blob::{BlobStore, MemoryBlobStore, StoredBlob};
pub use collection::{
    Dependent, Direction, Draft, ListCollection, Record, RemoteCollection, Scope, TaskCollection,
};
pub use error::{StoreError, SyncError};
pub use lookup::resolve_list_by_name;
pub use models::{NewList, NewTask, Profile, Task, TodoList, UserId};
pub use profile::ProfileResolver;
pub use table::{Filter, Operation, Order, TableStore};

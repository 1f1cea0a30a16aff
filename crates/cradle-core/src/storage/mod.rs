//! Disk-backed persistence for the startup store.

mod redb_store;

pub use redb_store::RedbStore;

//! # redb-backed Startup Store
//!
//! A disk-backed store using the redb embedded database, providing:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//! - Zero configuration
//!
//! Records are serialized with postcard. The optimistic-concurrency version
//! check runs inside the same write transaction as the record update, so a
//! guarded write is atomic: the full snapshot commits, or nothing does.

use crate::model::{Profile, Startup};
use crate::store::StartupStore;
use crate::types::{Actor, CradleError, StartupId, Timestamp, Version};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for startups: StartupId(u64) -> serialized Startup bytes
const STARTUPS: TableDefinition<u64, &[u8]> = TableDefinition::new("startups");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

/// A disk-backed startup store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next available startup id.
    next_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CradleError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| CradleError::IoError(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(STARTUPS)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| CradleError::IoError(e.to_string()))?;
        }

        // Load metadata
        let read_txn = db
            .begin_read()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        let next_id = {
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            table
                .get("next_id")
                .map_err(|e| CradleError::IoError(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(1)
        };

        Ok(Self { db, next_id })
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), CradleError> {
        self.db
            .compact()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Startup, CradleError> {
        postcard::from_bytes(bytes).map_err(|e| CradleError::DeserializationError(e.to_string()))
    }

    fn encode(startup: &Startup) -> Result<Vec<u8>, CradleError> {
        postcard::to_allocvec(startup).map_err(|e| CradleError::SerializationError(e.to_string()))
    }
}

impl StartupStore for RedbStore {
    fn create(
        &mut self,
        profile: Profile,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Startup, CradleError> {
        let id = StartupId(self.next_id);
        let new_next = self.next_id.saturating_add(1);

        let startup = Startup::register(id, profile, actor.name.clone(), actor.role, now);
        let bytes = Self::encode(&startup)?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        {
            let mut startups_table = write_txn
                .open_table(STARTUPS)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            startups_table
                .insert(id.0, bytes.as_slice())
                .map_err(|e| CradleError::IoError(e.to_string()))?;

            let mut meta_table = write_txn
                .open_table(METADATA)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            meta_table
                .insert("next_id", new_next)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| CradleError::IoError(e.to_string()))?;

        // Update in-memory state only after successful commit.
        self.next_id = new_next;
        Ok(startup)
    }

    fn get(&self, id: StartupId) -> Result<Option<Startup>, CradleError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(STARTUPS)
            .map_err(|e| CradleError::IoError(e.to_string()))?;

        match table
            .get(id.0)
            .map_err(|e| CradleError::IoError(e.to_string()))?
        {
            Some(data) => Ok(Some(Self::decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Startup>, CradleError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(STARTUPS)
            .map_err(|e| CradleError::IoError(e.to_string()))?;

        let mut startups = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| CradleError::IoError(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| CradleError::IoError(e.to_string()))?;
            startups.push(Self::decode(value.value())?);
        }
        Ok(startups)
    }

    fn update_guarded(
        &mut self,
        expected: Version,
        updated: &Startup,
    ) -> Result<Startup, CradleError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CradleError::IoError(e.to_string()))?;

        let committed = {
            let mut table = write_txn
                .open_table(STARTUPS)
                .map_err(|e| CradleError::IoError(e.to_string()))?;

            // Version check and write happen inside one transaction.
            let stored_version = {
                let stored = table
                    .get(updated.id.0)
                    .map_err(|e| CradleError::IoError(e.to_string()))?
                    .ok_or(CradleError::NotFound(updated.id))?;
                Self::decode(stored.value())?.version
            };
            if stored_version != expected {
                return Err(CradleError::ConcurrentModification {
                    expected: expected.value(),
                    found: stored_version.value(),
                });
            }

            let mut committed = updated.clone();
            committed.version = expected.bump();
            let bytes = Self::encode(&committed)?;
            table
                .insert(committed.id.0, bytes.as_slice())
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            committed
        };

        write_txn
            .commit()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        Ok(committed)
    }

    fn remove(&mut self, id: StartupId) -> Result<bool, CradleError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        let removed = {
            let mut table = write_txn
                .open_table(STARTUPS)
                .map_err(|e| CradleError::IoError(e.to_string()))?;
            table
                .remove(id.0)
                .map_err(|e| CradleError::IoError(e.to_string()))?
                .is_some()
        };
        write_txn
            .commit()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        Ok(removed)
    }

    fn count(&self) -> Result<usize, CradleError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(STARTUPS)
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| CradleError::IoError(e.to_string()))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::engine::LifecycleEngine;
    use crate::types::{Stage, Status};
    use tempfile::tempdir;

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            founder: "F".to_string(),
            email: "f@example.com".to_string(),
            phone: String::new(),
            sector: "HealthTech".to_string(),
            stage_of_idea: "Idea".to_string(),
            is_registered: false,
            has_patent: false,
            website: None,
        }
    }

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let admin = Actor::admin("ops");

        let a = store.create(profile("A"), &admin, Timestamp(0)).expect("create");
        let b = store.create(profile("B"), &admin, Timestamp(0)).expect("create");

        assert_ne!(a.id, b.id);
        assert_eq!(store.count().expect("count"), 2);

        let found = store.get(a.id).expect("get").expect("present");
        assert_eq!(found.profile.name, "A");
        assert_eq!(found.stage, Stage::S0);
    }

    #[test]
    fn persistence_across_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let admin = Actor::admin("ops");

        // Create and mutate
        let id = {
            let mut store = RedbStore::open(&db_path).expect("open db");
            let created = store.create(profile("A"), &admin, Timestamp(0)).expect("create");
            let rejected =
                LifecycleEngine::reject(&created, &admin, Timestamp(1), "no".to_string())
                    .expect("reject");
            store
                .update_guarded(created.version, &rejected)
                .expect("commit");
            created.id
        };
        // Store dropped here, simulating process exit

        // Reopen and verify
        {
            let store = RedbStore::open(&db_path).expect("reopen db");
            assert_eq!(store.count().expect("count"), 1);
            let reread = store.get(id).expect("get").expect("present");
            assert_eq!(reread.status, Status::Rejected);
            assert_eq!(reread.version, Version(2));
            assert_eq!(
                reread.rejection.map(|r| r.stage_at_rejection),
                Some(Stage::S0)
            );
        }
    }

    #[test]
    fn next_id_preserved_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let admin = Actor::admin("ops");

        let last_id;
        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store.create(profile("A"), &admin, Timestamp(0)).expect("create");
            last_id = store.create(profile("B"), &admin, Timestamp(0)).expect("create").id;
        }
        {
            let mut store = RedbStore::open(&db_path).expect("reopen db");
            let next = store.create(profile("C"), &admin, Timestamp(0)).expect("create");
            assert!(
                next.id.0 > last_id.0,
                "new id {} should be > previous {}",
                next.id.0,
                last_id.0
            );
        }
    }

    #[test]
    fn guarded_update_detects_conflict() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let admin = Actor::admin("ops");

        let created = store.create(profile("A"), &admin, Timestamp(0)).expect("create");

        let first =
            LifecycleEngine::reject(&created, &admin, Timestamp(1), "first".to_string())
                .expect("reject");
        let second =
            LifecycleEngine::reject(&created, &admin, Timestamp(1), "second".to_string())
                .expect("reject");

        store
            .update_guarded(created.version, &first)
            .expect("first write wins");
        let err = store
            .update_guarded(created.version, &second)
            .expect_err("stale write must fail");
        assert!(matches!(err, CradleError::ConcurrentModification { .. }));

        let stored = store.get(created.id).expect("get").expect("present");
        assert_eq!(stored.rejection.map(|r| r.reason), Some("first".to_string()));
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");

        let orphan = Startup::register(
            StartupId(404),
            profile("Ghost"),
            "ops",
            crate::types::ActorRole::Admin,
            Timestamp(0),
        );

        let err = store
            .update_guarded(orphan.version, &orphan)
            .expect_err("missing id");
        assert!(matches!(err, CradleError::NotFound(_)));
    }

    #[test]
    fn remove_any_lifecycle_state() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let admin = Actor::admin("ops");

        let created = store.create(profile("A"), &admin, Timestamp(0)).expect("create");
        let rejected =
            LifecycleEngine::reject(&created, &admin, Timestamp(1), "no".to_string())
                .expect("reject");
        store
            .update_guarded(created.version, &rejected)
            .expect("commit");

        // Terminal records are still deletable; deletion is not a transition.
        assert!(store.remove(created.id).expect("remove"));
        assert!(store.get(created.id).expect("get").is_none());
    }

    #[test]
    fn list_round_trips_full_history() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let admin = Actor::admin("ops");

        let created = store.create(profile("A"), &admin, Timestamp(0)).expect("create");
        let advanced = LifecycleEngine::advance_stage(
            &created,
            &admin,
            Timestamp(1),
            Stage::S1,
            Some(crate::engine::PitchOutcome {
                date: Timestamp(1),
                panelist: "Panel A".to_string(),
                feedback: "solid".to_string(),
            }),
        )
        .expect("advance");
        store
            .update_guarded(created.version, &advanced)
            .expect("commit");

        let listed = store.list().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pitch_history.len(), 1);
        assert_eq!(listed[0].events.len(), 2);
    }

    #[test]
    fn compact_and_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let admin = Actor::admin("ops");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            for i in 0..20 {
                store
                    .create(profile(&format!("S{i}")), &admin, Timestamp(0))
                    .expect("create");
            }
            store.compact().expect("compact");
        }
        {
            let store = RedbStore::open(&db_path).expect("reopen db");
            assert_eq!(store.count().expect("count"), 20);
        }
    }
}

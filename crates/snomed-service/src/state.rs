//! Persisted-state layout, per spec.md §6: a directory holding `sctdb.json`
//! (`{version, storeKind, searchKind}`), a `kv/` subdirectory (the `redb`
//! database file) and a `search/` subdirectory (the Tantivy index).
//!
//! Opening an existing directory validates the descriptor against the
//! running binary's compiled `storeKind`/`searchKind`; a mismatch fails
//! with [`ServiceError::IncompatibleDatabase`] rather than silently
//! reinterpreting bytes written by a different backend.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use snomed_kv::RedbKvStore;
use snomed_search::SearchIndex;
use snomed_store::ComponentStore;

use crate::error::{ServiceError, ServiceResult};

/// Schema version stamped into `sctdb.json`. Bump when the on-disk bucket
/// or document layout changes incompatibly.
pub const SCHEMA_VERSION: &str = "1";
const STORE_KIND: &str = "redb";
const SEARCH_KIND: &str = "tantivy";

const DESCRIPTOR_FILE: &str = "sctdb.json";
const KV_DIR: &str = "kv";
const SEARCH_DIR: &str = "search";
const KV_FILE: &str = "store.redb";

/// The `sctdb.json` descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    /// Schema version the database was written under.
    pub version: String,
    /// The KV backend that wrote this database (e.g. `"redb"`).
    #[serde(rename = "storeKind")]
    pub store_kind: String,
    /// The search backend that wrote this database (e.g. `"tantivy"`).
    #[serde(rename = "searchKind")]
    pub search_kind: String,
}

impl Descriptor {
    fn compiled() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            store_kind: STORE_KIND.to_string(),
            search_kind: SEARCH_KIND.to_string(),
        }
    }
}

/// An opened database directory: Component Store plus Search Indexer, both
/// backed by files under `dir`.
pub struct State {
    /// The Component Store, backed by `kv/store.redb`.
    pub store: ComponentStore<RedbKvStore>,
    /// The Search Indexer, backed by `search/`.
    pub search_index: SearchIndex,
}

impl State {
    /// Opens `dir`, validating its descriptor, or creates a fresh database
    /// there if `dir` doesn't contain one yet.
    pub fn open_or_create(dir: &Path) -> ServiceResult<Self> {
        fs::create_dir_all(dir)?;
        let descriptor_path = dir.join(DESCRIPTOR_FILE);

        if descriptor_path.exists() {
            let raw = fs::read_to_string(&descriptor_path)?;
            let descriptor: Descriptor = serde_json::from_str(&raw)?;
            let compiled = Descriptor::compiled();
            if descriptor.store_kind != compiled.store_kind
                || descriptor.search_kind != compiled.search_kind
                || descriptor.version != compiled.version
            {
                return Err(ServiceError::IncompatibleDatabase {
                    path: dir.display().to_string(),
                    on_disk_store: descriptor.store_kind,
                    on_disk_search: descriptor.search_kind,
                    expected_store: compiled.store_kind,
                    expected_search: compiled.search_kind,
                });
            }
        } else {
            let descriptor = Descriptor::compiled();
            fs::write(&descriptor_path, serde_json::to_string_pretty(&descriptor)?)?;
        }

        Self::open(dir)
    }

    /// Opens `dir`, requiring a valid descriptor to already exist.
    pub fn open(dir: &Path) -> ServiceResult<Self> {
        let descriptor_path = dir.join(DESCRIPTOR_FILE);
        if !descriptor_path.exists() {
            return Err(ServiceError::DatabaseNotFound(dir.display().to_string()));
        }

        let kv_dir = dir.join(KV_DIR);
        fs::create_dir_all(&kv_dir)?;
        let search_dir = dir.join(SEARCH_DIR);
        fs::create_dir_all(&search_dir)?;

        let kv = RedbKvStore::open(kv_dir.join(KV_FILE))?;
        let store = ComponentStore::new(Arc::new(kv));
        let search_index = SearchIndex::open_or_create(&search_dir)?;

        Ok(Self { store, search_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_then_reopens_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sctdb");

        {
            let state = State::open_or_create(&db).unwrap();
            drop(state);
        }

        // Reopening validates the now-existing descriptor and succeeds.
        let state = State::open(&db).unwrap();
        drop(state);

        let raw = fs::read_to_string(db.join(DESCRIPTOR_FILE)).unwrap();
        let descriptor: Descriptor = serde_json::from_str(&raw).unwrap();
        assert_eq!(descriptor.store_kind, STORE_KIND);
        assert_eq!(descriptor.search_kind, SEARCH_KIND);
    }

    #[test]
    fn rejects_incompatible_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sctdb");
        fs::create_dir_all(&db).unwrap();
        fs::write(
            db.join(DESCRIPTOR_FILE),
            serde_json::to_string(&Descriptor {
                version: SCHEMA_VERSION.to_string(),
                store_kind: "sled".to_string(),
                search_kind: SEARCH_KIND.to_string(),
            })
            .unwrap(),
        )
        .unwrap();

        let err = State::open_or_create(&db).unwrap_err();
        assert!(matches!(err, ServiceError::IncompatibleDatabase { .. }));
    }

    #[test]
    fn open_without_existing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("missing");
        let err = State::open(&db).unwrap_err();
        assert!(matches!(err, ServiceError::DatabaseNotFound(_)));
    }
}

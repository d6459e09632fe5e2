//! A persistent [`KvStore`] backed by the `redb` embedded database.
//!
//! Each [`Bucket`] maps to its own `redb::TableDefinition<&[u8], &[u8]>`.
//! Prefix iteration ranges from the prefix and stops at the first key that
//! no longer starts with it; `redb`'s range API returns an ordered cursor,
//! so this is a correct prefix scan.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::{Bucket, KvError, KvResult, KvStore, UpdateTxn, ViewTxn};

fn table_def(bucket: Bucket) -> TableDefinition<'static, &'static [u8], &'static [u8]> {
    TableDefinition::new(bucket.name())
}

/// Ranges over everything with the given prefix, stopping at the first key
/// that no longer matches it.
fn scan_prefix_in<T: ReadableTable<&'static [u8], &'static [u8]>>(
    table: &T,
    prefix: &[u8],
) -> KvResult<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut out = Vec::new();
    let range = table.range(prefix..).map_err(KvError::from)?;
    for entry in range {
        let (k, v) = entry.map_err(KvError::from)?;
        let key = k.value();
        if !key.starts_with(prefix) {
            break;
        }
        out.push((key.to_vec(), v.value().to_vec()));
    }
    Ok(out)
}

/// A persistent, file-backed KV store.
pub struct RedbKvStore {
    db: Database,
}

impl RedbKvStore {
    /// Opens (creating if absent) a redb database at `path`, pre-creating
    /// every bucket's table so later read-only transactions never hit a
    /// "table does not exist" error on an empty bucket.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let db = Database::create(path.as_ref()).map_err(KvError::from)?;
        let write = db.begin_write().map_err(KvError::from)?;
        for bucket in Bucket::ALL {
            write.open_table(table_def(*bucket)).map_err(KvError::from)?;
        }
        write.commit().map_err(KvError::from)?;
        Ok(Self { db })
    }
}

struct RedbViewTxn<'a> {
    txn: &'a redb::ReadTransaction,
}

impl ViewTxn for RedbViewTxn<'_> {
    fn get(&self, bucket: Bucket, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        Ok(table.get(key).map_err(KvError::from)?.map(|v| v.value().to_vec()))
    }

    fn scan_prefix(&self, bucket: Bucket, prefix: &[u8]) -> KvResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        scan_prefix_in(&table, prefix)
    }
}

struct RedbUpdateTxn<'a> {
    txn: &'a redb::WriteTransaction,
}

impl ViewTxn for RedbUpdateTxn<'_> {
    fn get(&self, bucket: Bucket, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        Ok(table.get(key).map_err(KvError::from)?.map(|v| v.value().to_vec()))
    }

    fn scan_prefix(&self, bucket: Bucket, prefix: &[u8]) -> KvResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        scan_prefix_in(&table, prefix)
    }
}

impl UpdateTxn for RedbUpdateTxn<'_> {
    fn put(&mut self, bucket: Bucket, key: &[u8], value: &[u8]) -> KvResult<()> {
        let mut table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        table.insert(key, value).map_err(KvError::from)?;
        Ok(())
    }

    fn delete(&mut self, bucket: Bucket, key: &[u8]) -> KvResult<()> {
        let mut table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        table.remove(key).map_err(KvError::from)?;
        Ok(())
    }

    fn delete_prefix(&mut self, bucket: Bucket, prefix: &[u8]) -> KvResult<()> {
        let keys = {
            let table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
            scan_prefix_in(&table, prefix)?
                .into_iter()
                .map(|(k, _)| k)
                .collect::<Vec<_>>()
        };
        let mut table = self.txn.open_table(table_def(bucket)).map_err(KvError::from)?;
        for key in keys {
            table.remove(key.as_slice()).map_err(KvError::from)?;
        }
        Ok(())
    }
}

impl KvStore for RedbKvStore {
    fn view<F, R>(&self, f: F) -> KvResult<R>
    where
        F: FnOnce(&dyn ViewTxn) -> KvResult<R>,
    {
        let txn = self.db.begin_read().map_err(KvError::from)?;
        f(&RedbViewTxn { txn: &txn })
    }

    fn update<F, R>(&self, f: F) -> KvResult<R>
    where
        F: FnOnce(&mut dyn UpdateTxn) -> KvResult<R>,
    {
        let txn = self.db.begin_write().map_err(KvError::from)?;
        let result = f(&mut RedbUpdateTxn { txn: &txn })?;
        txn.commit().map_err(KvError::from)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::be_id;

    #[test]
    fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbKvStore::open(dir.path().join("test.redb")).unwrap();
        store
            .update(|txn| {
                txn.put(Bucket::Concepts, &be_id(73211009), b"concept-73211009")?;
                Ok(())
            })
            .unwrap();
        let got = store
            .view(|txn| txn.get(Bucket::Concepts, &be_id(73211009)))
            .unwrap();
        assert_eq!(got, Some(b"concept-73211009".to_vec()));
    }

    #[test]
    fn scan_prefix_stops_at_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbKvStore::open(dir.path().join("test.redb")).unwrap();
        store
            .update(|txn| {
                txn.put(Bucket::IdxConceptParents, b"\x00\x01a", b"")?;
                txn.put(Bucket::IdxConceptParents, b"\x00\x01b", b"")?;
                txn.put(Bucket::IdxConceptParents, b"\x00\x02a", b"")?;
                Ok(())
            })
            .unwrap();
        let hits = store
            .view(|txn| txn.scan_prefix(Bucket::IdxConceptParents, b"\x00\x01"))
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn delete_prefix_clears_bucket_for_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbKvStore::open(dir.path().join("test.redb")).unwrap();
        store
            .update(|txn| {
                txn.put(Bucket::IdxConceptParents, b"a", b"")?;
                txn.put(Bucket::IdxConceptParents, b"b", b"")?;
                Ok(())
            })
            .unwrap();
        store
            .update(|txn| txn.delete_prefix(Bucket::IdxConceptParents, b""))
            .unwrap();
        let hits = store
            .view(|txn| txn.scan_prefix(Bucket::IdxConceptParents, b""))
            .unwrap();
        assert!(hits.is_empty());
    }
}

//! An in-memory [`KvStore`], used by unit tests across the workspace and as
//! a quick-start backend that needs no filesystem.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::{Bucket, KvResult, KvStore, UpdateTxn, ViewTxn};

type BucketMap = BTreeMap<Vec<u8>, Vec<u8>>;

fn bucket_index(bucket: Bucket) -> usize {
    Bucket::ALL.iter().position(|b| *b == bucket).expect("bucket is in Bucket::ALL")
}

/// An in-memory store backed by one `BTreeMap` per bucket, guarded by a
/// single `parking_lot::RwLock`.
#[derive(Default)]
pub struct MemKvStore {
    buckets: RwLock<Vec<BucketMap>>,
}

impl MemKvStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let buckets = vec![BucketMap::new(); Bucket::ALL.len()];
        Self {
            buckets: RwLock::new(buckets),
        }
    }
}

struct MemTxn<'a> {
    buckets: &'a mut Vec<BucketMap>,
}

impl ViewTxn for MemTxn<'_> {
    fn get(&self, bucket: Bucket, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        Ok(self.buckets[bucket_index(bucket)].get(key).cloned())
    }

    fn scan_prefix(&self, bucket: Bucket, prefix: &[u8]) -> KvResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self.buckets[bucket_index(bucket)]
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl UpdateTxn for MemTxn<'_> {
    fn put(&mut self, bucket: Bucket, key: &[u8], value: &[u8]) -> KvResult<()> {
        self.buckets[bucket_index(bucket)].insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, bucket: Bucket, key: &[u8]) -> KvResult<()> {
        self.buckets[bucket_index(bucket)].remove(key);
        Ok(())
    }

    fn delete_prefix(&mut self, bucket: Bucket, prefix: &[u8]) -> KvResult<()> {
        let idx = bucket_index(bucket);
        let keys: Vec<Vec<u8>> = self.buckets[idx]
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in keys {
            self.buckets[idx].remove(&key);
        }
        Ok(())
    }
}

impl KvStore for MemKvStore {
    fn view<F, R>(&self, f: F) -> KvResult<R>
    where
        F: FnOnce(&dyn ViewTxn) -> KvResult<R>,
    {
        let mut guard = self.buckets.write();
        f(&MemTxn { buckets: &mut guard })
    }

    fn update<F, R>(&self, f: F) -> KvResult<R>
    where
        F: FnOnce(&mut dyn UpdateTxn) -> KvResult<R>,
    {
        let mut guard = self.buckets.write();
        f(&mut MemTxn { buckets: &mut guard })
    }
}

//! Component Store: `get`/`get_many`/`put` over typed component rows, keyed
//! by an 8-byte big-endian SCTID (or a UUID for reference set members).
//!
//! Put is upsert-by-effective-time: an existing row is overwritten only when
//! the incoming row's `effective_time` is strictly greater.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use snomed_kv::{Bucket, KvStore};
use snomed_types::{
    Rf2Concept, Rf2ConcreteRelationship, Rf2Description, Rf2OwlExpression, Rf2Relationship,
};

use crate::refset_item::ReferenceSetItem;
use crate::{StoreError, StoreResult};

/// A row kind that can live in the Component Store.
pub trait StoredComponent: Serialize + DeserializeOwned + Clone {
    /// The bucket this component kind lives in.
    fn bucket() -> Bucket;
    /// The component's key within its bucket.
    fn key(&self) -> Vec<u8>;
    /// The component's effective time, for upsert comparison.
    fn effective_time(&self) -> u32;
}

impl StoredComponent for Rf2Concept {
    fn bucket() -> Bucket {
        Bucket::Concepts
    }
    fn key(&self) -> Vec<u8> {
        snomed_kv::keys::be_id(self.id).to_vec()
    }
    fn effective_time(&self) -> u32 {
        self.effective_time
    }
}

impl StoredComponent for Rf2Description {
    fn bucket() -> Bucket {
        Bucket::Descriptions
    }
    fn key(&self) -> Vec<u8> {
        snomed_kv::keys::be_id(self.id).to_vec()
    }
    fn effective_time(&self) -> u32 {
        self.effective_time
    }
}

impl StoredComponent for Rf2Relationship {
    fn bucket() -> Bucket {
        Bucket::Relationships
    }
    fn key(&self) -> Vec<u8> {
        snomed_kv::keys::be_id(self.id).to_vec()
    }
    fn effective_time(&self) -> u32 {
        self.effective_time
    }
}

impl StoredComponent for ReferenceSetItem {
    fn bucket() -> Bucket {
        Bucket::RefsetItems
    }
    fn key(&self) -> Vec<u8> {
        self.id().as_bytes().to_vec()
    }
    fn effective_time(&self) -> u32 {
        ReferenceSetItem::effective_time(self)
    }
}

impl StoredComponent for Rf2ConcreteRelationship {
    fn bucket() -> Bucket {
        Bucket::ConcreteRelationships
    }
    fn key(&self) -> Vec<u8> {
        snomed_kv::keys::be_id(self.id).to_vec()
    }
    fn effective_time(&self) -> u32 {
        self.effective_time
    }
}

impl StoredComponent for Rf2OwlExpression {
    fn bucket() -> Bucket {
        Bucket::OwlExpressions
    }
    fn key(&self) -> Vec<u8> {
        snomed_kv::keys::be_id(self.id).to_vec()
    }
    fn effective_time(&self) -> u32 {
        self.effective_time
    }
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// The Component Store: a thin, typed layer over a [`KvStore`].
pub struct ComponentStore<S: KvStore> {
    kv: Arc<S>,
}

impl<S: KvStore> ComponentStore<S> {
    /// Wraps a KV store.
    pub fn new(kv: Arc<S>) -> Self {
        Self { kv }
    }

    /// Direct access to the underlying KV store, for the Index Layer and
    /// import pipeline.
    pub fn kv(&self) -> &Arc<S> {
        &self.kv
    }

    /// Fetches a single component by key.
    pub fn get<T: StoredComponent>(&self, key: &[u8]) -> StoreResult<Option<T>> {
        let bytes = self.kv.view(|txn| Ok(txn.get(T::bucket(), key)?))?;
        bytes.map(|b| decode(&b)).transpose()
    }

    /// Fetches several components by key, skipping any that are absent.
    pub fn get_many<T: StoredComponent>(&self, keys: &[Vec<u8>]) -> StoreResult<Vec<T>> {
        self.kv.view(|txn| {
            let mut out = Vec::with_capacity(keys.len());
            for key in keys {
                if let Some(bytes) = txn.get(T::bucket(), key)? {
                    let value: T =
                        decode(&bytes).map_err(|_| snomed_kv::KvError::Engine("decode".into()))?;
                    out.push(value);
                }
            }
            Ok(out)
        })
    }

    /// Upserts a batch of components within a single transaction.
    /// Each row overwrites the existing one at its key only when its
    /// `effective_time` is strictly greater than what's already stored.
    pub fn put<T: StoredComponent>(&self, batch: &[T]) -> StoreResult<()> {
        self.kv.update(|txn| {
            for item in batch {
                let key = item.key();
                let existing = txn.get(T::bucket(), &key)?;
                let should_write = match &existing {
                    None => true,
                    Some(bytes) => {
                        let current: T = decode(bytes)
                            .map_err(|_| snomed_kv::KvError::Engine("decode".into()))?;
                        item.effective_time() > current.effective_time()
                    }
                };
                if should_write {
                    let encoded =
                        encode(item).map_err(|_| snomed_kv::KvError::Engine("encode".into()))?;
                    txn.put(T::bucket(), &key, &encoded)?;
                }
            }
            Ok(())
        })
    }

    /// Returns every component in a bucket, in ascending key order. Used by
    /// the Index Layer to rebuild indices from scratch.
    pub fn scan_all<T: StoredComponent>(&self) -> StoreResult<Vec<T>> {
        let rows = self.kv.view(|txn| txn.scan_prefix(T::bucket(), b""))?;
        rows.into_iter().map(|(_, v)| decode(&v)).collect()
    }
}

//! Ordered byte-keyed KV abstraction.
//!
//! `snomed-kv` defines the [`KvStore`] trait — a View/Update transaction
//! model over typed [`Bucket`]s — plus two implementations: [`RedbKvStore`]
//! (persistent, backed by `redb`) and [`MemKvStore`] (in-memory, for tests
//! and quick starts). Higher layers (`snomed-store`'s Component Store and
//! Index Layer) are written against the trait, not either backend directly.
//!
//! # Examples
//!
//! ```
//! use snomed_kv::{Bucket, KvStore, MemKvStore, keys::be_id};
//!
//! let store = MemKvStore::new();
//! store.update(|txn| txn.put(Bucket::Concepts, &be_id(73211009), b"payload")).unwrap();
//! let value = store.view(|txn| txn.get(Bucket::Concepts, &be_id(73211009))).unwrap();
//! assert_eq!(value, Some(b"payload".to_vec()));
//! ```

mod bucket;
mod error;
pub mod keys;
mod mem_store;
#[cfg(feature = "redb")]
mod redb_store;
mod traits;

pub use bucket::Bucket;
pub use error::{KvError, KvResult};
pub use mem_store::MemKvStore;
#[cfg(feature = "redb")]
pub use redb_store::RedbKvStore;
pub use traits::{KvStore, UpdateTxn, ViewTxn};

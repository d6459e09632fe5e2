//! Component Store and Index Layer.
//!
//! The Component Store (`component`) exposes typed, upsert-by-effective-time
//! access to concepts, descriptions, relationships, and reference set
//! members over a [`snomed_kv::KvStore`]. The Index Layer (`index`) derives
//! flat, prefix-keyed lookup tables from the Component Store; it is rebuilt
//! wholesale and never incrementally maintained.

mod component;
mod error;
pub mod index;
mod refset_item;

pub use component::{ComponentStore, StoredComponent};
pub use error::{StoreError, StoreResult};
pub use refset_item::ReferenceSetItem;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_kv::MemKvStore;
    use snomed_types::{DefinitionStatus, Rf2Concept};

    use super::*;

    fn make_concept(id: i64, effective_time: u32) -> Rf2Concept {
        Rf2Concept {
            id,
            effective_time,
            active: true,
            module_id: 900000000000207008,
            definition_status_id: DefinitionStatus::PRIMITIVE_ID,
        }
    }

    #[test]
    fn put_then_get_roundtrips() {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store.put(&[make_concept(73211009, 20020131)]).unwrap();
        let got: Option<Rf2Concept> = store.get(&snomed_kv::keys::be_id(73211009)).unwrap();
        assert_eq!(got, Some(make_concept(73211009, 20020131)));
    }

    #[test]
    fn upsert_ignores_non_newer_effective_time() {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store.put(&[make_concept(73211009, 20020201)]).unwrap();
        store.put(&[make_concept(73211009, 20020101)]).unwrap();
        let got: Option<Rf2Concept> = store.get(&snomed_kv::keys::be_id(73211009)).unwrap();
        assert_eq!(got.unwrap().effective_time, 20020201);
    }

    #[test]
    fn upsert_overwrites_on_strictly_newer_effective_time() {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store.put(&[make_concept(73211009, 20020101)]).unwrap();
        store.put(&[make_concept(73211009, 20020201)]).unwrap();
        let got: Option<Rf2Concept> = store.get(&snomed_kv::keys::be_id(73211009)).unwrap();
        assert_eq!(got.unwrap().effective_time, 20020201);
    }
}

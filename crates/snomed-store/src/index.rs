//! The Index Layer: derived, prefix-keyed lookup tables rebuilt wholesale
//! from the Component Store. There is no incremental maintenance — rebuild
//! is the only write path.

use snomed_kv::{keys, Bucket, KvStore};
use snomed_types::{Rf2Concept, Rf2Description, Rf2Relationship, SctId};

use crate::refset_item::ReferenceSetItem;
use crate::{ComponentStore, StoreResult};

const EMPTY: &[u8] = &[];

/// Rebuilds every index bucket from the current contents of the Component
/// Store. Not atomic with component writes: callers must not issue queries
/// against the index buckets while a rebuild is in flight.
pub fn rebuild_all<S: KvStore>(store: &ComponentStore<S>) -> StoreResult<()> {
    let descriptions: Vec<Rf2Description> = store.scan_all()?;
    let relationships: Vec<Rf2Relationship> = store.scan_all()?;
    let refset_items: Vec<ReferenceSetItem> = store.scan_all()?;

    store.kv().update(|txn| {
        for bucket in Bucket::INDICES {
            txn.delete_prefix(*bucket, EMPTY)?;
        }

        for desc in &descriptions {
            let key = keys::concat(&[&keys::be_id(desc.concept_id), &keys::be_id(desc.id)]);
            txn.put(Bucket::IdxConceptDescriptions, &key, EMPTY)?;
        }

        for rel in &relationships {
            let out_key = keys::concat(&[&keys::be_id(rel.source_id), &keys::be_id(rel.id)]);
            txn.put(Bucket::IdxConceptParentRels, &out_key, EMPTY)?;

            let in_key = keys::concat(&[&keys::be_id(rel.destination_id), &keys::be_id(rel.id)]);
            txn.put(Bucket::IdxConceptChildRels, &in_key, EMPTY)?;

            if rel.is_is_a() && rel.active {
                let parents_key =
                    keys::concat(&[&keys::be_id(rel.source_id), &keys::be_id(rel.destination_id)]);
                txn.put(Bucket::IdxConceptParents, &parents_key, EMPTY)?;

                let children_key =
                    keys::concat(&[&keys::be_id(rel.destination_id), &keys::be_id(rel.source_id)]);
                txn.put(Bucket::IdxConceptChildren, &children_key, EMPTY)?;
            }
        }

        for item in &refset_items {
            let item_id_bytes = item.id().as_bytes().to_vec();

            let comp_key = keys::concat(&[
                &keys::be_id(item.referenced_component_id()),
                &keys::be_id(item.refset_id()),
            ]);
            txn.put(Bucket::IdxComponentRefsets, &comp_key, EMPTY)?;

            let refset_items_key = keys::concat(&[
                &keys::be_id(item.refset_id()),
                &keys::be_id(item.referenced_component_id()),
                &item_id_bytes,
            ]);
            txn.put(Bucket::IdxRefsetItems, &refset_items_key, EMPTY)?;

            if let Some(target) = item.map_target() {
                let target_key = keys::target_key(item.refset_id(), target, &item_id_bytes);
                txn.put(Bucket::IdxRefsetTargetItems, &target_key, EMPTY)?;
            }

            txn.put(Bucket::IdxInstalledRefsets, &keys::be_id(item.refset_id()), EMPTY)?;
        }

        Ok(())
    })?;
    Ok(())
}

fn second_id(key: &[u8]) -> Option<SctId> {
    keys::decode_be_id(&key[8..16])
}

/// Enumerates description ids for a concept, ascending.
pub fn concept_descriptions<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
) -> StoreResult<Vec<SctId>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxConceptDescriptions, &keys::be_id(concept_id)))?;
    Ok(rows.into_iter().filter_map(|(k, _)| second_id(&k)).collect())
}

/// Enumerates outgoing relationship ids for a concept, ascending.
pub fn outgoing_relationship_ids<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
) -> StoreResult<Vec<SctId>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxConceptParentRels, &keys::be_id(concept_id)))?;
    Ok(rows.into_iter().filter_map(|(k, _)| second_id(&k)).collect())
}

/// Enumerates incoming relationship ids for a concept, ascending.
pub fn incoming_relationship_ids<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
) -> StoreResult<Vec<SctId>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxConceptChildRels, &keys::be_id(concept_id)))?;
    Ok(rows.into_iter().filter_map(|(k, _)| second_id(&k)).collect())
}

/// Direct active IS-A parents of a concept, ascending.
pub fn direct_parents<S: KvStore>(store: &ComponentStore<S>, concept_id: SctId) -> StoreResult<Vec<SctId>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxConceptParents, &keys::be_id(concept_id)))?;
    Ok(rows.into_iter().filter_map(|(k, _)| second_id(&k)).collect())
}

/// Direct active IS-A children of a concept, ascending.
pub fn direct_children<S: KvStore>(store: &ComponentStore<S>, concept_id: SctId) -> StoreResult<Vec<SctId>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxConceptChildren, &keys::be_id(concept_id)))?;
    Ok(rows.into_iter().filter_map(|(k, _)| second_id(&k)).collect())
}

/// Reference sets a component is a member of, ascending.
pub fn component_refsets<S: KvStore>(store: &ComponentStore<S>, component_id: SctId) -> StoreResult<Vec<SctId>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxComponentRefsets, &keys::be_id(component_id)))?;
    Ok(rows.into_iter().filter_map(|(k, _)| second_id(&k)).collect())
}

/// Whether `refset_id` has been observed among the imported refset items.
pub fn is_refset_installed<S: KvStore>(store: &ComponentStore<S>, refset_id: SctId) -> StoreResult<bool> {
    let hit = store
        .kv()
        .view(|txn| txn.get(Bucket::IdxInstalledRefsets, &keys::be_id(refset_id)))?;
    Ok(hit.is_some())
}

/// All installed refset ids, ascending.
pub fn installed_refsets<S: KvStore>(store: &ComponentStore<S>) -> StoreResult<Vec<SctId>> {
    let rows = store.kv().view(|txn| txn.scan_prefix(Bucket::IdxInstalledRefsets, EMPTY))?;
    Ok(rows.into_iter().filter_map(|(k, _)| keys::decode_be_id(&k)).collect())
}

/// Member item ids (UUID bytes) for a refset, optionally restricted to a
/// single referenced component, ascending.
pub fn refset_member_item_ids<S: KvStore>(
    store: &ComponentStore<S>,
    refset_id: SctId,
) -> StoreResult<Vec<(SctId, Vec<u8>)>> {
    let rows = store
        .kv()
        .view(|txn| txn.scan_prefix(Bucket::IdxRefsetItems, &keys::be_id(refset_id)))?;
    Ok(rows
        .into_iter()
        .filter_map(|(k, _)| {
            let component = keys::decode_be_id(&k[8..16])?;
            let item_id = k[16..].to_vec();
            Some((component, item_id))
        })
        .collect())
}

/// Reverse lookup: member item ids whose map target starts with
/// `target_code`, for a given refset.
pub fn refset_items_by_target<S: KvStore>(
    store: &ComponentStore<S>,
    refset_id: SctId,
    target_code: &str,
) -> StoreResult<Vec<Vec<u8>>> {
    let prefix = keys::concat(&[&keys::be_id(refset_id), target_code.as_bytes(), &[keys::TARGET_DELIMITER]]);
    let rows = store.kv().view(|txn| txn.scan_prefix(Bucket::IdxRefsetTargetItems, &prefix))?;
    Ok(rows.into_iter().map(|(k, _)| k[prefix.len()..].to_vec()).collect())
}

/// Looks up a concept by id.
pub fn get_concept<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> StoreResult<Option<Rf2Concept>> {
    store.get(&keys::be_id(id))
}

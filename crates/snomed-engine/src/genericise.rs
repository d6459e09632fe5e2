//! Genericisation: maps a concept onto the "most relevant" member of a
//! target set, and map-target reverse lookups, per spec.md §4.8.

use snomed_kv::KvStore;
use snomed_store::{index, ComponentStore, ReferenceSetItem};
use snomed_types::SctId;

use crate::semantic;
use crate::EngineResult;

/// A concept from [`genericise_to`], scored by how closely it matches the
/// target set along the concept's paths to root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredConcept {
    /// The target-set concept.
    pub concept_id: SctId,
    /// `1 - depth / path_length`, maximised across all paths to root.
    pub score: f64,
}

/// Expands `target_set` with its ancestors when `include_parents`; returns
/// target-set concepts ranked by score (descending).
///
/// Scoring: for each path from `concept_id` to root, find the first
/// (shallowest) member of the (possibly expanded) target set and award
/// `score = 1 - depth / path_length`. Per concept, the maximum score
/// across all paths is kept.
pub fn genericise_to<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
    target_set: &[SctId],
    include_parents: bool,
) -> EngineResult<Vec<ScoredConcept>> {
    let mut expanded: Vec<SctId> = target_set.to_vec();
    if include_parents {
        for &target in target_set {
            expanded.extend(semantic::all_parents(store, target)?);
        }
    }
    expanded.sort_unstable();
    expanded.dedup();

    let mut best: Vec<(SctId, f64)> = Vec::new();
    for path in semantic::paths_to_root(store, concept_id)? {
        let path_length = path.len();
        for (depth, id) in path.iter().enumerate() {
            if expanded.contains(id) {
                let score = 1.0 - (depth as f64 / path_length as f64);
                match best.iter_mut().find(|(existing_id, _)| *existing_id == *id) {
                    Some(entry) => {
                        if score > entry.1 {
                            entry.1 = score;
                        }
                    }
                    None => best.push((*id, score)),
                }
                break;
            }
        }
    }

    best.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(best
        .into_iter()
        .map(|(concept_id, score)| ScoredConcept { concept_id, score })
        .collect())
}

/// Returns the top of `genericise_to(., ., false)`, falling back to
/// `genericise_to(., ., true)` if empty; returns `0` if still empty.
pub fn genericise_to_best<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
    target_set: &[SctId],
) -> EngineResult<SctId> {
    if let Some(top) = genericise_to(store, concept_id, target_set, false)?.first() {
        return Ok(top.concept_id);
    }
    if let Some(top) = genericise_to(store, concept_id, target_set, true)?.first() {
        return Ok(top.concept_id);
    }
    Ok(0)
}

/// Finds the shortest path from `concept_id` to root containing `root`;
/// returns the concept one step below `root` on that path. Fails with
/// [`crate::EngineError::RootNotAncestor`] if `root` is not an ancestor.
pub fn genericise_to_root<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
    root: SctId,
) -> EngineResult<SctId> {
    let mut candidates: Vec<Vec<SctId>> = semantic::paths_to_root(store, concept_id)?
        .into_iter()
        .filter(|path| path.contains(&root))
        .collect();
    candidates.sort_by_key(|p| p.len());

    let shortest = candidates
        .into_iter()
        .next()
        .ok_or(crate::EngineError::RootNotAncestor)?;

    let root_position = shortest
        .iter()
        .position(|id| *id == root)
        .ok_or(crate::EngineError::RootNotAncestor)?;

    if root_position == 0 {
        return Ok(concept_id);
    }
    Ok(shortest[root_position - 1])
}

/// Reverse lookup by external map-target code: every reference set item in
/// `refset_id` whose `mapTarget` equals `target`, sorted deterministically
/// by `(mapGroup, mapPriority)` (SimpleMap entries interleave at
/// `(-1, -1)`).
pub fn map_target<S: KvStore>(
    store: &ComponentStore<S>,
    refset_id: SctId,
    target: &str,
) -> EngineResult<Vec<ReferenceSetItem>> {
    let item_ids = index::refset_items_by_target(store, refset_id, target)?;
    let mut items = Vec::with_capacity(item_ids.len());
    for item_id in item_ids {
        if let Some(item) = store.get::<ReferenceSetItem>(&item_id)? {
            items.push(item);
        }
    }
    items.sort_by(|a, b| a.map_sort_key().cmp(&b.map_sort_key()));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_kv::MemKvStore;
    use snomed_store::index::rebuild_all;
    use snomed_types::{DefinitionStatus, Rf2Concept, Rf2Relationship};

    use super::*;

    fn concept(id: SctId) -> Rf2Concept {
        Rf2Concept {
            id,
            effective_time: 20200101,
            active: true,
            module_id: 900000000000207008,
            definition_status_id: DefinitionStatus::PRIMITIVE_ID,
        }
    }

    fn is_a_rel(id: SctId, source: SctId, dest: SctId) -> Rf2Relationship {
        Rf2Relationship {
            id,
            effective_time: 20200101,
            active: true,
            module_id: 900000000000207008,
            source_id: source,
            destination_id: dest,
            relationship_group: 0,
            type_id: Rf2Relationship::IS_A_TYPE_ID,
            characteristic_type_id: 900000000000011006,
            modifier_id: 900000000000451002,
        }
    }

    fn build_fixture() -> ComponentStore<MemKvStore> {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store
            .put(&[concept(138875005), concept(404684003), concept(64572001), concept(24700007)])
            .unwrap();
        store
            .put(&[
                is_a_rel(1, 404684003, 138875005),
                is_a_rel(2, 64572001, 404684003),
                is_a_rel(3, 24700007, 64572001),
            ])
            .unwrap();
        rebuild_all(&store).unwrap();
        store
    }

    #[test]
    fn genericise_to_scores_shallowest_target_highest() {
        let store = build_fixture();
        let targets = [404684003, 64572001];
        let scored = genericise_to(&store, 24700007, &targets, false).unwrap();
        assert_eq!(scored[0].concept_id, 64572001);
    }

    #[test]
    fn genericise_to_root_returns_child_of_root() {
        let store = build_fixture();
        let result = genericise_to_root(&store, 24700007, 138875005).unwrap();
        assert_eq!(result, 404684003);
    }

    #[test]
    fn genericise_to_root_fails_when_not_ancestor() {
        let store = build_fixture();
        let err = genericise_to_root(&store, 24700007, 999999).unwrap_err();
        assert!(matches!(err, crate::EngineError::RootNotAncestor));
    }
}

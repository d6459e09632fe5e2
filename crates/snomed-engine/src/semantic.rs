//! The Semantic Engine: subsumption, transitive closures, paths to root,
//! primitive ancestor lookup, siblings, and the assembled "extended
//! concept" view. All operations are read-only and composable.

use std::collections::{HashSet, VecDeque};

use snomed_kv::KvStore;
use snomed_store::{index, ComponentStore};
use snomed_types::{CancellationToken, Rf2Concept, Rf2Relationship, SctId};

use crate::{EngineError, EngineResult};

/// SNOMED CT root concept, per spec.md §6 reserved concept IDs.
pub const ROOT_CONCEPT: SctId = 138875005;

/// The assembled view produced by [`extended_concept`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedConcept {
    /// The concept itself.
    pub concept: Rf2Concept,
    /// Every ancestor reachable via the transitive IS-A closure.
    pub all_parents: Vec<SctId>,
    /// Direct IS-A parents only.
    pub direct_parents: Vec<SctId>,
    /// Reference sets this concept is a member of.
    pub refset_memberships: Vec<SctId>,
    /// Active relationships with this concept as destination.
    pub incoming_relationships: Vec<Rf2Relationship>,
    /// The best-match description for the caller's language tags, if any.
    pub preferred_description: Option<String>,
}

fn fetch_concept<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<Rf2Concept> {
    index::get_concept(store, id)?.ok_or_else(|| EngineError::NotFound(id.to_string()))
}

/// True iff `child == ancestor` or `ancestor` is in the transitive closure
/// of `child`'s IS-A parents.
pub fn is_a<S: KvStore>(store: &ComponentStore<S>, child: SctId, ancestor: SctId) -> EngineResult<bool> {
    if child == ancestor {
        return Ok(true);
    }
    let parents = all_parents(store, child)?;
    Ok(parents.contains(&ancestor))
}

/// The transitive closure of `id`'s IS-A parents, via BFS. Guards against
/// cycles introduced by malformed input with a visited set.
pub fn all_parents<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<Vec<SctId>> {
    let mut visited: HashSet<SctId> = HashSet::new();
    let mut queue: VecDeque<SctId> = VecDeque::new();
    queue.push_back(id);
    visited.insert(id);

    let mut result = Vec::new();
    while let Some(current) = queue.pop_front() {
        for parent in index::direct_parents(store, current)? {
            if visited.insert(parent) {
                result.push(parent);
                queue.push_back(parent);
            }
        }
    }
    result.sort_unstable();
    Ok(result)
}

/// The transitive closure of `id`'s IS-A children, via BFS. Aborts with
/// [`EngineError::TooManyChildren`] once the visited set exceeds `max`, and
/// checks `cancel` at each frontier expansion.
pub fn all_children<S: KvStore>(
    store: &ComponentStore<S>,
    id: SctId,
    max: usize,
    cancel: &CancellationToken,
) -> EngineResult<Vec<SctId>> {
    let mut visited: HashSet<SctId> = HashSet::new();
    let mut queue: VecDeque<SctId> = VecDeque::new();
    queue.push_back(id);
    visited.insert(id);

    let mut result = Vec::new();
    while let Some(current) = queue.pop_front() {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        for child in index::direct_children(store, current)? {
            if visited.insert(child) {
                if visited.len() > max {
                    return Err(EngineError::TooManyChildren { limit: max });
                }
                result.push(child);
                queue.push_back(child);
            }
        }
    }
    result.sort_unstable();
    Ok(result)
}

/// Enumerates every simple path from `id` (inclusive, first element) to
/// [`ROOT_CONCEPT`] (inclusive, last element), descending the parents index.
/// A poly-hierarchy concept yields one path per distinct ancestor route.
pub fn paths_to_root<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<Vec<Vec<SctId>>> {
    let mut paths = Vec::new();
    let mut visiting = HashSet::new();
    walk_to_root(store, id, &mut vec![id], &mut paths, &mut visiting)?;
    if paths.is_empty() {
        // id has no parents at all; if it is the root itself that's a
        // trivial one-element path, otherwise it simply has no path.
        if id == ROOT_CONCEPT {
            paths.push(vec![id]);
        }
    }
    Ok(paths)
}

fn walk_to_root<S: KvStore>(
    store: &ComponentStore<S>,
    current: SctId,
    path_so_far: &mut Vec<SctId>,
    paths: &mut Vec<Vec<SctId>>,
    visiting: &mut HashSet<SctId>,
) -> EngineResult<()> {
    if current == ROOT_CONCEPT {
        paths.push(path_so_far.clone());
        return Ok(());
    }
    if !visiting.insert(current) {
        // Cycle guard: malformed input looping back on itself.
        return Ok(());
    }
    for parent in index::direct_parents(store, current)? {
        path_so_far.push(parent);
        walk_to_root(store, parent, path_so_far, paths, visiting)?;
        path_so_far.pop();
    }
    visiting.remove(&current);
    Ok(())
}

/// The minimum-length path from `id` to the root.
pub fn shortest_path_to_root<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<Vec<SctId>> {
    paths_to_root(store, id)?
        .into_iter()
        .min_by_key(|p| p.len())
        .ok_or_else(|| EngineError::NotFound(id.to_string()))
}

/// The maximum-length path from `id` to the root.
pub fn longest_path_to_root<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<Vec<SctId>> {
    paths_to_root(store, id)?
        .into_iter()
        .max_by_key(|p| p.len())
        .ok_or_else(|| EngineError::NotFound(id.to_string()))
}

/// The closest primitive ancestor of `id` by minimum path position (its own
/// index along whichever path to root reaches a primitive concept
/// soonest), or `id` itself if it is already primitive.
pub fn primitive<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<SctId> {
    let concept = fetch_concept(store, id)?;
    if concept.is_primitive() {
        return Ok(id);
    }

    let mut best: Option<(usize, SctId)> = None;
    for path in paths_to_root(store, id)? {
        for (position, ancestor) in path.iter().enumerate().skip(1) {
            let ancestor_concept = fetch_concept(store, *ancestor)?;
            if ancestor_concept.is_primitive() {
                if best.map(|(p, _)| position < p).unwrap_or(true) {
                    best = Some((position, *ancestor));
                }
                break;
            }
        }
    }
    best.map(|(_, ancestor)| ancestor)
        .ok_or(EngineError::NotFound(id.to_string()))
}

/// Children of all parents of `id`, excluding `id` itself.
pub fn siblings<S: KvStore>(store: &ComponentStore<S>, id: SctId) -> EngineResult<Vec<SctId>> {
    let mut result: HashSet<SctId> = HashSet::new();
    for parent in index::direct_parents(store, id)? {
        for child in index::direct_children(store, parent)? {
            if child != id {
                result.insert(child);
            }
        }
    }
    let mut out: Vec<SctId> = result.into_iter().collect();
    out.sort_unstable();
    Ok(out)
}

/// Assembles {Concept, allParents, directParents, refset memberships,
/// incoming parent-relationships, preferredDescription(langTags)}.
pub fn extended_concept<S: KvStore>(
    store: &ComponentStore<S>,
    id: SctId,
    lang_tags: &[String],
) -> EngineResult<ExtendedConcept> {
    let concept = fetch_concept(store, id)?;
    let all_parents = all_parents(store, id)?;
    let direct_parents = index::direct_parents(store, id)?;
    let refset_memberships = index::component_refsets(store, id)?;

    let mut incoming_relationships = Vec::new();
    for rel_id in index::incoming_relationship_ids(store, id)? {
        if let Some(rel) = store.get::<Rf2Relationship>(&snomed_kv::keys::be_id(rel_id))? {
            if rel.active {
                incoming_relationships.push(rel);
            }
        }
    }

    let preferred_description = crate::localisation::preferred_description(
        store,
        id,
        snomed_types::DescriptionType::SYNONYM_ID,
        lang_tags,
    )
    .ok()
    .map(|d| d.term);

    Ok(ExtendedConcept {
        concept,
        all_parents,
        direct_parents,
        refset_memberships,
        incoming_relationships,
        preferred_description,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_kv::MemKvStore;
    use snomed_store::index::rebuild_all;
    use snomed_types::DefinitionStatus;

    use super::*;

    fn concept(id: SctId, primitive: bool) -> Rf2Concept {
        Rf2Concept {
            id,
            effective_time: 20200101,
            active: true,
            module_id: 900000000000207008,
            definition_status_id: if primitive {
                DefinitionStatus::PRIMITIVE_ID
            } else {
                DefinitionStatus::FULLY_DEFINED_ID
            },
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
            .put(&[
                concept(ROOT_CONCEPT, true),
                concept(404684003, true),  // Clinical finding
                concept(64572001, true),   // Disease
                concept(24700007, false),  // Multiple sclerosis
            ])
            .unwrap();
        store
            .put(&[
                is_a_rel(1, 404684003, ROOT_CONCEPT),
                is_a_rel(2, 64572001, 404684003),
                is_a_rel(3, 24700007, 64572001),
            ])
            .unwrap();
        rebuild_all(&store).unwrap();
        store
    }

    #[test]
    fn is_a_holds_across_transitive_closure() {
        let store = build_fixture();
        assert!(is_a(&store, 24700007, 64572001).unwrap());
        assert!(is_a(&store, 24700007, ROOT_CONCEPT).unwrap());
        assert!(is_a(&store, 24700007, 24700007).unwrap());
        assert!(!is_a(&store, ROOT_CONCEPT, 24700007).unwrap());
    }

    #[test]
    fn paths_to_root_end_with_root() {
        let store = build_fixture();
        let paths = paths_to_root(&store, 24700007).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(*paths[0].last().unwrap(), ROOT_CONCEPT);
        assert_eq!(paths[0][0], 24700007);
    }

    #[test]
    fn primitive_returns_concept_itself_when_already_primitive() {
        let store = build_fixture();
        assert_eq!(primitive(&store, 64572001).unwrap(), 64572001);
    }

    #[test]
    fn primitive_finds_closest_primitive_ancestor() {
        let store = build_fixture();
        assert_eq!(primitive(&store, 24700007).unwrap(), 64572001);
    }

    #[test]
    fn all_children_respects_capacity_guard() {
        let store = build_fixture();
        let cancel = CancellationToken::new();
        let err = all_children(&store, ROOT_CONCEPT, 1, &cancel).unwrap_err();
        assert!(matches!(err, EngineError::TooManyChildren { limit: 1 }));
    }
}

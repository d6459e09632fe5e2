//! Normalisation: projects concepts and expressions into SNOMED's "long
//! normal form" by substituting fully-defined relationship destinations
//! with their primitive ancestors and merging attribute groups, per
//! spec.md §4.6.

use std::collections::HashSet;

use snomed_cg::{ConceptReference, Expression, Refinement, RefinementGroup};
use snomed_kv::KvStore;
use snomed_store::{index, ComponentStore};
use snomed_types::{Rf2Relationship, SctId};

use crate::semantic;
use crate::{EngineError, EngineResult};

/// Returns an Expression whose focus concept is `primitive(c)` and whose
/// refinements are the active defining relationships of `c`, after
/// substituting each relationship destination with its primitive ancestor,
/// deduplicated by (typeId, primitiveDestinationId).
pub fn normalise_concept<S: KvStore>(store: &ComponentStore<S>, concept_id: SctId) -> EngineResult<Expression> {
    let focus = semantic::primitive(store, concept_id)?;

    let mut seen: HashSet<(SctId, SctId)> = HashSet::new();
    let mut refinements = Vec::new();
    for rel_id in index::outgoing_relationship_ids(store, concept_id)? {
        let rel: Option<Rf2Relationship> =
            store.get(&snomed_kv::keys::be_id(rel_id))?;
        let Some(rel) = rel else { continue };
        if !rel.active || rel.is_is_a() {
            continue;
        }
        let primitive_destination = semantic::primitive(store, rel.destination_id)?;
        if !seen.insert((rel.type_id, primitive_destination)) {
            continue;
        }
        refinements.push(Refinement {
            name: ConceptReference::new(rel.type_id),
            value: snomed_cg::AttributeValue::Concept(ConceptReference::new(primitive_destination)),
        });
    }

    let mut expr = Expression::single(ConceptReference::new(focus));
    expr.refinements = refinements;
    Ok(expr)
}

fn values_compatible<S: KvStore>(
    store: &ComponentStore<S>,
    a: &snomed_cg::AttributeValue,
    b: &snomed_cg::AttributeValue,
) -> EngineResult<bool> {
    use snomed_cg::AttributeValue::*;
    match (a, b) {
        (Concept(a), Concept(b)) => {
            if a.id == b.id {
                return Ok(true);
            }
            Ok(semantic::is_a(store, a.id, b.id)? || semantic::is_a(store, b.id, a.id)?)
        }
        _ => Ok(a == b),
    }
}

fn groups_mergeable<S: KvStore>(
    store: &ComponentStore<S>,
    a: &RefinementGroup,
    b: &RefinementGroup,
) -> EngineResult<bool> {
    let mut any_name_match = false;
    for ra in &a.refinements {
        for rb in &b.refinements {
            if ra.name.id == rb.name.id {
                any_name_match = true;
                if !values_compatible(store, &ra.value, &rb.value)? {
                    return Ok(false);
                }
            }
        }
    }
    Ok(any_name_match)
}

/// For each focus concept of `expression`, produces its normalised form
/// and merges the results: focus concepts are unified into one set, and
/// refinement groups are merged pairwise wherever a shared attribute name
/// has subsumption-compatible values (concatenating, not deduplicating,
/// the merged refinements).
pub fn normalise<S: KvStore>(store: &ComponentStore<S>, expression: &Expression) -> EngineResult<Expression> {
    let mut focus_concepts: Vec<ConceptReference> = Vec::new();
    let mut groups: Vec<RefinementGroup> = Vec::new();

    for focus in &expression.focus_concepts {
        let normal = normalise_concept(store, focus.id)?;
        for fc in normal.focus_concepts {
            if !focus_concepts.iter().any(|existing| existing.id == fc.id) {
                focus_concepts.push(fc);
            }
        }
        if !normal.refinements.is_empty() {
            groups.push(RefinementGroup { refinements: normal.refinements });
        }
    }

    // Include the expression's own ungrouped refinements and groups as
    // additional candidate groups to merge against.
    if !expression.refinements.is_empty() {
        groups.push(RefinementGroup { refinements: expression.refinements.clone() });
    }
    groups.extend(expression.groups.iter().cloned());

    let merged = merge_groups(store, groups)?;

    let mut result = Expression::single(
        focus_concepts
            .first()
            .cloned()
            .ok_or_else(|| EngineError::NotFound("expression has no focus concepts".to_string()))?,
    );
    result.focus_concepts = focus_concepts;
    result.definition_status = expression.definition_status;
    result.groups = merged;
    Ok(result)
}

fn merge_groups<S: KvStore>(
    store: &ComponentStore<S>,
    mut groups: Vec<RefinementGroup>,
) -> EngineResult<Vec<RefinementGroup>> {
    let mut merged_any = true;
    while merged_any {
        merged_any = false;
        'outer: for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                if groups_mergeable(store, &groups[i], &groups[j])? {
                    let other = groups.remove(j);
                    groups[i].refinements.extend(other.refinements);
                    merged_any = true;
                    break 'outer;
                }
            }
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_kv::MemKvStore;
    use snomed_store::index::rebuild_all;
    use snomed_types::{DefinitionStatus, Rf2Concept};

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

    fn rel(id: SctId, source: SctId, type_id: SctId, dest: SctId) -> Rf2Relationship {
        Rf2Relationship {
            id,
            effective_time: 20200101,
            active: true,
            module_id: 900000000000207008,
            source_id: source,
            destination_id: dest,
            relationship_group: 0,
            type_id,
            characteristic_type_id: 900000000000011006,
            modifier_id: 900000000000451002,
        }
    }

    fn build_fixture() -> ComponentStore<MemKvStore> {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store
            .put(&[
                concept(138875005, true),
                concept(404684003, true),
                concept(64572001, false), // Disease, fully defined
                concept(39057004, true),  // Pulmonary valve structure (primitive)
            ])
            .unwrap();
        store
            .put(&[
                rel(1, 64572001, Rf2Relationship::IS_A_TYPE_ID, 404684003),
                rel(2, 404684003, Rf2Relationship::IS_A_TYPE_ID, 138875005),
                rel(3, 64572001, 363698007, 39057004), // finding site
            ])
            .unwrap();
        rebuild_all(&store).unwrap();
        store
    }

    #[test]
    fn normalise_concept_substitutes_primitive_destination() {
        let store = build_fixture();
        let expr = normalise_concept(&store, 64572001).unwrap();
        assert_eq!(expr.focus_concepts[0].id, 404684003);
        assert_eq!(expr.refinements.len(), 1);
        assert_eq!(expr.refinements[0].name.id, 363698007);
    }
}

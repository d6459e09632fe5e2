//! Evaluates a parsed ECL constraint against a concept under test, per
//! spec.md §4.7: `apply(expr, constraint) -> bool` against a CG
//! [`snomed_cg::Expression`].

use snomed_cg::Expression;
use snomed_kv::{keys, KvStore};
use snomed_store::{index, ComponentStore};
use snomed_types::{Rf2Relationship, SctId};

use crate::ast::{AttributeConstraint, Comparison, ExpressionConstraint, Focus, Operator, RefinementConstraint};
use crate::error::EclResult;
use crate::parser;

/// Parses `constraint` and checks it against every focus concept of `expr`;
/// all of them must satisfy it (compound expressions carry AND semantics
/// across their focus set, matching how `snomed-cg` parses `+`-joined foci).
pub fn apply<S: KvStore>(store: &ComponentStore<S>, expr: &Expression, constraint: &str) -> EclResult<bool> {
    let parsed = parser::parse(constraint)?;
    for focus in &expr.focus_concepts {
        if !evaluate(store, expr, focus.id, &parsed)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluates `constraint` against a single concept id, with `expr` supplying
/// the refinement context (attribute-value pairs) to check refinement
/// blocks against.
pub fn evaluate<S: KvStore>(
    store: &ComponentStore<S>,
    expr: &Expression,
    id: SctId,
    constraint: &ExpressionConstraint,
) -> EclResult<bool> {
    match constraint {
        ExpressionConstraint::Sub { operator, focus, refinement } => {
            if !focus_matches(store, *operator, *focus, id)? {
                return Ok(false);
            }
            if let Some(refinement) = refinement {
                return check_refinement(store, id, refinement);
            }
            Ok(true)
        }
        ExpressionConstraint::Refset(refset_id) => Ok(index::component_refsets(store, id)?.contains(refset_id)),
        ExpressionConstraint::And(a, b) => Ok(evaluate(store, expr, id, a)? && evaluate(store, expr, id, b)?),
        ExpressionConstraint::Or(a, b) => Ok(evaluate(store, expr, id, a)? || evaluate(store, expr, id, b)?),
        ExpressionConstraint::Minus(a, b) => Ok(evaluate(store, expr, id, a)? && !evaluate(store, expr, id, b)?),
    }
}

fn focus_matches<S: KvStore>(store: &ComponentStore<S>, operator: Operator, focus: Focus, id: SctId) -> EclResult<bool> {
    let Focus::Concept(target) = focus else {
        return Ok(true);
    };
    Ok(match operator {
        Operator::SelfOnly => id == target,
        Operator::DescendantOf => id != target && snomed_engine::semantic::is_a(store, id, target)?,
        Operator::DescendantOrSelfOf => snomed_engine::semantic::is_a(store, id, target)?,
        Operator::AncestorOf => id != target && snomed_engine::semantic::is_a(store, target, id)?,
        Operator::AncestorOrSelfOf => snomed_engine::semantic::is_a(store, target, id)?,
    })
}

fn check_refinement<S: KvStore>(store: &ComponentStore<S>, id: SctId, refinement: &RefinementConstraint) -> EclResult<bool> {
    for attr in &refinement.attributes {
        if !attribute_matches(store, id, attr)? {
            return Ok(false);
        }
    }
    for group in &refinement.groups {
        for attr in group {
            if !attribute_matches(store, id, attr)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn count_in_range(count: usize, cardinality: &Option<crate::ast::Cardinality>) -> bool {
    match cardinality {
        None => count >= 1,
        Some(c) => {
            let within_min = count as u32 >= c.min;
            let within_max = c.max.map(|max| count as u32 <= max).unwrap_or(true);
            within_min && within_max
        }
    }
}

fn attribute_matches<S: KvStore>(store: &ComponentStore<S>, id: SctId, attr: &AttributeConstraint) -> EclResult<bool> {
    if attr.reverse {
        return reverse_attribute_matches(store, id, attr);
    }

    let mut matches = 0usize;
    for rel_id in index::outgoing_relationship_ids(store, id)? {
        let Some(rel): Option<Rf2Relationship> = store.get(&keys::be_id(rel_id))? else {
            continue;
        };
        if !rel.active {
            continue;
        }
        if !concept_focus_matches(store, &attr.name, rel.type_id)? {
            continue;
        }
        let value_matches = concept_focus_matches(store, &attr.value, rel.destination_id)?;
        let holds = match attr.comparison {
            Comparison::Equals => value_matches,
            Comparison::NotEquals => !value_matches,
        };
        if holds {
            matches += 1;
        }
    }
    Ok(count_in_range(matches, &attr.cardinality))
}

/// `R` refinement: checks `id`'s *incoming* relationships — some other
/// concept's outgoing relationship of the constrained type points at `id`.
fn reverse_attribute_matches<S: KvStore>(
    store: &ComponentStore<S>,
    id: SctId,
    attr: &AttributeConstraint,
) -> EclResult<bool> {
    let mut matches = 0usize;
    for rel_id in index::incoming_relationship_ids(store, id)? {
        let Some(rel): Option<Rf2Relationship> = store.get(&keys::be_id(rel_id))? else {
            continue;
        };
        if !rel.active {
            continue;
        }
        if !concept_focus_matches(store, &attr.name, rel.type_id)? {
            continue;
        }
        let value_matches = concept_focus_matches(store, &attr.value, rel.source_id)?;
        let holds = match attr.comparison {
            Comparison::Equals => value_matches,
            Comparison::NotEquals => !value_matches,
        };
        if holds {
            matches += 1;
        }
    }
    Ok(count_in_range(matches, &attr.cardinality))
}

/// Whether `candidate` satisfies a sub-expression constraint used as an
/// attribute name or value (these never carry their own refinement block in
/// practice, so only the focus/operator is checked).
fn concept_focus_matches<S: KvStore>(store: &ComponentStore<S>, constraint: &ExpressionConstraint, candidate: SctId) -> EclResult<bool> {
    match constraint {
        ExpressionConstraint::Sub { operator, focus, .. } => focus_matches(store, *operator, *focus, candidate),
        ExpressionConstraint::Refset(refset_id) => Ok(index::component_refsets(store, candidate)?.contains(refset_id)),
        ExpressionConstraint::And(a, b) => {
            Ok(concept_focus_matches(store, a, candidate)? && concept_focus_matches(store, b, candidate)?)
        }
        ExpressionConstraint::Or(a, b) => {
            Ok(concept_focus_matches(store, a, candidate)? || concept_focus_matches(store, b, candidate)?)
        }
        ExpressionConstraint::Minus(a, b) => {
            Ok(concept_focus_matches(store, a, candidate)? && !concept_focus_matches(store, b, candidate)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_cg::parse as parse_cg;
    use snomed_kv::MemKvStore;
    use snomed_store::index::rebuild_all;
    use snomed_types::{DefinitionStatus, Rf2Concept};

    use super::*;

    fn concept(id: SctId) -> Rf2Concept {
        Rf2Concept {
            id,
            effective_time: 20020131,
            active: true,
            module_id: 900000000000207008,
            definition_status_id: DefinitionStatus::PRIMITIVE_ID,
        }
    }

    fn is_a_rel(id: SctId, source: SctId, dest: SctId) -> Rf2Relationship {
        Rf2Relationship {
            id,
            effective_time: 20020131,
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

    fn attr_rel(id: SctId, source: SctId, type_id: SctId, dest: SctId, group: u16) -> Rf2Relationship {
        Rf2Relationship {
            id,
            effective_time: 20020131,
            active: true,
            module_id: 900000000000207008,
            source_id: source,
            destination_id: dest,
            relationship_group: group,
            type_id,
            characteristic_type_id: 900000000000011006,
            modifier_id: 900000000000451002,
        }
    }

    // 138875005 (root) <- 404684003 (Clinical finding) <- 73211009 (Diabetes
    // mellitus) <- { 46635009 (type 1), 44054006 (type 2) }; plus 22298006
    // (Myocardial infarction) under 404684003. Mirrors the teacher's ECL
    // fixture hierarchy.
    fn build_fixture() -> ComponentStore<MemKvStore> {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store
            .put(&[
                concept(138875005),
                concept(404684003),
                concept(73211009),
                concept(46635009),
                concept(44054006),
                concept(22298006),
                concept(39057004), // Pulmonary valve structure (finding site)
            ])
            .unwrap();
        store
            .put(&[
                is_a_rel(1, 404684003, 138875005),
                is_a_rel(2, 73211009, 404684003),
                is_a_rel(3, 46635009, 73211009),
                is_a_rel(4, 44054006, 73211009),
                is_a_rel(5, 22298006, 404684003),
                attr_rel(6, 22298006, 363698007, 39057004, 1), // finding site
            ])
            .unwrap();
        rebuild_all(&store).unwrap();
        store
    }

    fn expr_for(id: SctId) -> Expression {
        parse_cg(&id.to_string()).unwrap()
    }

    #[test]
    fn descendant_of_excludes_self() {
        let store = build_fixture();
        let expr = expr_for(73211009);
        assert!(!apply(&store, &expr, "< 73211009").unwrap());
        let expr = expr_for(46635009);
        assert!(apply(&store, &expr, "< 73211009").unwrap());
    }

    #[test]
    fn descendant_or_self_includes_self() {
        let store = build_fixture();
        let expr = expr_for(73211009);
        assert!(apply(&store, &expr, "<< 73211009").unwrap());
    }

    #[test]
    fn ancestor_or_self_matches_upward() {
        let store = build_fixture();
        let expr = expr_for(404684003);
        assert!(apply(&store, &expr, ">> 46635009").unwrap());
        let expr = expr_for(22298006);
        assert!(!apply(&store, &expr, ">> 46635009").unwrap());
    }

    #[test]
    fn compound_and_and_minus() {
        let store = build_fixture();
        let expr = expr_for(46635009);
        assert!(apply(&store, &expr, "<< 404684003 AND << 73211009").unwrap());
        assert!(!apply(&store, &expr, "<< 404684003 MINUS << 73211009").unwrap());

        let expr = expr_for(22298006);
        assert!(apply(&store, &expr, "<< 404684003 MINUS << 73211009").unwrap());
    }

    #[test]
    fn wildcard_focus_matches_anything() {
        let store = build_fixture();
        let expr = expr_for(46635009);
        assert!(apply(&store, &expr, "*").unwrap());
    }

    #[test]
    fn refinement_checks_attribute_value() {
        let store = build_fixture();
        let expr = expr_for(22298006);
        assert!(apply(&store, &expr, "< 138875005 : 363698007 = 39057004").unwrap());
        assert!(!apply(&store, &expr, "< 138875005 : 363698007 = 46635009").unwrap());
    }

    #[test]
    fn reverse_refinement_checks_incoming_relationship() {
        let store = build_fixture();
        let expr = expr_for(39057004);
        assert!(apply(&store, &expr, "< 138875005 : R 363698007 = 22298006").unwrap());
    }

    #[test]
    fn syntax_error_propagates() {
        let store = build_fixture();
        let expr = expr_for(73211009);
        assert!(apply(&store, &expr, "wibble wobble").is_err());
    }
}

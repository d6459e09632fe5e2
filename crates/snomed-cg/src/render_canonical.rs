//! The Canonical renderer: a normal form used for structural equality.
//!
//! (a) omits all terms; (b) sorts focus concepts ascending by id, joined
//! with `+`; (c) sorts refinements by refinement concept id, then by value;
//! (d) sorts refinements within each group, then sorts groups
//! lexicographically by their rendered content; (e) emits the definition
//! status prefix only when the source expression carried an explicit one.

use std::cmp::Ordering;

use crate::ast::{AttributeValue, ConceptReference, DefinitionStatus, Expression, Refinement, RefinementGroup};

/// Renders `expr` in canonical form.
pub fn render(expr: &Expression) -> String {
    let mut out = String::new();
    match expr.definition_status {
        DefinitionStatus::Default => {}
        DefinitionStatus::SubtypeOf => out.push_str("<<<"),
        DefinitionStatus::EquivalentTo => out.push_str("==="),
    }

    let mut focus_ids: Vec<_> = expr.focus_concepts.iter().map(|c| c.id).collect();
    focus_ids.sort_unstable();
    let focus_str: Vec<String> = focus_ids.iter().map(|id| id.to_string()).collect();
    out.push_str(&focus_str.join("+"));

    let mut refinements = expr.refinements.clone();
    refinements.sort_by(compare_refinements);

    let mut group_strings: Vec<String> = expr
        .groups
        .iter()
        .map(render_group)
        .collect();
    group_strings.sort();

    if !refinements.is_empty() || !group_strings.is_empty() {
        out.push(':');
        let mut parts: Vec<String> = refinements.iter().map(render_refinement).collect();
        parts.extend(group_strings);
        out.push_str(&parts.join(","));
    }

    out
}

/// Canonical render, ASCII-lowercased, used by [`crate::equal`].
pub fn render_fold_case(expr: &Expression) -> String {
    render(expr).to_ascii_lowercase()
}

fn render_group(group: &RefinementGroup) -> String {
    let mut refinements = group.refinements.clone();
    refinements.sort_by(compare_refinements);
    let parts: Vec<String> = refinements.iter().map(render_refinement).collect();
    format!("{{{}}}", parts.join(","))
}

fn render_concept_ref(c: &ConceptReference) -> String {
    c.id.to_string()
}

fn render_refinement(r: &Refinement) -> String {
    format!("{}={}", render_concept_ref(&r.name), render_value(&r.value))
}

fn render_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Concept(c) => render_concept_ref(c),
        AttributeValue::StringValue(s) => format!("\"{s}\""),
        AttributeValue::IntValue(i) => format!("#{i}"),
        AttributeValue::DecimalValue(d) => format!("#{d:?}"),
        AttributeValue::Nested(e) => format!("({})", render(e)),
    }
}

fn value_rank(value: &AttributeValue) -> u8 {
    match value {
        AttributeValue::Concept(_) => 0,
        AttributeValue::StringValue(_) => 1,
        AttributeValue::IntValue(_) => 2,
        AttributeValue::DecimalValue(_) => 3,
        AttributeValue::Nested(_) => 4,
    }
}

fn compare_values(a: &AttributeValue, b: &AttributeValue) -> Ordering {
    let rank = value_rank(a).cmp(&value_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (AttributeValue::Concept(x), AttributeValue::Concept(y)) => x.id.cmp(&y.id),
        (AttributeValue::StringValue(x), AttributeValue::StringValue(y)) => x.cmp(y),
        (AttributeValue::IntValue(x), AttributeValue::IntValue(y)) => x.cmp(y),
        (AttributeValue::DecimalValue(x), AttributeValue::DecimalValue(y)) => x.total_cmp(y),
        (AttributeValue::Nested(x), AttributeValue::Nested(y)) => render(x).cmp(&render(y)),
        _ => Ordering::Equal,
    }
}

fn compare_refinements(a: &Refinement, b: &Refinement) -> Ordering {
    a.name.id.cmp(&b.name.id).then_with(|| compare_values(&a.value, &b.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn canonical_sorts_and_strips_terms() {
        let expr = parse("73211009 |Diabetes mellitus|").unwrap();
        assert_eq!(render(&expr), "73211009");
    }

    #[test]
    fn canonical_preserves_explicit_subtype_of_prefix() {
        let expr = parse("<<< 73211009: 363698007 = 113331007").unwrap();
        assert_eq!(render(&expr), "<<<73211009:363698007=113331007");
    }

    #[test]
    fn canonical_is_order_independent_over_compound_focus_and_refinements() {
        let a = parse("46866001+428881005:116676008=72704001,363698007=12611008").unwrap();
        let b = parse("428881005+46866001:363698007=12611008,116676008=72704001").unwrap();
        assert_eq!(render(&a), render(&b));
    }

    #[test]
    fn canonical_is_idempotent() {
        let expr = parse("46866001+428881005:116676008=72704001,363698007=12611008").unwrap();
        let once = render(&expr);
        let twice = render(&parse(&once).unwrap());
        assert_eq!(once, twice);
    }
}

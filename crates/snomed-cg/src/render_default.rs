//! The Default renderer: preserves focus-concept ordering and source terms,
//! and emits whitespace for readability.

use crate::ast::{AttributeValue, ConceptReference, DefinitionStatus, Expression, Refinement};

/// Renders `expr` the way it was authored: original focus-concept order,
/// terms kept, refinements and groups in AST order, spaced for readability.
pub fn render(expr: &Expression) -> String {
    let mut out = String::new();
    match expr.definition_status {
        DefinitionStatus::Default => {}
        DefinitionStatus::SubtypeOf => out.push_str("<<< "),
        DefinitionStatus::EquivalentTo => out.push_str("=== "),
    }

    let focus: Vec<String> = expr.focus_concepts.iter().map(render_concept_ref).collect();
    out.push_str(&focus.join(" + "));

    if !expr.refinements.is_empty() || !expr.groups.is_empty() {
        out.push_str(": ");
        let mut parts = Vec::new();
        for r in &expr.refinements {
            parts.push(render_refinement(r));
        }
        for g in &expr.groups {
            let inner: Vec<String> = g.refinements.iter().map(render_refinement).collect();
            parts.push(format!("{{ {} }}", inner.join(", ")));
        }
        out.push_str(&parts.join(", "));
    }

    out
}

fn render_concept_ref(c: &ConceptReference) -> String {
    match &c.term {
        Some(term) => format!("{} |{}|", c.id, term),
        None => c.id.to_string(),
    }
}

fn render_refinement(r: &Refinement) -> String {
    let mut out = render_concept_ref(&r.name);
    out.push('=');
    out.push_str(&render_value(&r.value));
    out
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trips_term_and_spacing() {
        let expr = parse("73211009 |Diabetes mellitus|").unwrap();
        assert_eq!(render(&expr), "73211009 |Diabetes mellitus|");
    }

    #[test]
    fn renders_refinement_with_spacing() {
        let expr = parse("83152002:405815000=122456005").unwrap();
        assert_eq!(render(&expr), "83152002: 405815000=122456005");
    }
}

//! The Updating renderer: like `snomed_cg::render_default`, but replaces
//! each `ConceptReference`'s term with the concept's current preferred
//! synonym in the caller's language tags. Lives here rather than in
//! `snomed-cg` because it needs a live localisation lookup.

use std::fmt::Write as _;

use snomed_cg::{AttributeValue, ConceptReference, DefinitionStatus, Expression, Refinement};
use snomed_kv::KvStore;
use snomed_store::ComponentStore;
use snomed_types::DescriptionType;

use crate::localisation;

fn resolve_term<S: KvStore>(store: &ComponentStore<S>, id: snomed_types::SctId, lang_tags: &[String]) -> Option<String> {
    localisation::preferred_description(store, id, DescriptionType::SYNONYM_ID, lang_tags)
        .ok()
        .map(|d| d.term)
}

fn render_concept_ref<S: KvStore>(store: &ComponentStore<S>, c: &ConceptReference, lang_tags: &[String]) -> String {
    match resolve_term(store, c.id, lang_tags) {
        Some(term) => format!("{} |{}|", c.id, term),
        None => c.id.to_string(),
    }
}

fn render_value<S: KvStore>(store: &ComponentStore<S>, value: &AttributeValue, lang_tags: &[String]) -> String {
    match value {
        AttributeValue::Concept(c) => render_concept_ref(store, c, lang_tags),
        AttributeValue::StringValue(s) => format!("\"{s}\""),
        AttributeValue::IntValue(i) => format!("#{i}"),
        AttributeValue::DecimalValue(d) => {
            let mut s = String::new();
            let _ = write!(s, "#{d}");
            s
        }
        AttributeValue::Nested(e) => format!("({})", render(store, e, lang_tags)),
    }
}

fn render_refinement<S: KvStore>(store: &ComponentStore<S>, r: &Refinement, lang_tags: &[String]) -> String {
    let mut out = render_concept_ref(store, &r.name, lang_tags);
    out.push('=');
    out.push_str(&render_value(store, &r.value, lang_tags));
    out
}

/// Renders `expr` with focus-concept ordering and structure preserved, but
/// every concept reference's term replaced by the current preferred
/// synonym for `lang_tags`. A concept with no resolvable description
/// renders bare (no `|term|`).
pub fn render<S: KvStore>(store: &ComponentStore<S>, expr: &Expression, lang_tags: &[String]) -> String {
    let mut out = String::new();
    match expr.definition_status {
        DefinitionStatus::Default => {}
        DefinitionStatus::SubtypeOf => out.push_str("<<< "),
        DefinitionStatus::EquivalentTo => out.push_str("=== "),
    }

    let focus: Vec<String> = expr
        .focus_concepts
        .iter()
        .map(|c| render_concept_ref(store, c, lang_tags))
        .collect();
    out.push_str(&focus.join(" + "));

    if !expr.refinements.is_empty() || !expr.groups.is_empty() {
        out.push_str(": ");
        let mut parts = Vec::new();
        for r in &expr.refinements {
            parts.push(render_refinement(store, r, lang_tags));
        }
        for g in &expr.groups {
            let inner: Vec<String> = g.refinements.iter().map(|r| render_refinement(store, r, lang_tags)).collect();
            parts.push(format!("{{ {} }}", inner.join(", ")));
        }
        out.push_str(&parts.join(", "));
    }

    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_cg::parse;
    use snomed_kv::MemKvStore;
    use snomed_store::index::rebuild_all;
    use snomed_types::{DefinitionStatus as ConceptDefStatus, Rf2Concept, Rf2Description};

    use super::*;

    fn build_fixture() -> ComponentStore<MemKvStore> {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store
            .put(&[Rf2Concept {
                id: 73211009,
                effective_time: 20020131,
                active: true,
                module_id: 900000000000207008,
                definition_status_id: ConceptDefStatus::PRIMITIVE_ID,
            }])
            .unwrap();
        store
            .put(&[Rf2Description {
                id: 1,
                effective_time: 20020131,
                active: true,
                module_id: 900000000000207008,
                concept_id: 73211009,
                language_code: "en".to_string(),
                type_id: DescriptionType::SYNONYM_ID,
                term: "Diabetes mellitus".to_string(),
                case_significance_id: 900000000000448009,
            }])
            .unwrap();
        rebuild_all(&store).unwrap();
        store
    }

    #[test]
    fn updating_renderer_fills_in_current_preferred_term() {
        let store = build_fixture();
        let expr = parse("73211009").unwrap();
        let lang_tags = vec!["en".to_string()];
        assert_eq!(render(&store, &expr, &lang_tags), "73211009 |Diabetes mellitus|");
    }

    #[test]
    fn updating_renderer_renders_bare_when_no_description_found() {
        let store = build_fixture();
        let expr = parse("999999").unwrap();
        let lang_tags = vec!["en".to_string()];
        assert_eq!(render(&store, &expr, &lang_tags), "999999");
    }
}

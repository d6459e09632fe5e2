//! Localisation: picks the best description for a concept given preferred
//! language tags, per the five-step algorithm in spec.md §4.4.

use snomed_kv::{keys, KvStore};
use snomed_store::{index, ComponentStore, ReferenceSetItem};
use snomed_types::refset::well_known_refsets;
use snomed_types::{Rf2Description, Rf2LanguageRefsetMember, SctId};

use crate::{EngineError, EngineResult};

/// Well-known language reference sets this workspace recognises, paired
/// with the BCP-47-ish tag they represent. Distributions may install
/// neither, either, or both.
const KNOWN_LANGUAGE_REFSETS: &[(SctId, &str)] = &[
    (well_known_refsets::US_ENGLISH_LANG_REFSET, "en-US"),
    (well_known_refsets::GB_ENGLISH_LANG_REFSET, "en-GB"),
];

/// A thin newtype over a BCP-47-ish language tag (`en`, `en-GB`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Wraps a raw tag string.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn primary_subtag(&self) -> &str {
        primary_subtag_of(&self.0)
    }

    /// Case-insensitive match against `candidate`, first by full tag, then
    /// falling back to a bare primary-subtag comparison (`en-GB` matches an
    /// installed refset tagged `en-GB`, then falls back to bare `en`).
    pub fn matches(&self, candidate: &str) -> bool {
        if self.0.eq_ignore_ascii_case(candidate) {
            return true;
        }
        self.primary_subtag()
            .eq_ignore_ascii_case(primary_subtag_of(candidate))
    }
}

fn primary_subtag_of(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

fn select_refset(tags: &[LanguageTag], installed: &[(SctId, &str)]) -> Option<SctId> {
    for tag in tags {
        for (id, refset_tag) in installed {
            if tag.as_str().eq_ignore_ascii_case(refset_tag) {
                return Some(*id);
            }
        }
    }
    for tag in tags {
        for (id, refset_tag) in installed {
            if tag.matches(refset_tag) {
                return Some(*id);
            }
        }
    }
    None
}

fn lookup_language_member<S: KvStore>(
    store: &ComponentStore<S>,
    refset_id: SctId,
    description_id: SctId,
) -> EngineResult<Option<Rf2LanguageRefsetMember>> {
    for (component_id, item_id) in index::refset_member_item_ids(store, refset_id)? {
        if component_id != description_id {
            continue;
        }
        if let Some(ReferenceSetItem::Language(member)) = store.get::<ReferenceSetItem>(&item_id)? {
            return Ok(Some(member));
        }
    }
    Ok(None)
}

/// Chooses the best description of `description_type` for `concept_id`
/// given a caller's ordered language-tag preferences.
pub fn preferred_description<S: KvStore>(
    store: &ComponentStore<S>,
    concept_id: SctId,
    description_type: SctId,
    lang_tags: &[String],
) -> EngineResult<Rf2Description> {
    let description_ids = index::concept_descriptions(store, concept_id)?;
    let mut descriptions = Vec::new();
    for id in description_ids {
        if let Some(desc) = store.get::<Rf2Description>(&keys::be_id(id))? {
            if desc.active && desc.type_id == description_type {
                descriptions.push(desc);
            }
        }
    }
    if descriptions.is_empty() {
        return Err(EngineError::NoDescription);
    }

    let tags: Vec<LanguageTag> = lang_tags.iter().map(LanguageTag::new).collect();

    // Step 1: installed language refsets.
    let installed = index::installed_refsets(store)?;
    let installed_language_refsets: Vec<(SctId, &'static str)> = KNOWN_LANGUAGE_REFSETS
        .iter()
        .copied()
        .filter(|(id, _)| installed.contains(id))
        .collect();

    // Step 2 + 3: refset-driven preferred match.
    if let Some(refset_id) = select_refset(&tags, &installed_language_refsets) {
        for desc in &descriptions {
            if let Some(member) = lookup_language_member(store, refset_id, desc.id)? {
                if member.active && member.is_preferred() {
                    return Ok(desc.clone());
                }
            }
        }
    }

    // Step 4: simple language match, deterministic by languageCode then tag order.
    let mut sorted = descriptions;
    sorted.sort_by(|a, b| a.language_code.cmp(&b.language_code));
    for tag in &tags {
        if let Some(found) = sorted.iter().find(|d| tag.matches(&d.language_code)) {
            return Ok(found.clone());
        }
    }

    // Step 5.
    Err(EngineError::NoDescription)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snomed_kv::MemKvStore;
    use snomed_store::index::rebuild_all;
    use snomed_types::{DefinitionStatus, DescriptionType, Rf2Concept};
    use uuid::Uuid;

    use super::*;

    fn build_fixture() -> ComponentStore<MemKvStore> {
        let store = ComponentStore::new(Arc::new(MemKvStore::new()));
        store
            .put(&[Rf2Concept {
                id: 73211009,
                effective_time: 20020131,
                active: true,
                module_id: 900000000000207008,
                definition_status_id: DefinitionStatus::FULLY_DEFINED_ID,
            }])
            .unwrap();
        store
            .put(&[
                Rf2Description {
                    id: 1,
                    effective_time: 20020131,
                    active: true,
                    module_id: 900000000000207008,
                    concept_id: 73211009,
                    language_code: "en".to_string(),
                    type_id: DescriptionType::SYNONYM_ID,
                    term: "Diabetes mellitus".to_string(),
                    case_significance_id: 900000000000448009,
                },
                Rf2Description {
                    id: 2,
                    effective_time: 20020131,
                    active: true,
                    module_id: 900000000000207008,
                    concept_id: 73211009,
                    language_code: "en".to_string(),
                    type_id: DescriptionType::SYNONYM_ID,
                    term: "Sugar diabetes".to_string(),
                    case_significance_id: 900000000000448009,
                },
            ])
            .unwrap();
        store
            .put(&[ReferenceSetItem::Language(Rf2LanguageRefsetMember {
                id: Uuid::from_u128(1),
                effective_time: 20020131,
                active: true,
                module_id: 900000000000207008,
                refset_id: well_known_refsets::GB_ENGLISH_LANG_REFSET,
                referenced_component_id: 2,
                acceptability_id: Rf2LanguageRefsetMember::PREFERRED_ID,
            })])
            .unwrap();
        rebuild_all(&store).unwrap();
        store
    }

    #[test]
    fn refset_driven_preferred_match_wins() {
        let store = build_fixture();
        let tags = vec!["en-GB".to_string()];
        let desc = preferred_description(&store, 73211009, DescriptionType::SYNONYM_ID, &tags).unwrap();
        assert_eq!(desc.id, 2);
    }

    #[test]
    fn falls_back_to_simple_language_match_without_installed_refset() {
        let store = build_fixture();
        // fr has no installed refset and no matching description, should fail
        let tags = vec!["fr".to_string()];
        let err = preferred_description(&store, 73211009, DescriptionType::SYNONYM_ID, &tags).unwrap_err();
        assert!(matches!(err, EngineError::NoDescription));
    }

    #[test]
    fn falls_back_to_bare_language_code() {
        let store = build_fixture();
        let tags = vec!["en-AU".to_string()];
        let desc = preferred_description(&store, 73211009, DescriptionType::SYNONYM_ID, &tags).unwrap();
        // No installed refset matches en-AU, and the language refset path
        // requires an installed refset; simple match falls back to the
        // ascending-sorted first "en" description.
        assert_eq!(desc.language_code, "en");
        assert_eq!(desc.id, 1);
    }
}

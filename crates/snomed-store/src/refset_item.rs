//! A reference-set payload polymorphism modeled as a tagged variant, per the
//! different RF2 refset row shapes (`snomed-types::refset`).

use serde::{Deserialize, Serialize};
use snomed_types::{
    Rf2AssociationRefsetMember, Rf2ComplexMapMember, Rf2LanguageRefsetMember,
    Rf2SimpleMapMember, Rf2SimpleRefsetMember, SctId,
};
use uuid::Uuid;

/// A single reference set member row, regardless of its refset's payload
/// shape. Keyed in the Component Store by its UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReferenceSetItem {
    /// Plain membership, no extra payload.
    Simple(Rf2SimpleRefsetMember),
    /// Preferred/acceptable term membership for a language dialect.
    Language(Rf2LanguageRefsetMember),
    /// A historical or cross-reference association between two components.
    Association(Rf2AssociationRefsetMember),
    /// A single-target map entry.
    SimpleMap(Rf2SimpleMapMember),
    /// A grouped, prioritised map entry with applicability rules.
    ComplexMap(Rf2ComplexMapMember),
}

impl ReferenceSetItem {
    /// The member's own UUID, used as its Component Store key.
    pub fn id(&self) -> Uuid {
        match self {
            ReferenceSetItem::Simple(m) => m.id,
            ReferenceSetItem::Language(m) => m.id,
            ReferenceSetItem::Association(m) => m.id,
            ReferenceSetItem::SimpleMap(m) => m.id,
            ReferenceSetItem::ComplexMap(m) => m.id,
        }
    }

    /// Effective time (YYYYMMDD), used for upsert-by-effective-time ordering.
    pub fn effective_time(&self) -> u32 {
        match self {
            ReferenceSetItem::Simple(m) => m.effective_time,
            ReferenceSetItem::Language(m) => m.effective_time,
            ReferenceSetItem::Association(m) => m.effective_time,
            ReferenceSetItem::SimpleMap(m) => m.effective_time,
            ReferenceSetItem::ComplexMap(m) => m.effective_time,
        }
    }

    /// Whether this membership is currently active.
    pub fn active(&self) -> bool {
        match self {
            ReferenceSetItem::Simple(m) => m.active,
            ReferenceSetItem::Language(m) => m.active,
            ReferenceSetItem::Association(m) => m.active,
            ReferenceSetItem::SimpleMap(m) => m.active,
            ReferenceSetItem::ComplexMap(m) => m.active,
        }
    }

    /// The reference set this member belongs to.
    pub fn refset_id(&self) -> SctId {
        match self {
            ReferenceSetItem::Simple(m) => m.refset_id,
            ReferenceSetItem::Language(m) => m.refset_id,
            ReferenceSetItem::Association(m) => m.refset_id,
            ReferenceSetItem::SimpleMap(m) => m.refset_id,
            ReferenceSetItem::ComplexMap(m) => m.refset_id,
        }
    }

    /// The component this member refers to.
    pub fn referenced_component_id(&self) -> SctId {
        match self {
            ReferenceSetItem::Simple(m) => m.referenced_component_id,
            ReferenceSetItem::Language(m) => m.referenced_component_id,
            ReferenceSetItem::Association(m) => m.referenced_component_id,
            ReferenceSetItem::SimpleMap(m) => m.referenced_component_id,
            ReferenceSetItem::ComplexMap(m) => m.referenced_component_id,
        }
    }

    /// The external map target code, for map refset kinds only.
    pub fn map_target(&self) -> Option<&str> {
        match self {
            ReferenceSetItem::SimpleMap(m) => Some(&m.map_target),
            ReferenceSetItem::ComplexMap(m) => Some(&m.map_target),
            _ => None,
        }
    }

    /// `(mapGroup, mapPriority)` sort key used by `map_target` lookups.
    /// SimpleMap entries sort first regardless of ComplexMap group/priority
    /// values, per spec: "SimpleMap entries interleave at group=-1,
    /// priority=-1".
    pub fn map_sort_key(&self) -> (i32, i32) {
        match self {
            ReferenceSetItem::ComplexMap(m) => (m.map_group as i32, m.map_priority as i32),
            ReferenceSetItem::SimpleMap(_) => (-1, -1),
            _ => (-1, -1),
        }
    }
}

//! Named buckets. Every typed table the Component Store and Index Layer use
//! is enumerated here so a backend can map each one to its own table.

/// A closed set of logical tables within the KV store.
///
/// Component Store buckets hold one row per component, keyed by its 8-byte
/// big-endian SCTID (or, for reference set members, its UUID bytes). Index
/// buckets hold compound keys with an empty payload; see `snomed-store::index`
/// for the exact key shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// Concept rows, keyed by concept id.
    Concepts,
    /// Description rows, keyed by description id.
    Descriptions,
    /// Relationship rows, keyed by relationship id.
    Relationships,
    /// Reference set member rows, keyed by member UUID.
    RefsetItems,
    /// Concrete-domain relationship rows, keyed by relationship id.
    ConcreteRelationships,
    /// OWL axiom/ontology reference set member rows, keyed by member id.
    OwlExpressions,

    /// `conceptId ‖ descriptionId` -> enumerate descriptions for a concept.
    IdxConceptDescriptions,
    /// `sourceId ‖ relId` -> enumerate outgoing relationships.
    IdxConceptParentRels,
    /// `destId ‖ relId` -> enumerate incoming relationships.
    IdxConceptChildRels,
    /// `childId ‖ parentId` -> direct IS-A parents (active only).
    IdxConceptParents,
    /// `parentId ‖ childId` -> direct IS-A children (active only).
    IdxConceptChildren,
    /// `componentId ‖ refsetId` -> refset membership.
    IdxComponentRefsets,
    /// `refsetId ‖ componentId ‖ itemId` -> enumerate refset members.
    IdxRefsetItems,
    /// `refsetId ‖ targetCode ‖ SPACE ‖ itemId` -> reverse lookup by external code.
    IdxRefsetTargetItems,
    /// `refsetId` -> membership sentinel.
    IdxInstalledRefsets,
}

impl Bucket {
    /// All buckets, in a stable order. Used by backends to pre-create tables
    /// and by the Index Layer to clear-and-rebuild every index bucket.
    pub const ALL: &'static [Bucket] = &[
        Bucket::Concepts,
        Bucket::Descriptions,
        Bucket::Relationships,
        Bucket::RefsetItems,
        Bucket::ConcreteRelationships,
        Bucket::OwlExpressions,
        Bucket::IdxConceptDescriptions,
        Bucket::IdxConceptParentRels,
        Bucket::IdxConceptChildRels,
        Bucket::IdxConceptParents,
        Bucket::IdxConceptChildren,
        Bucket::IdxComponentRefsets,
        Bucket::IdxRefsetItems,
        Bucket::IdxRefsetTargetItems,
        Bucket::IdxInstalledRefsets,
    ];

    /// All index buckets (the ones rebuilt wholesale by the Index Layer).
    pub const INDICES: &'static [Bucket] = &[
        Bucket::IdxConceptDescriptions,
        Bucket::IdxConceptParentRels,
        Bucket::IdxConceptChildRels,
        Bucket::IdxConceptParents,
        Bucket::IdxConceptChildren,
        Bucket::IdxComponentRefsets,
        Bucket::IdxRefsetItems,
        Bucket::IdxRefsetTargetItems,
        Bucket::IdxInstalledRefsets,
    ];

    /// Stable string name, used as the redb table name.
    pub fn name(self) -> &'static str {
        match self {
            Bucket::Concepts => "concepts",
            Bucket::Descriptions => "descriptions",
            Bucket::Relationships => "relationships",
            Bucket::RefsetItems => "refset_items",
            Bucket::ConcreteRelationships => "concrete_relationships",
            Bucket::OwlExpressions => "owl_expressions",
            Bucket::IdxConceptDescriptions => "idx_concept_descriptions",
            Bucket::IdxConceptParentRels => "idx_concept_parent_rels",
            Bucket::IdxConceptChildRels => "idx_concept_child_rels",
            Bucket::IdxConceptParents => "idx_concept_parents",
            Bucket::IdxConceptChildren => "idx_concept_children",
            Bucket::IdxComponentRefsets => "idx_component_refsets",
            Bucket::IdxRefsetItems => "idx_refset_items",
            Bucket::IdxRefsetTargetItems => "idx_refset_target_items",
            Bucket::IdxInstalledRefsets => "idx_installed_refsets",
        }
    }
}

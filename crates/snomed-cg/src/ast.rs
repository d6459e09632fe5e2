//! The Compositional Grammar (CG) expression AST.

use snomed_types::SctId;

/// An expression's definition status prefix.
///
/// `Default` (no prefix in the source text) and `SubtypeOf` (an explicit
/// `<<<` prefix) mean the same thing semantically — necessary-only
/// conditions — but are kept distinct so the canonical renderer can
/// reproduce an explicit `<<<` the author wrote, per the round-trip law,
/// while still omitting the prefix when the source omitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionStatus {
    /// No prefix in the source text (the grammatical default).
    #[default]
    Default,
    /// An explicit `<<<` prefix.
    SubtypeOf,
    /// An explicit `===` prefix.
    EquivalentTo,
}

/// A reference to a single concept, with an optional human-readable term.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptReference {
    /// The concept's SCTID.
    pub id: SctId,
    /// The `|term|`, if the expression text included one.
    pub term: Option<String>,
}

impl ConceptReference {
    /// Builds a bare concept reference with no term.
    pub fn new(id: SctId) -> Self {
        Self { id, term: None }
    }

    /// Builds a concept reference carrying a term.
    pub fn with_term(id: SctId, term: impl Into<String>) -> Self {
        Self {
            id,
            term: Some(term.into()),
        }
    }
}

/// The value side of a `name=value` refinement.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A concept reference value.
    Concept(ConceptReference),
    /// A quoted string value.
    StringValue(String),
    /// A `#n` integer literal with no decimal point.
    IntValue(i64),
    /// A `#n.n` decimal literal.
    DecimalValue(f64),
    /// A parenthesised nested sub-expression used as an attribute value.
    Nested(Box<Expression>),
}

/// A single `name=value` refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// The attribute (relationship type) concept.
    pub name: ConceptReference,
    /// The value assigned to the attribute.
    pub value: AttributeValue,
}

/// A `{ ... }` group of refinements, evaluated together as one role group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefinementGroup {
    /// The refinements within this group.
    pub refinements: Vec<Refinement>,
}

/// A full CG expression: a definition status, one or more focus concepts,
/// and optional ungrouped refinements and/or refinement groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    /// Whether this expression is a necessary-only (`SubtypeOf`) or
    /// sufficient-and-necessary (`EquivalentTo`) definition.
    pub definition_status: DefinitionStatus,
    /// One or more focus concepts (more than one means compound focus).
    pub focus_concepts: Vec<ConceptReference>,
    /// Refinements not enclosed in a `{ ... }` group.
    pub refinements: Vec<Refinement>,
    /// Grouped refinements, each group a separate role group.
    pub groups: Vec<RefinementGroup>,
}

impl Expression {
    /// Builds a bare, unrefined expression over a single focus concept.
    pub fn single(focus: ConceptReference) -> Self {
        Self {
            focus_concepts: vec![focus],
            ..Default::default()
        }
    }
}

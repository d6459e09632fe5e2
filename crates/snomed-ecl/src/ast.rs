//! Abstract syntax for Expression Constraint Language queries, per
//! spec.md §4.7.

use snomed_types::SctId;

/// The hierarchy operator prefixing a sub-expression constraint's focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// No prefix: matches only the focus concept itself.
    SelfOnly,
    /// `<` — strict descendants.
    DescendantOf,
    /// `<<` — descendants and self.
    DescendantOrSelfOf,
    /// `>` — strict ancestors.
    AncestorOf,
    /// `>>` — ancestors and self.
    AncestorOrSelfOf,
}

/// A sub-expression constraint's focus: a concept, or `*` (any concept).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Concept(SctId),
    Wildcard,
}

/// `=` or `!=` between an attribute name and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
}

/// `[min..max]` cardinality on an attribute constraint; `max: None` means
/// `*` (unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

/// A single `name comparison value` constraint, optionally reversed and
/// cardinality-bounded.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeConstraint {
    /// `R` prefix: match on the *source* of a relationship whose
    /// destination is the concept under test, rather than its own
    /// outgoing relationships.
    pub reverse: bool,
    pub name: ExpressionConstraint,
    pub cardinality: Option<Cardinality>,
    pub comparison: Comparison,
    pub value: ExpressionConstraint,
}

/// The refinement block trailing a `:` — ungrouped attributes plus any
/// number of `{ ... }` attribute groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefinementConstraint {
    pub attributes: Vec<AttributeConstraint>,
    pub groups: Vec<Vec<AttributeConstraint>>,
}

/// A parsed ECL expression constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionConstraint {
    /// `operator? focus refinement?`
    Sub {
        operator: Operator,
        focus: Focus,
        refinement: Option<RefinementConstraint>,
    },
    /// `^ refsetId` — membership in a reference set.
    Refset(SctId),
    And(Box<ExpressionConstraint>, Box<ExpressionConstraint>),
    Or(Box<ExpressionConstraint>, Box<ExpressionConstraint>),
    Minus(Box<ExpressionConstraint>, Box<ExpressionConstraint>),
}

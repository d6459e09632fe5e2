//! SNOMED CT Compositional Grammar: expression AST, parser, and the
//! Default/Canonical renderers.
//!
//! The Updating renderer — which substitutes each concept reference's term
//! with the current preferred synonym — needs a live localisation lookup
//! and lives in `snomed-engine::cg_render` instead, to avoid this crate
//! depending on the engine.
//!
//! # Examples
//!
//! ```
//! use snomed_cg::{parse, render_default, render_canonical, equal};
//!
//! let a = parse("46866001+428881005:116676008=72704001,363698007=12611008").unwrap();
//! let b = parse("428881005+46866001:363698007=12611008,116676008=72704001").unwrap();
//! assert!(equal(&a, &b));
//! assert_eq!(render_canonical::render(&a), render_canonical::render(&b));
//! assert!(render_default::render(&a).contains("46866001"));
//! ```

pub mod ast;
mod equality;
mod error;
mod parser;
pub mod render_canonical;
pub mod render_default;

pub use ast::{AttributeValue, ConceptReference, DefinitionStatus, Expression, Refinement, RefinementGroup};
pub use equality::equal;
pub use error::{CgResult, ParseError};
pub use parser::parse;

//! Structural equality between two expressions.

use crate::ast::Expression;
use crate::render_canonical;

/// `equal(e1, e2) ≡ canonical(e1) == canonical(e2)`, compared ASCII
/// case-insensitively. Unicode case folding is explicitly out of scope —
/// see spec.md's Open Question (b).
pub fn equal(a: &Expression, b: &Expression) -> bool {
    render_canonical::render_fold_case(a) == render_canonical::render_fold_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn reordered_focus_and_refinements_are_equal() {
        let a = parse("46866001+428881005:116676008=72704001,363698007=12611008").unwrap();
        let b = parse("428881005+46866001:363698007=12611008,116676008=72704001").unwrap();
        assert!(equal(&a, &b));
    }

    #[test]
    fn different_refinement_values_are_not_equal() {
        let a = parse("73211009:363698007=113331007").unwrap();
        let b = parse("73211009:363698007=113331008").unwrap();
        assert!(!equal(&a, &b));
    }
}

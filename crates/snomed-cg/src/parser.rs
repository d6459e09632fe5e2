//! A hand-written recursive-descent parser for the CG grammar.
//!
//! Mirrors the teacher's own `Rf2Parser`/`Rf2Record` style of explicit,
//! structured errors rather than reaching for a parser-combinator crate:
//! every failure is a [`ParseError`] carrying line, column, and the
//! offending token.

use std::iter::Peekable;
use std::str::CharIndices;

use snomed_types::SctId;

use crate::ast::{AttributeValue, ConceptReference, DefinitionStatus, Expression, Refinement, RefinementGroup};
use crate::error::{CgResult, ParseError};

/// Parses a CG expression string into an [`Expression`] AST.
pub fn parse(input: &str) -> CgResult<Expression> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    let expr = parser.parse_expression()?;
    parser.skip_ws();
    if let Some((_, ch)) = parser.chars.peek().copied() {
        return Err(parser.error(format!("unexpected trailing input starting with '{ch}'")));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn error(&mut self, message: impl Into<String>) -> ParseError {
        let offending_token = self.chars.peek().map(|(_, c)| c.to_string());
        ParseError {
            line: self.line,
            column: self.column,
            offending_token,
            message: message.into(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        let rest_start = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len());
        self.input[rest_start..].starts_with(s)
    }

    fn consume_literal(&mut self, s: &str) {
        for _ in 0..s.chars().count() {
            self.bump();
        }
    }

    fn expect_char(&mut self, expected: char) -> CgResult<()> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            _ => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn parse_expression(&mut self) -> CgResult<Expression> {
        self.skip_ws();
        let definition_status = if self.starts_with("===") {
            self.consume_literal("===");
            DefinitionStatus::EquivalentTo
        } else if self.starts_with("<<<") {
            self.consume_literal("<<<");
            DefinitionStatus::SubtypeOf
        } else {
            DefinitionStatus::Default
        };
        self.skip_ws();

        let focus_concepts = self.parse_focus_concepts()?;
        if focus_concepts.is_empty() {
            return Err(self.error("expression must have at least one focus concept"));
        }

        let mut refinements = Vec::new();
        let mut groups = Vec::new();
        self.skip_ws();
        if self.peek() == Some(':') {
            self.bump();
            self.parse_refinements(&mut refinements, &mut groups)?;
        }

        Ok(Expression {
            definition_status,
            focus_concepts,
            refinements,
            groups,
        })
    }

    fn parse_focus_concepts(&mut self) -> CgResult<Vec<ConceptReference>> {
        let mut concepts = Vec::new();
        loop {
            self.skip_ws();
            concepts.push(self.parse_concept_reference()?);
            self.skip_ws();
            if self.peek() == Some('+') {
                self.bump();
                continue;
            }
            break;
        }
        Ok(concepts)
    }

    fn parse_concept_reference(&mut self) -> CgResult<ConceptReference> {
        let id = self.parse_sctid()?;
        self.skip_ws();
        let term = if self.peek() == Some('|') {
            self.bump();
            let text = self.parse_until('|')?;
            self.expect_char('|')?;
            Some(text)
        } else {
            None
        };
        Ok(ConceptReference { id, term })
    }

    fn parse_sctid(&mut self) -> CgResult<SctId> {
        self.skip_ws();
        let mut digits = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            digits.push(self.bump().unwrap());
        }
        if digits.is_empty() {
            return Err(self.error("expected a concept identifier"));
        }
        digits
            .parse::<SctId>()
            .map_err(|_| self.error(format!("'{digits}' is not a valid SCTID")))
    }

    fn parse_until(&mut self, terminator: char) -> CgResult<String> {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some(c) if c == terminator => break,
                Some(_) => out.push(self.bump().unwrap()),
                None => return Err(self.error(format!("unterminated text, expected '{terminator}'"))),
            }
        }
        Ok(out)
    }

    fn parse_refinements(
        &mut self,
        refinements: &mut Vec<Refinement>,
        groups: &mut Vec<RefinementGroup>,
    ) -> CgResult<()> {
        loop {
            self.skip_ws();
            if self.peek() == Some('{') {
                groups.push(self.parse_refinement_group()?);
            } else {
                refinements.push(self.parse_refinement()?);
            }
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
                continue;
            }
            break;
        }
        Ok(())
    }

    fn parse_refinement_group(&mut self) -> CgResult<RefinementGroup> {
        self.expect_char('{')?;
        let mut refinements = Vec::new();
        loop {
            self.skip_ws();
            refinements.push(self.parse_refinement()?);
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
                continue;
            }
            break;
        }
        self.expect_char('}')?;
        Ok(RefinementGroup { refinements })
    }

    fn parse_refinement(&mut self) -> CgResult<Refinement> {
        let name = self.parse_concept_reference()?;
        self.expect_char('=')?;
        self.skip_ws();
        let value = self.parse_attribute_value()?;
        Ok(Refinement { name, value })
    }

    fn parse_attribute_value(&mut self) -> CgResult<AttributeValue> {
        self.skip_ws();
        match self.peek() {
            Some('#') => {
                self.bump();
                self.parse_number()
            }
            Some('"') => {
                self.bump();
                let text = self.parse_until('"')?;
                self.expect_char('"')?;
                Ok(AttributeValue::StringValue(text))
            }
            Some('(') => {
                self.bump();
                self.skip_ws();
                let nested = self.parse_expression()?;
                self.skip_ws();
                self.expect_char(')')?;
                Ok(AttributeValue::Nested(Box::new(nested)))
            }
            Some(c) if c.is_ascii_digit() => Ok(AttributeValue::Concept(self.parse_concept_reference()?)),
            _ => Err(self.error("expected an attribute value")),
        }
    }

    fn parse_number(&mut self) -> CgResult<AttributeValue> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push(self.bump().unwrap());
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.bump().unwrap());
        }
        if text.is_empty() || text == "-" {
            return Err(self.error("expected a numeric literal after '#'"));
        }
        if self.peek() == Some('.') {
            text.push(self.bump().unwrap());
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(self.error("expected digits after decimal point"));
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.bump().unwrap());
            }
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("'{text}' is not a valid decimal")))?;
            Ok(AttributeValue::DecimalValue(value))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| self.error(format!("'{text}' is not a valid integer")))?;
            Ok(AttributeValue::IntValue(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DefinitionStatus;

    #[test]
    fn parses_bare_focus_concept() {
        let expr = parse("73211009 |Diabetes mellitus|").unwrap();
        assert_eq!(expr.focus_concepts.len(), 1);
        assert_eq!(expr.focus_concepts[0].id, 73211009);
        assert!(expr.refinements.is_empty());
        assert!(expr.groups.is_empty());
    }

    #[test]
    fn parses_concept_value_refinement() {
        let expr = parse("83152002:405815000=122456005").unwrap();
        assert_eq!(expr.refinements.len(), 1);
        match &expr.refinements[0].value {
            AttributeValue::Concept(c) => assert_eq!(c.id, 122456005),
            other => panic!("expected concept value, got {other:?}"),
        }
    }

    #[test]
    fn parses_compound_focus_and_groups() {
        let expr = parse("46866001+428881005:{116676008=72704001},363698007=12611008").unwrap();
        assert_eq!(expr.focus_concepts.len(), 2);
        assert_eq!(expr.groups.len(), 1);
        assert_eq!(expr.refinements.len(), 1);
    }

    #[test]
    fn parses_definition_status_prefixes() {
        let expr = parse("<<< 73211009: 363698007 = 113331007").unwrap();
        assert_eq!(expr.definition_status, DefinitionStatus::SubtypeOf);
        let expr = parse("=== 73211009").unwrap();
        assert_eq!(expr.definition_status, DefinitionStatus::EquivalentTo);
    }

    #[test]
    fn parses_numeric_literals() {
        let expr = parse("373873005:411116001=#1,415168006=#3.5").unwrap();
        assert_eq!(expr.refinements.len(), 2);
        assert!(matches!(expr.refinements[0].value, AttributeValue::IntValue(1)));
        assert!(matches!(expr.refinements[1].value, AttributeValue::DecimalValue(v) if (v - 3.5).abs() < 1e-9));
    }

    #[test]
    fn empty_focus_concept_is_a_parse_error() {
        let err = parse(":405815000=122456005").unwrap_err();
        assert!(err.message.contains("focus concept"));
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = parse("wibble").unwrap_err();
        assert_eq!(err.line, 1);
    }
}

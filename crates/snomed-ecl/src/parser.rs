//! A hand-written recursive-descent parser for the ECL grammar, mirroring
//! `snomed_cg::parser`'s structured-error style.

use std::iter::Peekable;
use std::str::CharIndices;

use snomed_types::SctId;

use crate::ast::{AttributeConstraint, Cardinality, Comparison, ExpressionConstraint, Focus, Operator, RefinementConstraint};
use crate::error::SyntaxError;

type ParseResult<T> = Result<T, SyntaxError>;

/// Parses an ECL constraint string into an [`ExpressionConstraint`].
pub fn parse(input: &str) -> ParseResult<ExpressionConstraint> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    let expr = parser.parse_compound()?;
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

    fn error(&mut self, message: impl Into<String>) -> SyntaxError {
        let offending_token = self.chars.peek().map(|(_, c)| c.to_string());
        SyntaxError {
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

    fn starts_with_keyword(&self, kw: &str) -> bool {
        let rest_start = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len());
        let rest = &self.input[rest_start..];
        if !rest.starts_with(kw) {
            return false;
        }
        match rest[kw.len()..].chars().next() {
            None => true,
            Some(c) => !c.is_ascii_alphanumeric(),
        }
    }

    fn consume_literal(&mut self, s: &str) {
        for _ in 0..s.chars().count() {
            self.bump();
        }
    }

    fn expect_char(&mut self, expected: char) -> ParseResult<()> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            _ => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn expect_literal(&mut self, s: &str) -> ParseResult<()> {
        self.skip_ws();
        if !self.starts_with(s) {
            return Err(self.error(format!("expected '{s}'")));
        }
        self.consume_literal(s);
        Ok(())
    }

    fn parse_sctid(&mut self) -> ParseResult<SctId> {
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

    fn parse_number_u32(&mut self) -> ParseResult<u32> {
        self.skip_ws();
        let mut digits = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            digits.push(self.bump().unwrap());
        }
        if digits.is_empty() {
            return Err(self.error("expected a number"));
        }
        digits.parse::<u32>().map_err(|_| self.error(format!("'{digits}' is not a valid number")))
    }

    /// Left-to-right chain of `AND`/`OR`/`MINUS` at a single precedence
    /// level, matching ECL's left-associative compound expression grammar.
    fn parse_compound(&mut self) -> ParseResult<ExpressionConstraint> {
        let mut left = self.parse_sub_expr()?;
        loop {
            self.skip_ws();
            if self.starts_with_keyword("AND") {
                self.consume_literal("AND");
                self.skip_ws();
                let right = self.parse_sub_expr()?;
                left = ExpressionConstraint::And(Box::new(left), Box::new(right));
            } else if self.starts_with_keyword("OR") {
                self.consume_literal("OR");
                self.skip_ws();
                let right = self.parse_sub_expr()?;
                left = ExpressionConstraint::Or(Box::new(left), Box::new(right));
            } else if self.starts_with_keyword("MINUS") {
                self.consume_literal("MINUS");
                self.skip_ws();
                let right = self.parse_sub_expr()?;
                left = ExpressionConstraint::Minus(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_sub_expr(&mut self) -> ParseResult<ExpressionConstraint> {
        self.skip_ws();
        if self.peek() == Some('(') {
            self.bump();
            self.skip_ws();
            let inner = self.parse_compound()?;
            self.skip_ws();
            self.expect_char(')')?;
            return Ok(inner);
        }
        if self.peek() == Some('^') {
            self.bump();
            self.skip_ws();
            let id = self.parse_sctid()?;
            return Ok(ExpressionConstraint::Refset(id));
        }

        let operator = self.parse_operator();
        self.skip_ws();
        let focus = if self.peek() == Some('*') {
            self.bump();
            Focus::Wildcard
        } else {
            Focus::Concept(self.parse_sctid()?)
        };
        self.skip_ws();
        let refinement = if self.peek() == Some(':') {
            self.bump();
            Some(self.parse_refinement_constraint()?)
        } else {
            None
        };
        Ok(ExpressionConstraint::Sub { operator, focus, refinement })
    }

    fn parse_operator(&mut self) -> Operator {
        self.skip_ws();
        if self.starts_with("<<") {
            self.consume_literal("<<");
            Operator::DescendantOrSelfOf
        } else if self.peek() == Some('<') {
            self.bump();
            Operator::DescendantOf
        } else if self.starts_with(">>") {
            self.consume_literal(">>");
            Operator::AncestorOrSelfOf
        } else if self.peek() == Some('>') {
            self.bump();
            Operator::AncestorOf
        } else {
            Operator::SelfOnly
        }
    }

    fn parse_refinement_constraint(&mut self) -> ParseResult<RefinementConstraint> {
        let mut refinement = RefinementConstraint::default();
        loop {
            self.skip_ws();
            if self.peek() == Some('{') {
                refinement.groups.push(self.parse_attribute_group()?);
            } else {
                refinement.attributes.push(self.parse_attribute_constraint()?);
            }
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
                continue;
            }
            break;
        }
        Ok(refinement)
    }

    fn parse_attribute_group(&mut self) -> ParseResult<Vec<AttributeConstraint>> {
        self.expect_char('{')?;
        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            attrs.push(self.parse_attribute_constraint()?);
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
                continue;
            }
            break;
        }
        self.expect_char('}')?;
        Ok(attrs)
    }

    fn parse_attribute_constraint(&mut self) -> ParseResult<AttributeConstraint> {
        self.skip_ws();

        let cardinality = if self.peek() == Some('[') {
            Some(self.parse_cardinality()?)
        } else {
            None
        };
        self.skip_ws();

        let reverse = if self.peek() == Some('R') {
            let rest_start = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len());
            let after_r = &self.input[rest_start + 1..];
            if after_r.starts_with(char::is_whitespace) {
                self.bump();
                self.skip_ws();
                true
            } else {
                false
            }
        } else {
            false
        };

        let name = self.parse_sub_expr()?;
        self.skip_ws();

        let comparison = if self.starts_with("!=") {
            self.consume_literal("!=");
            Comparison::NotEquals
        } else if self.peek() == Some('=') {
            self.bump();
            Comparison::Equals
        } else {
            return Err(self.error("expected '=' or '!=' in attribute constraint"));
        };
        self.skip_ws();
        let value = self.parse_sub_expr()?;

        Ok(AttributeConstraint { reverse, name, cardinality, comparison, value })
    }

    fn parse_cardinality(&mut self) -> ParseResult<Cardinality> {
        self.expect_char('[')?;
        let min = self.parse_number_u32()?;
        self.expect_literal("..")?;
        self.skip_ws();
        let max = if self.peek() == Some('*') {
            self.bump();
            None
        } else {
            Some(self.parse_number_u32()?)
        };
        self.expect_char(']')?;
        Ok(Cardinality { min, max })
    }
}

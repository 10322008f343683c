// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use crate::ast::*;
use super::lex::TokenKind;
use super::{ParseErrType, ParseResult, Parser};

impl<'a> Parser<'a> {
    /// Reads `DEF type[len] PHU n LLI a ULI b name[d1,d2]=init, ...`.
    pub(super) fn declaration(&mut self) -> ParseResult<Statement> {
        self.advance()?;
        self.expect_not_line_end()?;
        let var_type = match self.token {
            Some(t) if t.kind == TokenKind::Identifier => t.text.parse::<VariableType>().ok(),
            _ => None,
        };
        let var_type = match var_type {
            Some(var_type) => var_type,
            None => return self.err(ParseErrType::ExpectedVariableType(self.text())),
        };
        self.advance()?;

        let mut string_length = None;
        if var_type == VariableType::String && self.token_is(TokenKind::FieldBrace, "[") {
            self.advance()?;
            string_length = Some(self.unsigned()?);
            self.closing_field_brace()?;
        }

        let mut unit = None;
        if self.keyword_is("PHU") {
            self.advance()?;
            unit = Some(self.integer()?);
        }
        let mut lower_limit = None;
        if self.keyword_is("LLI") {
            self.advance()?;
            lower_limit = Some(self.literal_number()?);
        }
        let mut upper_limit = None;
        if self.keyword_is("ULI") {
            self.advance()?;
            upper_limit = Some(self.literal_number()?);
        }

        let variables = self.declared_variables()?;
        Ok(Statement::Declaration(Declaration {
            var_type, string_length, unit, lower_limit, upper_limit, variables
        }))
    }

    fn closing_field_brace(&mut self) -> ParseResult<()> {
        if !self.token_is(TokenKind::FieldBrace, "]") {
            return self.err(ParseErrType::ExpectedClosingFieldBrace(self.text()));
        }
        self.advance()
    }

    fn literal_number(&mut self) -> ParseResult<f64> {
        let text = self.text();
        match self.expression()? {
            Expr::Num(number) => Ok(number.value),
            _ => self.err(ParseErrType::ExpectedNumber(text)),
        }
    }

    fn declared_variables(&mut self) -> ParseResult<Vec<VariableDeclaration>> {
        let mut variables = Vec::new();
        loop {
            let mut name = match self.token {
                Some(t) if t.kind == TokenKind::Identifier => String::from(t.text),
                _ => return self.err(ParseErrType::ExpectedVariableName(self.text())),
            };
            self.advance()?;
            // same gluing as for variables in expressions: `R1`
            if name.len() == 1 {
                if let Some(next) = self.token {
                    if !next.spaced && next.is_decimal() && !next.text.contains('.') {
                        name.push_str(next.text);
                        self.advance()?;
                    }
                }
            }

            let mut field_lengths = None;
            if self.token_is(TokenKind::FieldBrace, "[") {
                let mut lengths = Vec::new();
                loop {
                    self.advance()?;
                    lengths.push(self.unsigned()?);
                    if !self.token_is(TokenKind::Separator, ",") {
                        break;
                    }
                }
                self.closing_field_brace()?;
                field_lengths = Some(lengths);
            }

            let mut init = None;
            if self.token_is(TokenKind::Operator, "=") {
                self.advance()?;
                init = Some(self.expression()?);
            }

            variables.push(VariableDeclaration { name, field_lengths, init });
            if !self.token_is(TokenKind::Separator, ",") {
                return Ok(variables);
            }
            self.advance()?;
        }
    }
}

// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Reading NC text into an AST.
//!
//! The parser pulls tokens one at a time from the [`Tokenizer`](lex::Tokenizer)
//! and keeps exactly one token of lookahead.  Blocks are built from
//! statements, statements from expressions and declarations; each of these
//! layers lives in its own submodule as an `impl Parser` block.

pub mod lex;
mod decl;
mod error;
mod expr;
mod stmt;

use std::convert::TryFrom;
use tracing::{event, Level};

use crate::ast::*;
use crate::util::num_to_int;
use self::lex::{integer_value, Token, TokenKind, Tokenizer};

pub use self::error::*;

pub type ParseResult<T> = Result<T, ParseError>;

/// Dialect switches for the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// `; comment` up to the line end.
    pub line_comments: bool,
    /// `( comment )` up to the line end; nothing may follow the closing brace.
    pub brace_comments: bool,
    /// Arguments to G codes in field braces, e.g. `G05[1,2]`.
    pub gcode_arguments: bool,
    /// A bare string literal statement becomes an instruction.
    pub string_instructions: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            line_comments: true,
            brace_comments: false,
            gcode_arguments: false,
            string_instructions: false,
        }
    }
}

pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    token: Option<Token<'a>>,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, options: ParseOptions) -> Self {
        Parser { tokens: Tokenizer::new(input, options), token: None, options }
    }

    fn advance(&mut self) -> ParseResult<()> {
        self.token = self.tokens.next().transpose()?;
        Ok(())
    }

    fn lineno(&self) -> usize {
        self.token.map_or_else(|| self.tokens.lineno(), |t| t.lineno)
    }

    /// Text of the current token, for error messages.
    fn text(&self) -> String {
        match self.token {
            Some(t) if t.kind != TokenKind::NewLine => t.text.into(),
            _ => String::new(),
        }
    }

    fn error(&self, errtype: ParseErrType) -> ParseError {
        ParseError { lineno: self.lineno(), errtype }
    }

    fn err<T>(&self, errtype: ParseErrType) -> ParseResult<T> {
        Err(self.error(errtype))
    }

    fn token_is(&self, kind: TokenKind, text: &str) -> bool {
        self.token.map_or(false, |t| t.is(kind, text))
    }

    fn keyword_is(&self, keyword: &str) -> bool {
        self.token.map_or(false, |t| t.is_keyword(keyword))
    }

    /// End of file, end of line or the start of a trailing comment.
    fn at_line_end(&self) -> bool {
        self.token.map_or(true, |t| t.kind == TokenKind::NewLine || t.kind == TokenKind::Comment)
    }

    fn expect_not_line_end(&self) -> ParseResult<()> {
        if self.at_line_end() {
            return self.err(ParseErrType::UnexpectedLineEnd);
        }
        Ok(())
    }

    fn integer(&mut self) -> ParseResult<i64> {
        match self.token.and_then(|t| integer_value(&t)) {
            Some(value) => {
                self.advance()?;
                Ok(value)
            }
            None => self.err(ParseErrType::ExpectedInteger(self.text())),
        }
    }

    fn unsigned(&mut self) -> ParseResult<u32> {
        match self.token.and_then(|t| integer_value(&t)).and_then(|v| u32::try_from(v).ok()) {
            Some(value) => {
                self.advance()?;
                Ok(value)
            }
            None => self.err(ParseErrType::ExpectedInteger(self.text())),
        }
    }

    /// Reads the next block, or returns `None` at the end of input.
    pub fn next_block(&mut self) -> ParseResult<Option<Block>> {
        if self.token.is_none() {
            self.advance()?;
        }
        let first = match self.token {
            Some(token) => token,
            None => return Ok(None),
        };
        if first.kind == TokenKind::NewLine {
            self.advance()?;
            return Ok(Some(Block::empty(first.lineno)));
        }

        let mut block = Block::empty(first.lineno);
        let mut statement = self.statement()?;

        if let Some(number) = self.block_number(&statement)? {
            block.number = Some(number);
            statement = self.statement()?;
        }

        // Labels are bare instructions followed by a colon.
        loop {
            let label = match &statement {
                Some(Statement::Instruction(Instruction { name, args: None }))
                    if self.token_is(TokenKind::Colon, ":") => name.clone(),
                _ => break,
            };
            block.labels.push(label);
            self.advance()?;
            statement = self.statement()?;
        }

        while let Some(stmt) = statement {
            block.statements.push(stmt);
            statement = self.statement()?;
        }

        if let Some(token) = self.token {
            if token.kind == TokenKind::Comment {
                block.comment = Some(token.text.into());
                self.advance()?;
            }
        }

        match self.token {
            None => (),
            Some(token) if token.kind == TokenKind::NewLine => self.advance()?,
            Some(_) => return self.err(ParseErrType::ExpectedLineEnd(self.text())),
        }

        event!(Level::TRACE, "parsed block in line {}: {} statements",
               block.lineno, block.statements.len());
        Ok(Some(block))
    }

    fn block_number(&self, statement: &Option<Statement>) -> ParseResult<Option<i64>> {
        match statement {
            Some(Statement::Assignment(assign)) if assign.variable.eq_ignore_ascii_case("N") => {
                match assign.value {
                    Expr::Num(Number { value, is_integer: true, .. }) =>
                        num_to_int(value, |_| self.error(ParseErrType::ExpectedBlockNumber)).map(Some),
                    _ => self.err(ParseErrType::ExpectedBlockNumber),
                }
            }
            _ => Ok(None),
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = ParseResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Parses NC text with the default options.
pub fn parse(input: &str) -> ParseResult<Program> {
    parse_with(input, ParseOptions::default())
}

pub fn parse_with(input: &str, options: ParseOptions) -> ParseResult<Program> {
    let blocks = Parser::new(input, options).collect::<ParseResult<Vec<_>>>()?;
    Ok(Program { blocks })
}

/// Parses NC text given as individual lines.
pub fn parse_lines(lines: &[&str]) -> ParseResult<Program> {
    parse(&lines.join("\n"))
}

/// Parses a single expression that must span the whole input line.
pub fn parse_expression(input: &str) -> ParseResult<Expr> {
    let mut parser = Parser::new(input, ParseOptions::default());
    parser.advance()?;
    let expr = parser.expression()?;
    if !parser.at_line_end() {
        return parser.err(ParseErrType::ExpectedLineEnd(parser.text()));
    }
    Ok(expr)
}

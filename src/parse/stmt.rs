// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use crate::ast::*;
use super::lex::TokenKind;
use super::{ParseErrType, ParseResult, Parser};

/// Recognizes `GOTO`, `GOTOS`, `GOTOB`, `GOTOF` and `GOTOC`.
fn goto_direction(name: &str) -> Option<GotoDirection> {
    if name.len() > 5 || name.len() < 4 || !name[..4].eq_ignore_ascii_case("GOTO") {
        return None;
    }
    GotoDirection::from_suffix(&name[4..])
}

impl<'a> Parser<'a> {
    /// Reads the next statement of the current line, if any.
    pub(super) fn statement(&mut self) -> ParseResult<Option<Statement>> {
        let token = match self.token {
            Some(t) if !self.at_line_end() => t,
            _ => return Ok(None),
        };
        if token.kind == TokenKind::Identifier {
            if token.is_keyword("G") {
                return self.gcode().map(Some);
            }
            if token.is_keyword("M") {
                self.advance()?;
                self.expect_not_line_end()?;
                let id = self.unsigned()?;
                return Ok(Some(Statement::MCode(MCode { id })));
            }
            if let Some(direction) = goto_direction(token.text) {
                return self.goto(direction).map(Some);
            }
            if token.is_keyword("DEF") {
                return self.declaration().map(Some);
            }
            if let Ok(kind) = token.text.parse::<FlowControlKind>() {
                return self.flow_control(kind).map(Some);
            }
        }
        self.assignment_or_instruction().map(Some)
    }

    fn gcode(&mut self) -> ParseResult<Statement> {
        self.advance()?;
        self.expect_not_line_end()?;
        let id = self.unsigned()?;
        let mut args = None;
        if self.options.gcode_arguments && self.token_is(TokenKind::FieldBrace, "[") {
            let mut list = Vec::new();
            loop {
                self.advance()?;
                list.push(self.expression()?);
                if !self.token_is(TokenKind::Separator, ",") {
                    break;
                }
            }
            if !self.token_is(TokenKind::FieldBrace, "]") {
                return self.err(ParseErrType::ExpectedClosingFieldBrace(self.text()));
            }
            self.advance()?;
            args = Some(list);
        }
        Ok(Statement::GCode(GCode { id, args }))
    }

    fn goto(&mut self, direction: GotoDirection) -> ParseResult<Statement> {
        self.advance()?;
        let target = if direction == GotoDirection::Start {
            None
        } else {
            Some(self.expression()?)
        };
        Ok(Statement::Goto(Goto { direction, target }))
    }

    fn flow_control(&mut self, kind: FlowControlKind) -> ParseResult<Statement> {
        self.advance()?;
        let flow = match kind {
            FlowControlKind::If => FlowControl::If(self.expression()?),
            FlowControlKind::Else => FlowControl::Else,
            FlowControlKind::EndIf => FlowControl::EndIf,
            FlowControlKind::While => FlowControl::While(self.expression()?),
            FlowControlKind::EndWhile => FlowControl::EndWhile,
            FlowControlKind::Repeat => FlowControl::Repeat,
            FlowControlKind::Until => FlowControl::Until(self.expression()?),
            FlowControlKind::Loop => FlowControl::Loop,
            FlowControlKind::EndLoop => FlowControl::EndLoop,
            FlowControlKind::EndFor => FlowControl::EndFor,
            FlowControlKind::For => {
                let assign = match self.assignment_or_instruction()? {
                    Statement::Assignment(assign) => assign,
                    _ => return self.err(ParseErrType::ExpectedAssignment),
                };
                if !self.keyword_is("TO") {
                    return self.err(ParseErrType::ExpectedToKeyword);
                }
                self.advance()?;
                let last = self.expression()?;
                FlowControl::For {
                    variable: Expr::Var(Variable { name: assign.variable, fields: assign.fields }),
                    initial: assign.value,
                    last,
                }
            }
        };
        Ok(Statement::FlowControl(flow))
    }

    /// Reads an explicit assignment (`R1=5`), an address word (`X10`,
    /// `X-5`) or an instruction (`TRANS`, `MSG("x")`).
    pub(super) fn assignment_or_instruction(&mut self) -> ParseResult<Statement> {
        match self.expression()? {
            Expr::Var(var) => {
                if self.token_is(TokenKind::Operator, "=") {
                    self.advance()?;
                    let value = self.expression()?;
                    return Ok(Statement::Assignment(Assignment {
                        variable: var.name, fields: var.fields, value
                    }));
                }
                if var.fields.is_some() {
                    return self.err(ParseErrType::UnexpectedFieldBraces);
                }
                if var.name.len() == 1 {
                    let value = self.expression()?;
                    return Ok(Statement::Assignment(Assignment::new(var.name, value)));
                }
                if var.name.as_bytes()[1].is_ascii_digit() {
                    let (letter, digits) = var.name.split_at(1);
                    let value = digits.parse::<i64>().map_err(
                        |_| self.error(ParseErrType::ExpectedInteger(digits.into())))?;
                    return Ok(Statement::Assignment(Assignment::new(letter, Expr::int(value))));
                }
                Ok(Statement::Instruction(Instruction::new(var.name)))
            }
            Expr::Call(func) => Ok(Statement::Instruction(Instruction {
                name: func.name, args: Some(func.args)
            })),
            // `X-5` and `X+R1` read as binary operations on the address letter.
            // Only the outermost operation is unwrapped, so `X-1.2+3` is not
            // an address word.
            Expr::BinOp(op @ BinaryOp::Add, lhs, rhs) |
            Expr::BinOp(op @ BinaryOp::Sub, lhs, rhs) => match *lhs {
                Expr::Var(Variable { name, fields: None }) if name.len() == 1 => {
                    let value = match (op, *rhs) {
                        (BinaryOp::Sub, Expr::Num(number)) =>
                            Expr::Num(Number { value: -number.value, ..number }),
                        (BinaryOp::Sub, rhs @ Expr::BinOp(..)) => Expr::UnOp(
                            UnaryOp::Negate, Box::new(Expr::Bracket(Box::new(rhs)))),
                        (BinaryOp::Sub, rhs) => Expr::UnOp(UnaryOp::Negate, Box::new(rhs)),
                        (_, rhs) => rhs,
                    };
                    Ok(Statement::Assignment(Assignment::new(name, value)))
                }
                _ => self.err(ParseErrType::ExpectedAssignmentOrInstruction),
            },
            Expr::Str(text) if self.options.string_instructions =>
                Ok(Statement::Instruction(Instruction::new(format!("\"{}\"", text)))),
            _ => self.err(ParseErrType::ExpectedAssignmentOrInstruction),
        }
    }
}

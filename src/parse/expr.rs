// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use crate::ast::*;
use super::lex::{number_value, Token, TokenKind};
use super::{ParseErrType, ParseResult, Parser};

fn negate(number: Number) -> Number {
    Number { value: -number.value, ..number }
}

impl<'a> Parser<'a> {
    /// Reads an expression with operator precedence.
    ///
    /// Operands waiting for their right-hand side are kept on a stack
    /// together with their operator; operators of equal priority associate
    /// to the left.
    pub(super) fn expression(&mut self) -> ParseResult<Expr> {
        let mut current = self.operand()?;
        let mut pending: Vec<(BinaryOp, Expr)> = Vec::new();

        while let Some(op) = self.binary_operator()? {
            while pending.last().map_or(false, |(top, _)| op.priority() <= top.priority()) {
                if let Some((top, lhs)) = pending.pop() {
                    current = Expr::BinOp(top, Box::new(lhs), Box::new(current));
                }
            }
            pending.push((op, current));
            current = self.operand()?;
        }

        Ok(pending.into_iter().rev().fold(current, |rhs, (op, lhs)| {
            Expr::BinOp(op, Box::new(lhs), Box::new(rhs))
        }))
    }

    fn binary_operator(&mut self) -> ParseResult<Option<BinaryOp>> {
        let token = match self.token {
            Some(t) if t.kind == TokenKind::Operator && t.text != "=" => t,
            _ => return Ok(None),
        };
        match token.text.parse() {
            Ok(op) => {
                self.advance()?;
                Ok(Some(op))
            }
            Err(_) => self.err(ParseErrType::ExpectedBinaryOperator(token.text.into())),
        }
    }

    /// Reads a prefix operator; a unary `+` is skipped.
    fn unary_operator(&mut self) -> ParseResult<Option<UnaryOp>> {
        let token = match self.token {
            Some(t) if t.kind == TokenKind::Operator && t.text != "=" => t,
            _ => return Ok(None),
        };
        if token.text == "+" {
            self.advance()?;
            return Ok(None);
        }
        match token.text.parse() {
            Ok(op) => {
                self.advance()?;
                Ok(Some(op))
            }
            Err(_) => self.err(ParseErrType::ExpectedOperand(token.text.into())),
        }
    }

    fn operand(&mut self) -> ParseResult<Expr> {
        if let Some(op) = self.unary_operator()? {
            return Ok(match (op, self.operand()?) {
                (UnaryOp::Negate, Expr::Num(number)) => Expr::Num(negate(number)),
                (op, arg) => Expr::UnOp(op, Box::new(arg)),
            });
        }
        self.expect_not_line_end()?;
        let token = match self.token {
            Some(t) => t,
            None => return self.err(ParseErrType::UnexpectedLineEnd),
        };
        match token.kind {
            TokenKind::Number => self.number(token),
            TokenKind::Identifier => self.variable_or_function(token),
            TokenKind::String => {
                self.advance()?;
                Ok(Expr::Str(token.text.into()))
            }
            TokenKind::Brace if token.text == "(" => self.bracket(),
            _ => self.err(ParseErrType::ExpectedOperand(token.text.into())),
        }
    }

    fn number(&mut self, token: Token<'a>) -> ParseResult<Expr> {
        let value = number_value(&token)
            .ok_or_else(|| self.error(ParseErrType::InvalidNumber(token.text.into())))?;
        let radix = match token.text.as_bytes()[0] {
            b'h' | b'H' => Radix::Hex,
            b'b' | b'B' => Radix::Binary,
            _ => Radix::Decimal,
        };
        let mut number = Number { value, is_integer: !token.text.contains('.'), radix };
        self.advance()?;

        // 1.5EX3, 2EX-2
        if self.token.map_or(false, |t| t.is_keyword("EX") && !t.spaced) {
            self.advance()?;
            let sign = self.sign()?;
            let exponent = match self.token {
                Some(t) if t.is_decimal() => t.text.parse::<f64>().ok(),
                _ => None,
            };
            match exponent {
                Some(exponent) => {
                    let exponent = sign * exponent;
                    number.value *= if exponent.fract() == 0.0 {
                        10f64.powi(exponent as i32)
                    } else {
                        10f64.powf(exponent)
                    };
                    number.is_integer = false;
                    self.advance()?;
                }
                None => return self.err(ParseErrType::ExpectedNumber(self.text())),
            }
        }
        Ok(Expr::Num(number))
    }

    fn sign(&mut self) -> ParseResult<f64> {
        let sign = if self.token_is(TokenKind::Operator, "-") {
            -1.
        } else if self.token_is(TokenKind::Operator, "+") {
            1.
        } else {
            return Ok(1.);
        };
        self.advance()?;
        Ok(sign)
    }

    fn variable_or_function(&mut self, token: Token<'a>) -> ParseResult<Expr> {
        self.advance()?;
        if self.token_is(TokenKind::Brace, "(") {
            let args = self.argument_list(TokenKind::Brace, ")")?;
            return Ok(Expr::Call(Function { name: token.text.into(), args }));
        }
        let mut name = String::from(token.text);
        // `R1` reads as the letter and the number; glue them back together.
        if name.len() == 1 {
            if let Some(next) = self.token {
                if !next.spaced && next.is_decimal() && !next.text.contains('.') {
                    name.push_str(next.text);
                    self.advance()?;
                }
            }
        }
        let fields = if self.token_is(TokenKind::FieldBrace, "[") {
            Some(self.argument_list(TokenKind::FieldBrace, "]")?)
        } else {
            None
        };
        Ok(Expr::Var(Variable { name, fields }))
    }

    /// Reads a comma separated list up to the closing `close`, starting at
    /// the opening brace.  Empty slots are kept as `None`.
    pub(super) fn argument_list(&mut self, kind: TokenKind, close: &str) -> ParseResult<Vec<Option<Expr>>> {
        self.advance()?;
        let mut args = Vec::new();
        loop {
            if self.token_is(kind, close) {
                self.advance()?;
                return Ok(args);
            }
            if self.at_line_end() || self.token_is(TokenKind::Brace, ")") ||
                self.token_is(TokenKind::FieldBrace, "]")
            {
                return self.err(if kind == TokenKind::Brace {
                    ParseErrType::ExpectedClosingBracket(self.text())
                } else {
                    ParseErrType::ExpectedClosingFieldBrace(self.text())
                });
            }
            if self.token_is(TokenKind::Separator, ",") {
                args.push(None);
            } else {
                args.push(Some(self.expression()?));
            }
            if self.token_is(TokenKind::Separator, ",") {
                self.advance()?;
            }
        }
    }

    fn bracket(&mut self) -> ParseResult<Expr> {
        self.advance()?;
        let inner = self.expression()?;
        if !self.token_is(TokenKind::Brace, ")") {
            return self.err(ParseErrType::ExpectedClosingBracket(self.text()));
        }
        self.advance()?;
        Ok(Expr::Bracket(Box::new(inner)))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse::{parse_expression, ParseErrType};

    fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::BinOp(op, Box::new(lhs), Box::new(rhs))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse_expression("1+2*3").unwrap(),
                   bin(BinaryOp::Add, Expr::int(1), bin(BinaryOp::Mul, Expr::int(2), Expr::int(3))));
        assert_eq!(parse_expression("1-2-3").unwrap(),
                   bin(BinaryOp::Sub, bin(BinaryOp::Sub, Expr::int(1), Expr::int(2)), Expr::int(3)));
        assert_eq!(parse_expression("A==1 OR B").unwrap(),
                   bin(BinaryOp::Eq, Expr::var("A"), bin(BinaryOp::Or, Expr::int(1), Expr::var("B"))));
    }

    #[test]
    fn test_unary() {
        assert_eq!(parse_expression("-5").unwrap(), Expr::int(-5));
        assert_eq!(parse_expression("+5").unwrap(), Expr::int(5));
        assert_eq!(parse_expression("NOT A").unwrap(),
                   Expr::UnOp(UnaryOp::Not, Box::new(Expr::var("A"))));
        assert_eq!(parse_expression("-R1").unwrap(),
                   Expr::UnOp(UnaryOp::Negate, Box::new(Expr::var("R1"))));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(parse_expression("2EX3").unwrap(), Expr::real(2000.));
        assert_eq!(parse_expression("5EX-1").unwrap(), Expr::real(0.5));
        assert_eq!(parse_expression("2EX").unwrap_err().errtype, ParseErrType::ExpectedNumber("".into()));
    }

    #[test]
    fn test_radix() {
        assert_eq!(parse_expression("'H1F'").unwrap(),
                   Expr::Num(Number { value: 31., is_integer: true, radix: Radix::Hex }));
        assert_eq!(parse_expression("'B101'").unwrap(),
                   Expr::Num(Number { value: 5., is_integer: true, radix: Radix::Binary }));
    }

    #[test]
    fn test_calls_and_fields() {
        assert_eq!(parse_expression("f(1,,2)").unwrap(),
                   Expr::Call(Function { name: "f".into(),
                                         args: vec![Some(Expr::int(1)), None, Some(Expr::int(2))] }));
        assert_eq!(parse_expression("R[1]").unwrap(),
                   Expr::Var(Variable { name: "R".into(), fields: Some(vec![Some(Expr::int(1))]) }));
        assert_eq!(parse_expression("(1)").unwrap(), Expr::Bracket(Box::new(Expr::int(1))));
    }

    #[test]
    fn test_errors() {
        let err = |text| parse_expression(text).unwrap_err().errtype;
        assert_eq!(err("(1+2"), ParseErrType::ExpectedClosingBracket("".into()));
        assert_eq!(err("R[1)"), ParseErrType::ExpectedClosingFieldBrace(")".into()));
        assert_eq!(err("1+"), ParseErrType::UnexpectedLineEnd);
        assert_eq!(err("1 NOT 2"), ParseErrType::ExpectedBinaryOperator("NOT".into()));
        assert_eq!(err("*2"), ParseErrType::ExpectedOperand("*".into()));
    }
}

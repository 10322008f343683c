// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Evaluation of expressions against a variable scope.

use std::fmt;

use crate::ast::*;
use crate::util::truncate;
use super::error::ProcessErrType;
use super::variables::Variables;

type EvalResult<T> = Result<T, ProcessErrType>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
}

impl Value {
    pub fn as_number(&self) -> EvalResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(s) => Err(ProcessErrType::ExpectedNumber(s.clone())),
        }
    }

    fn into_string(self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

fn truth(b: bool) -> Value {
    Value::Number(if b { 1.0 } else { 0.0 })
}

pub fn evaluate(expr: &Expr, vars: &Variables) -> EvalResult<Value> {
    Ok(match expr {
        Expr::Num(n) => Value::Number(n.value),
        Expr::Str(s) => Value::String(s.clone()),
        Expr::Var(v) => match vars.get(&v.name) {
            Some(value) => Value::Number(value),
            None => return Err(ProcessErrType::UnknownVariable(v.name.clone())),
        },
        Expr::Call(func) => return Err(ProcessErrType::UnsupportedFunction(func.name.clone())),
        Expr::Bracket(inner) => evaluate(inner, vars)?,
        Expr::UnOp(op, arg) => {
            let arg = evaluate(arg, vars)?;
            match op {
                UnaryOp::Not => truth(arg.as_number()? == 0.0),
                UnaryOp::BitNot => Value::Number(!truncate(arg.as_number()?) as f64),
                UnaryOp::Negate => Value::Number(-arg.as_number()?),
                UnaryOp::ToString => Value::String(arg.into_string()),
            }
        }
        Expr::BinOp(op, lhs, rhs) => {
            let lhs = evaluate(lhs, vars)?;
            let rhs = evaluate(rhs, vars)?;
            binary(*op, lhs, rhs)?
        }
    })
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> EvalResult<Value> {
    match op {
        BinaryOp::Concat => Ok(Value::String(lhs.into_string() + &rhs.into_string())),
        BinaryOp::Eq => Ok(truth(lhs == rhs)),
        BinaryOp::Ne => Ok(truth(lhs != rhs)),
        _ => numeric(op, lhs.as_number()?, rhs.as_number()?),
    }
}

fn numeric(op: BinaryOp, a: f64, b: f64) -> EvalResult<Value> {
    Ok(match op {
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(ProcessErrType::DivByZero);
            }
            Value::Number(a / b)
        }
        BinaryOp::IntDiv => {
            // the operands are truncated, the quotient is not
            let (a, b) = (truncate(a) as f64, truncate(b) as f64);
            if b == 0.0 {
                return Err(ProcessErrType::DivByZero);
            }
            Value::Number(a / b)
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(ProcessErrType::DivByZero);
            }
            Value::Number(a % b)
        }
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::BitAnd => Value::Number((truncate(a) & truncate(b)) as f64),
        BinaryOp::BitXor => Value::Number((truncate(a) ^ truncate(b)) as f64),
        BinaryOp::BitOr => Value::Number((truncate(a) | truncate(b)) as f64),
        BinaryOp::And => truth(a != 0.0 && b != 0.0),
        BinaryOp::Xor => truth((a != 0.0) != (b != 0.0)),
        BinaryOp::Or => truth(a != 0.0 || b != 0.0),
        BinaryOp::Concat => Value::String(format!("{}{}", a, b)),
        BinaryOp::Eq => truth(a == b),
        BinaryOp::Ne => truth(a != b),
        BinaryOp::Gt => truth(a > b),
        BinaryOp::Lt => truth(a < b),
        BinaryOp::Ge => truth(a >= b),
        BinaryOp::Le => truth(a <= b),
    })
}

/// Evaluates a condition; only numbers qualify, zero is false.
pub fn condition(expr: &Expr, vars: &Variables) -> EvalResult<bool> {
    match evaluate(expr, vars)? {
        Value::Number(n) => Ok(n != 0.0),
        Value::String(_) => Err(ProcessErrType::InvalidCondition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expression;

    fn eval(text: &str) -> EvalResult<Value> {
        let mut vars = Variables::new();
        vars.set("R1", 4.);
        evaluate(&parse_expression(text).unwrap(), &vars)
    }

    fn num(text: &str) -> f64 {
        eval(text).unwrap().as_number().unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(num("1+2*3"), 7.);
        assert_eq!(num("(1+2)*3"), 9.);
        assert_eq!(num("R1/8"), 0.5);
        assert_eq!(num("7 DIV 2"), 3.5);
        assert_eq!(num("-7 DIV 2"), -3.5);
        assert_eq!(num("7.9 DIV 2.6"), 3.5);
        assert_eq!(num("7 MOD 4"), 3.);
        assert_eq!(num("-R1"), -4.);
    }

    #[test]
    fn test_logic_and_bits() {
        assert_eq!(num("5 B_AND 3"), 1.);
        assert_eq!(num("5 B_OR 3"), 7.);
        assert_eq!(num("5 B_XOR 3"), 6.);
        assert_eq!(num("B_NOT 0"), -1.);
        assert_eq!(num("2 AND 3"), 1.);
        assert_eq!(num("0 OR 0"), 0.);
        assert_eq!(num("1 XOR 1"), 0.);
        assert_eq!(num("NOT 0"), 1.);
        assert_eq!(num("R1>3"), 1.);
        assert_eq!(num("R1<=3"), 0.);
    }

    #[test]
    fn test_strings() {
        assert_eq!(eval("\"a\"<<R1").unwrap(), Value::String("a4".into()));
        assert_eq!(eval("<<1.5").unwrap(), Value::String("1.5".into()));
        assert_eq!(num("\"a\"==\"a\""), 1.);
        assert_eq!(num("\"1\"==1"), 0.);
        assert_eq!(num("\"a\"<>\"b\""), 1.);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(eval("R2+1"), Err(ProcessErrType::UnknownVariable(ref v)) if v == "R2"));
        assert!(matches!(eval("1/0"), Err(ProcessErrType::DivByZero)));
        assert!(matches!(eval("1 MOD 0"), Err(ProcessErrType::DivByZero)));
        assert!(matches!(eval("1 DIV 0.5"), Err(ProcessErrType::DivByZero)));
        assert!(matches!(eval("SIN(1)"), Err(ProcessErrType::UnsupportedFunction(_))));
        assert!(matches!(eval("\"a\"+1"), Err(ProcessErrType::ExpectedNumber(_))));
        let vars = Variables::new();
        assert!(matches!(condition(&Expr::Str("x".into()), &vars), Err(ProcessErrType::InvalidCondition)));
        assert_eq!(condition(&Expr::int(2), &vars).unwrap(), true);
    }
}

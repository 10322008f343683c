// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::fmt::{self, Display, Formatter};
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::parse::lex::is_two_char_operator;

/// An NC program: the ordered blocks of one NC text.
///
/// Block order is significant, since gotos and subprogram returns address
/// blocks by their index in this list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub blocks: Vec<Block>,
}

/// One logical line of NC text.
///
/// E.g. `lab1: N100 G01 X10 ; feed` has the label `lab1`, the block number 100,
/// two statements and the comment `" feed"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    /// Physical line in the source text, starting at 1.
    pub lineno: usize,
    /// Number assigned by a leading `N` word.
    pub number: Option<i64>,
    pub labels: Vec<String>,
    pub statements: Vec<Statement>,
    /// Text of a trailing comment, without the comment character.
    pub comment: Option<String>,
}

impl Block {
    pub fn empty(lineno: usize) -> Self {
        Block { lineno, ..Block::default() }
    }

    /// Returns true if one of the block's labels equals `label`, ignoring case.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    Declaration(Declaration),
    GCode(GCode),
    MCode(MCode),
    Goto(Goto),
    Instruction(Instruction),
    FlowControl(FlowControl),
}

/// `X10`, `R1=5`, `R[2]=R1*2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub variable: String,
    pub fields: Option<Vec<Option<Expr>>>,
    pub value: Expr,
}

impl Assignment {
    pub fn new(variable: impl Into<String>, value: Expr) -> Self {
        Assignment { variable: variable.into(), fields: None, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub var_type: VariableType,
    /// Maximum length for `STRING[len]`.
    pub string_length: Option<u32>,
    pub unit: Option<i64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub variables: Vec<VariableDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    /// Array dimensions, e.g. `[2,3]`.
    pub field_lengths: Option<Vec<u32>>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum VariableType {
    Int,
    Real,
    Bool,
    Char,
    String,
    Axis,
    Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GCode {
    pub id: u32,
    /// Field brace arguments, only read if enabled in the parse options.
    pub args: Option<Vec<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MCode {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goto {
    pub direction: GotoDirection,
    /// Label (as a variable) or block number; `None` for `GOTOS`.
    pub target: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GotoDirection {
    /// `GOTOS`
    Start,
    /// `GOTOB`
    Backward,
    /// `GOTOF`
    Forward,
    /// `GOTO`
    Search,
    /// `GOTOC`
    SearchWithoutError,
}

impl GotoDirection {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "" => GotoDirection::Search,
            s if s.eq_ignore_ascii_case("S") => GotoDirection::Start,
            s if s.eq_ignore_ascii_case("B") => GotoDirection::Backward,
            s if s.eq_ignore_ascii_case("F") => GotoDirection::Forward,
            s if s.eq_ignore_ascii_case("C") => GotoDirection::SearchWithoutError,
            _ => return None,
        })
    }

    pub fn suffix(self) -> &'static str {
        match self {
            GotoDirection::Start => "S",
            GotoDirection::Backward => "B",
            GotoDirection::Forward => "F",
            GotoDirection::Search => "",
            GotoDirection::SearchWithoutError => "C",
        }
    }
}

/// A call of a named instruction or subprogram.
///
/// `args` is `None` for a bare name such as `TRANS` and `Some` for a call
/// like `MSG("x")`; gaps in the argument list are kept as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub name: String,
    pub args: Option<Vec<Option<Expr>>>,
}

impl Instruction {
    pub fn new(name: impl Into<String>) -> Self {
        Instruction { name: name.into(), args: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowControl {
    If(Expr),
    Else,
    EndIf,
    While(Expr),
    EndWhile,
    Repeat,
    Until(Expr),
    Loop,
    EndLoop,
    For { variable: Expr, initial: Expr, last: Expr },
    EndFor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FlowControlKind {
    If,
    Else,
    EndIf,
    While,
    EndWhile,
    Repeat,
    Until,
    Loop,
    EndLoop,
    For,
    EndFor,
}

impl FlowControl {
    pub fn kind(&self) -> FlowControlKind {
        match self {
            FlowControl::If(_) => FlowControlKind::If,
            FlowControl::Else => FlowControlKind::Else,
            FlowControl::EndIf => FlowControlKind::EndIf,
            FlowControl::While(_) => FlowControlKind::While,
            FlowControl::EndWhile => FlowControlKind::EndWhile,
            FlowControl::Repeat => FlowControlKind::Repeat,
            FlowControl::Until(_) => FlowControlKind::Until,
            FlowControl::Loop => FlowControlKind::Loop,
            FlowControl::EndLoop => FlowControlKind::EndLoop,
            FlowControl::For { .. } => FlowControlKind::For,
            FlowControl::EndFor => FlowControlKind::EndFor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Number),
    Str(String),
    Var(Variable),
    Call(Function),
    BinOp(BinaryOp, Box<Expr>, Box<Expr>),
    UnOp(UnaryOp, Box<Expr>),
    Bracket(Box<Expr>),
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Num(Number { value: value as f64, is_integer: true, radix: Radix::Decimal })
    }

    pub fn real(value: f64) -> Self {
        Expr::Num(Number { value, is_integer: false, radix: Radix::Decimal })
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(Variable { name: name.into(), fields: None })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    pub value: f64,
    /// Whether the literal was written without a decimal point.
    pub is_integer: bool,
    pub radix: Radix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    Decimal,
    /// `'H1F'`
    Hex,
    /// `'B101'`
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub fields: Option<Vec<Option<Expr>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<Option<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum BinaryOp {
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "DIV")]
    IntDiv,
    #[strum(serialize = "MOD")]
    Mod,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "B_AND")]
    BitAnd,
    #[strum(serialize = "B_XOR")]
    BitXor,
    #[strum(serialize = "B_OR")]
    BitOr,
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "XOR")]
    Xor,
    #[strum(serialize = "OR")]
    Or,
    #[strum(serialize = "<<")]
    Concat,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "<>")]
    Ne,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "<=")]
    Le,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn priority(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::BitAnd => 8,
            BinaryOp::BitXor => 7,
            BinaryOp::BitOr => 6,
            BinaryOp::And => 5,
            BinaryOp::Xor => 4,
            BinaryOp::Or => 3,
            BinaryOp::Concat => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Lt |
            BinaryOp::Ge | BinaryOp::Le => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "DIV",
            BinaryOp::Mod => "MOD",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::BitAnd => "B_AND",
            BinaryOp::BitXor => "B_XOR",
            BinaryOp::BitOr => "B_OR",
            BinaryOp::And => "AND",
            BinaryOp::Xor => "XOR",
            BinaryOp::Or => "OR",
            BinaryOp::Concat => "<<",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "<>",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
        }
    }

    pub fn is_named(self) -> bool {
        self.symbol().as_bytes()[0].is_ascii_alphabetic()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum UnaryOp {
    #[strum(serialize = "NOT")]
    Not,
    #[strum(serialize = "B_NOT")]
    BitNot,
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "<<")]
    ToString,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "NOT",
            UnaryOp::BitNot => "B_NOT",
            UnaryOp::Negate => "-",
            UnaryOp::ToString => "<<",
        }
    }
}

/// Writes a comma separated list, leaving gaps empty.
fn fmt_list(f: &mut Formatter, items: &[Option<Expr>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        if let Some(item) = item {
            write!(f, "{}", item)?;
        }
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{}", n),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Call(func) => {
                write!(f, "{}(", func.name)?;
                fmt_list(f, &func.args)?;
                f.write_str(")")
            }
            Expr::BinOp(op, lhs, rhs) => if op.is_named() {
                write!(f, "{} {} {}", lhs, op.symbol(), rhs)
            } else {
                // `A< <<B` must not be written as `A<<<B`
                let symbol = op.symbol();
                let rhs = rhs.to_string();
                match (symbol.bytes().last(), rhs.bytes().next()) {
                    (Some(last), Some(first)) if is_two_char_operator(last, first) =>
                        write!(f, "{}{} {}", lhs, symbol, rhs),
                    _ => write!(f, "{}{}{}", lhs, symbol, rhs),
                }
            },
            Expr::UnOp(op, arg) => match op {
                UnaryOp::Not | UnaryOp::BitNot => write!(f, "{} {}", op.symbol(), arg),
                _ => write!(f, "{}{}", op.symbol(), arg),
            },
            Expr::Bracket(inner) => write!(f, "({})", inner),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(fields) = &self.fields {
            f.write_str("[")?;
            fmt_list(f, fields)?;
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if !self.is_integer {
            // keep the decimal point so that the literal stays a real
            if self.value.is_finite() && self.value.fract() == 0.0 {
                return write!(f, "{}.", self.value);
            }
            return write!(f, "{}", self.value);
        }
        if !(self.value.abs() < i64::MAX as f64) {
            return write!(f, "{:.0}", self.value);
        }
        let value = self.value as i64;
        let sign = if value < 0 { "-" } else { "" };
        match self.radix {
            Radix::Decimal => write!(f, "{}", value),
            Radix::Hex => write!(f, "{}'H{:x}'", sign, value.unsigned_abs()),
            Radix::Binary => write!(f, "{}'B{:b}'", sign, value.unsigned_abs()),
        }
    }
}

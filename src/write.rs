// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Writing an AST back to canonical NC text.
//!
//! Expressions render through their `Display` impls; this module adds the
//! statement and block level rules.  Every written statement carries its own
//! trailing separator where one is needed, and each block's text is trimmed
//! on the right.

use std::fmt::{self, Write};
use itertools::Itertools;
use thiserror::Error;

use crate::ast::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("arguments to G{0:02} cannot be written")]
    GCodeArguments(u32),
    #[error("formatting failed")]
    Format(#[from] fmt::Error),
}

pub type WriteResult<T> = Result<T, WriteError>;

/// Renders one block as a single line without line terminator.
pub fn write_block(block: &Block) -> WriteResult<String> {
    let mut out = String::new();
    if let Some(number) = block.number {
        write!(out, "N{}", number)?;
    }
    for label in &block.labels {
        write!(out, "{}:", label)?;
    }
    for statement in &block.statements {
        write_statement(&mut out, statement)?;
    }
    if let Some(comment) = &block.comment {
        write!(out, ";{}", comment)?;
    }
    out.truncate(out.trim_end().len());
    Ok(out)
}

/// Renders each block of the program.
pub fn to_strings(program: &Program) -> WriteResult<Vec<String>> {
    program.blocks.iter().map(write_block).collect()
}

/// Renders the program, joining the blocks with `separator`.
pub fn to_string(program: &Program, separator: &str) -> WriteResult<String> {
    Ok(to_strings(program)?.join(separator))
}

fn write_fields(out: &mut String, fields: &Option<Vec<Option<Expr>>>) -> fmt::Result {
    if let Some(fields) = fields {
        write!(out, "[{}]", fields.iter().map(opt_expr).join(","))?;
    }
    Ok(())
}

fn opt_expr(expr: &Option<Expr>) -> String {
    expr.as_ref().map(Expr::to_string).unwrap_or_default()
}

pub fn write_statement(out: &mut String, statement: &Statement) -> WriteResult<()> {
    match statement {
        Statement::Assignment(assign) => {
            out.push_str(&assign.variable);
            match &assign.value {
                Expr::Num(number) if assign.variable.len() == 1 && assign.fields.is_none() => {
                    write!(out, "{}", number)?;
                }
                value => {
                    write_fields(out, &assign.fields)?;
                    write!(out, "={} ", value)?;
                }
            }
        }
        Statement::Declaration(decl) => write_declaration(out, decl)?,
        Statement::GCode(gcode) => {
            if gcode.args.is_some() {
                return Err(WriteError::GCodeArguments(gcode.id));
            }
            write!(out, "G{:02}", gcode.id)?;
        }
        Statement::MCode(mcode) => write!(out, "M{:02}", mcode.id)?,
        Statement::Goto(goto) => {
            write!(out, "GOTO{} ", goto.direction.suffix())?;
            if let Some(target) = &goto.target {
                write!(out, "{} ", target)?;
            }
        }
        Statement::Instruction(instr) => match &instr.args {
            Some(args) => write!(out, "{}({})", instr.name, args.iter().map(opt_expr).join(","))?,
            None => write!(out, "{} ", instr.name)?,
        },
        Statement::FlowControl(flow) => {
            match flow {
                FlowControl::If(cond) | FlowControl::While(cond) | FlowControl::Until(cond) =>
                    write!(out, "{} {}", flow.kind(), cond)?,
                FlowControl::For { variable, initial, last } =>
                    write!(out, "FOR {}={} TO {}", variable, initial, last)?,
                _ => write!(out, "{}", flow.kind())?,
            }
            out.push(' ');
        }
    }
    Ok(())
}

fn write_declaration(out: &mut String, decl: &Declaration) -> fmt::Result {
    write!(out, "DEF {}", decl.var_type)?;
    if let Some(len) = decl.string_length {
        write!(out, "[{}]", len)?;
    }
    out.push(' ');
    if let Some(unit) = decl.unit {
        write!(out, "PHU {} ", unit)?;
    }
    if let Some(lower) = decl.lower_limit {
        write!(out, "LLI {} ", lower)?;
    }
    if let Some(upper) = decl.upper_limit {
        write!(out, "ULI {} ", upper)?;
    }
    let variables = decl.variables.iter().map(|var| {
        let mut text = var.name.clone();
        if let Some(lengths) = &var.field_lengths {
            text.push_str(&format!("[{}]", lengths.iter().join(",")));
        }
        if let Some(init) = &var.init {
            text.push_str(&format!("={}", init));
        }
        text
    }).join(", ");
    write!(out, "{} ", variables)
}

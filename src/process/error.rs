// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use thiserror::Error;

use crate::ast::FlowControlKind;
use crate::parse::ErrorCategory;

#[derive(Debug, Error)]
#[error("error in line {lineno}: {errtype}")]
pub struct ProcessError {
    pub lineno: usize,
    pub errtype: ProcessErrType,
}

impl ProcessError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Semantic
    }

    /// The innermost error, following subprogram calls.
    pub fn root(&self) -> &ProcessError {
        match &self.errtype {
            ProcessErrType::Subprogram { source, .. } => source.root(),
            _ => self,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessErrType {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("unable to find goto target '{0}'")]
    UnknownGotoTarget(String),
    #[error("invalid goto target '{0}'")]
    InvalidGotoTarget(String),
    #[error("unsupported flow-control instruction '{0}'")]
    UnsupportedFlowControl(FlowControlKind),
    #[error("non-matching IF/ELSE/ENDIF")]
    IfElseMismatch,
    #[error("unexpected arguments in call to subprogram '{0}'")]
    UnexpectedSubprogramArgs(String),
    #[error("invalid conditional expression")]
    InvalidCondition,
    #[error("expected number in expression but found '{0}'")]
    ExpectedNumber(String),
    #[error("function '{0}' cannot be evaluated")]
    UnsupportedFunction(String),
    #[error("division by zero attempted")]
    DivByZero,
    #[error("in subprogram '{name}': {source}")]
    Subprogram {
        name: String,
        #[source]
        source: Box<ProcessError>,
    },
}

// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use thiserror::Error;

/// Broad classification of errors, shared by the parser and the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Syntactic,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("error in line {lineno}: {errtype}")]
pub struct ParseError {
    pub lineno: usize,
    pub errtype: ParseErrType,
}

impl ParseError {
    pub fn category(&self) -> ErrorCategory {
        self.errtype.category()
    }
}

/// The kinds of parse errors.  Variants with a string carry the text of the
/// token the parser stopped at.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrType {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("string does not end")]
    UnterminatedString,
    #[error("number constant does not end")]
    UnterminatedNumberConstant,
    #[error("invalid number with too many decimal points")]
    TooManyDecimalPoints,
    #[error("extra characters after brace comment")]
    ExtraCharsAfterBraceComment,
    #[error("unexpected end of line or file")]
    UnexpectedLineEnd,
    #[error("expected operand but found '{0}'")]
    ExpectedOperand(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("expected number but found '{0}'")]
    ExpectedNumber(String),
    #[error("expected integer number but found '{0}'")]
    ExpectedInteger(String),
    #[error("expected binary operator but found '{0}'")]
    ExpectedBinaryOperator(String),
    #[error("expected closing bracket but found '{0}'")]
    ExpectedClosingBracket(String),
    #[error("expected closing field brace ']' but found '{0}'")]
    ExpectedClosingFieldBrace(String),
    #[error("expected line end but found '{0}'")]
    ExpectedLineEnd(String),
    #[error("expected variable type but found '{0}'")]
    ExpectedVariableType(String),
    #[error("expected variable name but found '{0}'")]
    ExpectedVariableName(String),
    #[error("expected assignment but found instruction")]
    ExpectedAssignment,
    #[error("expected explicit assignment for variable with field braces '[]'")]
    UnexpectedFieldBraces,
    #[error("expected assignment or instruction but found expression")]
    ExpectedAssignmentOrInstruction,
    #[error("missing 'TO' keyword in FOR statement")]
    ExpectedToKeyword,
    #[error("expected block number but found expression")]
    ExpectedBlockNumber,
}

impl ParseErrType {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseErrType::InvalidCharacter(_) |
            ParseErrType::UnterminatedString |
            ParseErrType::UnterminatedNumberConstant |
            ParseErrType::TooManyDecimalPoints |
            ParseErrType::ExtraCharsAfterBraceComment => ErrorCategory::Lexical,
            _ => ErrorCategory::Syntactic,
        }
    }
}

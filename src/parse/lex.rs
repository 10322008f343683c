// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Contextual tokenizer for NC text.

use super::error::{ParseError, ParseErrType};
use super::ParseOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    NewLine,
    Comment,
    Identifier,
    Number,
    String,
    Operator,
    /// `[` or `]`
    FieldBrace,
    /// `(` or `)`
    Brace,
    /// `,`
    Separator,
    Colon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The token's text.  For comments, strings and number constants this is
    /// the content without delimiters.
    pub text: &'a str,
    /// Whether whitespace was skipped in front of the token.
    pub spaced: bool,
    /// Line the token starts on.
    pub lineno: usize,
}

impl<'a> Token<'a> {
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Decimal number token starting with a digit.
    pub fn is_decimal(&self) -> bool {
        self.kind == TokenKind::Number &&
            self.text.as_bytes().first().map_or(false, |c| c.is_ascii_digit())
    }
}

const NAMED_OPERATORS: &[&str] = &[
    "NOT", "B_NOT", "DIV", "MOD", "B_AND", "B_XOR", "B_OR", "AND", "XOR", "OR",
];

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_line_end(c: u8) -> bool {
    c == b'\r' || c == b'\n'
}

fn is_operator_char(c: u8) -> bool {
    b"*/+-<>=".contains(&c)
}

/// True if the lexer reads the two characters as a single operator.
pub fn is_two_char_operator(a: u8, b: u8) -> bool {
    matches!((a, b), (b'<', b'<') | (b'<', b'=') | (b'<', b'>') | (b'>', b'=') | (b'=', b'='))
}

/// Produces tokens lazily from NC text.
///
/// Line ends (`\r`, `\n` or `\r\n`) are reported as `NewLine` tokens, so that
/// empty lines still count.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    lineno: usize,
    options: ParseOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, options: ParseOptions) -> Self {
        Tokenizer { input, pos: 0, lineno: 1, options }
    }

    /// The line the tokenizer is currently on.
    pub fn lineno(&self) -> usize {
        self.lineno
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn at_line_end(&self) -> bool {
        self.peek().map_or(true, is_line_end)
    }

    fn error(&self, errtype: ParseErrType) -> ParseError {
        ParseError { lineno: self.lineno, errtype }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_line_end(c) || !c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        self.pos > start
    }

    /// Advances while `pred` holds and returns the consumed text.
    fn take_while(&mut self, mut pred: impl FnMut(&Self, u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(self, c) {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn read_line_end(&mut self) -> &'a str {
        let start = self.pos;
        if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
            self.pos += 2;
        } else {
            self.pos += 1;
        }
        self.lineno += 1;
        &self.input[start..self.pos]
    }

    fn read_single(&mut self) -> &'a str {
        self.pos += 1;
        &self.input[self.pos - 1..self.pos]
    }

    fn read_brace_comment(&mut self) -> Result<&'a str, ParseError> {
        self.pos += 1;
        let text = self.take_while(|_, c| !is_line_end(c) && c != b')');
        if self.peek() == Some(b')') {
            self.pos += 1;
            self.skip_whitespace();
            if !self.at_line_end() {
                return Err(self.error(ParseErrType::ExtraCharsAfterBraceComment));
            }
        }
        Ok(text)
    }

    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        self.pos += 1;
        let input = self.input;
        self.take_while(|this, c| {
            // A single letter followed by digits is a word like `N100` or
            // `X10`; `EX` followed by digits is a number exponent.
            let len = this.pos - start;
            let glued = len == 1 || (len == 2 && input[start..this.pos].eq_ignore_ascii_case("EX"));
            is_name_char(c) || (c.is_ascii_digit() && !glued)
        });
        &self.input[start..self.pos]
    }

    fn read_number(&mut self) -> Result<&'a str, ParseError> {
        let start = self.pos;
        let mut dot = false;
        while let Some(c) = self.peek() {
            if c == b'.' {
                if dot {
                    return Err(self.error(ParseErrType::TooManyDecimalPoints));
                }
                dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }
        Ok(&self.input[start..self.pos])
    }

    /// Reads the content between two `delim` characters on the same line.
    fn read_delimited(&mut self, delim: u8, err: ParseErrType) -> Result<&'a str, ParseError> {
        self.pos += 1;
        let text = self.take_while(|_, c| !is_line_end(c) && c != delim);
        if self.peek() != Some(delim) {
            return Err(self.error(err));
        }
        self.pos += 1;
        Ok(text)
    }

    fn read_operator(&mut self) -> &'a str {
        let start = self.pos;
        self.pos += 1;
        if let Some(next) = self.peek() {
            if is_two_char_operator(self.input.as_bytes()[start], next) {
                self.pos += 1;
            }
        }
        &self.input[start..self.pos]
    }

    fn read_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        let spaced = self.skip_whitespace();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };
        let lineno = self.lineno;
        let (kind, text) = match c {
            b'\r' | b'\n' => (TokenKind::NewLine, self.read_line_end()),
            b';' if self.options.line_comments => {
                self.pos += 1;
                (TokenKind::Comment, self.take_while(|_, c| !is_line_end(c)))
            }
            b'(' if self.options.brace_comments => (TokenKind::Comment, self.read_brace_comment()?),
            c if is_name_char(c) => {
                let name = self.read_name();
                if NAMED_OPERATORS.iter().any(|op| op.eq_ignore_ascii_case(name)) {
                    (TokenKind::Operator, name)
                } else {
                    (TokenKind::Identifier, name)
                }
            }
            b'\'' => (TokenKind::Number,
                      self.read_delimited(b'\'', ParseErrType::UnterminatedNumberConstant)?),
            c if c.is_ascii_digit() || c == b'.' => (TokenKind::Number, self.read_number()?),
            b'"' => (TokenKind::String, self.read_delimited(b'"', ParseErrType::UnterminatedString)?),
            b',' => (TokenKind::Separator, self.read_single()),
            b':' => (TokenKind::Colon, self.read_single()),
            b'(' | b')' => (TokenKind::Brace, self.read_single()),
            b'[' | b']' => (TokenKind::FieldBrace, self.read_single()),
            c if is_operator_char(c) => (TokenKind::Operator, self.read_operator()),
            _ => {
                let ch = self.input[self.pos..].chars().next().unwrap_or('?');
                return Err(self.error(ParseErrType::InvalidCharacter(ch)));
            }
        };
        Ok(Some(Token { kind, text, spaced, lineno }))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_token().transpose()
    }
}

/// Returns the numeric value of a number token, or `None` if malformed.
pub fn number_value(token: &Token) -> Option<f64> {
    if token.kind != TokenKind::Number {
        return None;
    }
    match token.text.as_bytes().first()? {
        b'h' | b'H' | b'b' | b'B' => integer_value(token).map(|v| v as f64),
        _ => token.text.parse().ok(),
    }
}

/// Returns the value of an integer number token (decimal, hex or binary).
pub fn integer_value(token: &Token) -> Option<i64> {
    if token.kind != TokenKind::Number {
        return None;
    }
    let text = token.text;
    match text.as_bytes().first()? {
        b'h' | b'H' => {
            let digits: String = text[1..].chars().filter(|&c| c != ' ').collect();
            i64::from_str_radix(&digits, 16).ok()
        }
        b'b' | b'B' => {
            let mut value = 0i64;
            for c in text[1..].chars() {
                match c {
                    '0' => value <<= 1,
                    '1' => value = (value << 1) + 1,
                    ' ' => (),
                    _ => return None,
                }
            }
            Some(value)
        }
        _ => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<(TokenKind, &str)> {
        Tokenizer::new(input, ParseOptions::default())
            .map(|t| t.map(|t| (t.kind, t.text)))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_glued_words() {
        use TokenKind::*;
        assert_eq!(tokens("N100X10"), vec![(Identifier, "N"), (Number, "100"),
                                           (Identifier, "X"), (Number, "10")]);
        assert_eq!(tokens("AB12"), vec![(Identifier, "AB12")]);
        assert_eq!(tokens("1EX3"), vec![(Number, "1"), (Identifier, "EX"), (Number, "3")]);
        assert_eq!(tokens("a and b"), vec![(Identifier, "a"), (Operator, "and"), (Identifier, "b")]);
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(tokens("<<<=<>>===<"), vec![(Operator, "<<"), (Operator, "<="), (Operator, "<>"),
                                               (Operator, ">="), (Operator, "=="), (Operator, "<")]);
        assert_eq!(tokens("--"), vec![(Operator, "-"), (Operator, "-")]);
    }

    #[test]
    fn test_delimited() {
        use TokenKind::*;
        assert_eq!(tokens("'H1F' \"a b\" ;rest"), vec![(Number, "H1F"), (String, "a b"), (Comment, "rest")]);
    }

    #[test]
    fn test_line_numbers() {
        let lines: Vec<_> = Tokenizer::new("A\r\nB\rC\n\nD", ParseOptions::default())
            .map(|t| t.unwrap())
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.lineno)
            .collect();
        assert_eq!(lines, vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_whitespace_flag() {
        let toks: Vec<_> = Tokenizer::new("X 1", ParseOptions::default()).map(|t| t.unwrap()).collect();
        assert!(!toks[0].spaced);
        assert!(toks[1].spaced);
    }

    #[test]
    fn test_brace_comment() {
        let options = ParseOptions { brace_comments: true, ..ParseOptions::default() };
        let toks: Vec<_> = Tokenizer::new("X1 (note)\n", options).map(|t| t.unwrap()).collect();
        assert_eq!(toks[2].kind, TokenKind::Comment);
        assert_eq!(toks[2].text, "note");
        let err = Tokenizer::new("(note) X1", options).find_map(|t| t.err()).unwrap();
        assert_eq!(err.errtype, ParseErrType::ExtraCharsAfterBraceComment);
    }

    #[test]
    fn test_lexical_errors() {
        let first_err = |input| Tokenizer::new(input, ParseOptions::default())
            .find_map(|t| t.err()).unwrap().errtype;
        assert_eq!(first_err("1.2.3"), ParseErrType::TooManyDecimalPoints);
        assert_eq!(first_err("\"abc"), ParseErrType::UnterminatedString);
        assert_eq!(first_err("'H12"), ParseErrType::UnterminatedNumberConstant);
        assert_eq!(first_err("X1 ?"), ParseErrType::InvalidCharacter('?'));
    }

    #[test]
    fn test_number_values() {
        let tok = |text| Token { kind: TokenKind::Number, text, spaced: false, lineno: 1 };
        assert_eq!(number_value(&tok("1.5")), Some(1.5));
        assert_eq!(number_value(&tok("H1F")), Some(31.));
        assert_eq!(number_value(&tok("hff 00")), Some(65280.));
        assert_eq!(number_value(&tok("B1 01")), Some(5.));
        assert_eq!(number_value(&tok("B102")), None);
        assert_eq!(number_value(&tok("X12")), None);
        assert_eq!(integer_value(&tok("12")), Some(12));
        assert_eq!(integer_value(&tok("1.2")), None);
    }
}

// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! A library to parse, write and interpret NC programs in the [Sinumerik]
//! dialect.
//!
//! NC text is parsed into an AST of blocks and statements, which can be
//! written back as canonical text.  With the *process* feature flag (on by
//! default), a `Processor` interprets the AST against a simulated machine
//! state and reports motions, dwells, unhandled codes and subprogram calls to
//! a callback.
//!
//! [Sinumerik]: https://www.siemens.com/sinumerik
//!
//! ## Basic usage
//!
//! Use `sinumerik::parse::parse` to get an AST, then work with the abstract
//! syntax tree datastructures from `sinumerik::ast`.
//!
//! The following code (the same as the "sinumerik-parse" demo binary) takes a
//! file as an argument, parses it and outputs the canonical form of the
//! program.
//!
//! ```rust,no_run
//! use std::{env, fs};
//! use sinumerik::{parse::parse, write::to_string};
//!
//! fn main() {
//!     let filename = env::args().nth(1).unwrap();
//!     let input = fs::read_to_string(&filename).unwrap();
//!
//!     match parse(&input) {
//!         Err(e) => eprintln!("Parse error: {}", e),
//!         Ok(prog) => println!("{}", to_string(&prog, "\n").unwrap()),
//!     }
//! }
//! ```
//!
//! ## Unsupported features
//!
//! Loops (`WHILE`, `REPEAT`, `FOR`, `LOOP`) are parsed, but the processor
//! rejects them.  Gotos always search the whole program, regardless of the
//! direction given.

pub mod ast;
pub mod parse;
pub mod write;

#[cfg(feature = "process")]
pub mod process;

#[doc(hidden)]
pub mod cli;

// internal helpers
pub(crate) mod util;

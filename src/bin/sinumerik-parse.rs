// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Parses an NC file and prints it in canonical form.

use std::{env, error::Error, fs, process};
use tracing::{event, Level};

use sinumerik::cli::init_tracing;
use sinumerik::parse::parse;
use sinumerik::write::to_string;

fn run() -> Result<(), Box<dyn Error>> {
    init_tracing()?;
    let filename = env::args().nth(1).ok_or("file name required")?;
    let input = fs::read_to_string(&filename)?;
    let program = parse(&input)?;
    event!(Level::INFO, "parsed {} blocks from {}", program.blocks.len(), filename);
    println!("{}", to_string(&program, "\n")?);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

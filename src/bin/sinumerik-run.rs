// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Interprets an NC file and prints the processor's notifications.
//!
//! Usage: `sinumerik-run main.nc [NAME=sub.nc ...]`, where each further
//! argument makes a file callable as subprogram `NAME`.

use std::{env, error::Error, fs, process};
use tracing::{event, Level};

use sinumerik::ast::{Block, GCode, Instruction, MCode, Program};
use sinumerik::cli::init_tracing;
use sinumerik::parse::parse;
use sinumerik::process::{ProcessCallback, Processor, State, Variables};

fn coord(vars: &Variables, name: &str) -> String {
    vars.get(name).map_or_else(|| "-".into(), |v| format!("{:.3}", v))
}

struct Printer;

impl ProcessCallback for Printer {
    fn on_enter_block(&mut self, index: usize, block: &Block, _: &Program) {
        println!("block {} (line {})", index, block.lineno);
    }

    fn on_instruction(&mut self, instruction: &Instruction) {
        println!("  instruction {}", instruction.name);
    }

    fn on_unhandled_mcode(&mut self, mcode: &MCode) {
        println!("  unhandled M{:02}", mcode.id);
    }

    fn on_unhandled_gcode(&mut self, gcode: &GCode) {
        println!("  unhandled G{:02}", gcode.id);
    }

    fn on_wait(&mut self, delay: Option<f64>) {
        match delay {
            Some(delay) => println!("  wait {}", delay),
            None => println!("  wait"),
        }
    }

    fn on_motion(&mut self, start: &Variables, end: &Variables, state: &State) {
        println!("  {:?} ({} {} {}) -> ({} {} {}) at {:.4} m/s", state.motion_mode,
                 coord(start, "X"), coord(start, "Y"), coord(start, "Z"),
                 coord(end, "X"), coord(end, "Y"), coord(end, "Z"),
                 state.velocity_m_per_s());
    }

    fn on_enter_subprogram(&mut self, name: &str, _: &Program) {
        println!("  enter {}", name);
    }

    fn on_leave_subprogram(&mut self, name: &str, _: &Program) {
        println!("  leave {}", name);
    }

    fn on_finish(&mut self) {
        println!("finished");
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    init_tracing()?;
    let mut args = env::args().skip(1);
    let filename = args.next().ok_or("file name required")?;
    let program = parse(&fs::read_to_string(&filename)?)?;

    let mut processor = Processor::new(Printer);
    for arg in args {
        let (name, path) = arg.split_once('=').ok_or("subprograms are given as NAME=file")?;
        processor.add_subprogram(name, parse(&fs::read_to_string(path)?)?);
        event!(Level::INFO, "loaded subprogram {} from {}", name, path);
    }
    processor.process(&program)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

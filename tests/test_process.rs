// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use test_strategy::{proptest, Arbitrary};

use sinumerik::ast::*;
use sinumerik::parse::{parse, ErrorCategory};
use sinumerik::process::*;

struct Move {
    mode: MotionMode,
    start: Variables,
    end: Variables,
}

#[derive(Default)]
struct Recorder {
    blocks: Vec<usize>,
    events: Vec<String>,
    moves: Vec<Move>,
}

impl ProcessCallback for Recorder {
    fn on_enter_block(&mut self, index: usize, _: &Block, _: &Program) {
        self.blocks.push(index);
    }

    fn on_instruction(&mut self, instruction: &Instruction) {
        self.events.push(format!("instr {}", instruction.name));
    }

    fn on_unhandled_mcode(&mut self, mcode: &MCode) {
        self.events.push(format!("M{}", mcode.id));
    }

    fn on_unhandled_gcode(&mut self, gcode: &GCode) {
        self.events.push(format!("G{}", gcode.id));
    }

    fn on_wait(&mut self, delay: Option<f64>) {
        self.events.push(format!("wait {:?}", delay));
    }

    fn on_motion(&mut self, start: &Variables, end: &Variables, state: &State) {
        self.events.push("motion".into());
        self.moves.push(Move { mode: state.motion_mode, start: start.clone(), end: end.clone() });
    }

    fn on_enter_subprogram(&mut self, name: &str, _: &Program) {
        self.events.push(format!("enter {}", name));
    }

    fn on_leave_subprogram(&mut self, name: &str, _: &Program) {
        self.events.push(format!("leave {}", name));
    }

    fn on_finish(&mut self) {
        self.events.push("finish".into());
    }
}

fn run(text: &str) -> Processor<Recorder> {
    let mut processor = Processor::new(Recorder::default());
    processor.process(&parse(text).unwrap()).unwrap();
    processor
}

fn run_err(text: &str) -> ProcessError {
    Processor::new(()).process(&parse(text).unwrap()).unwrap_err()
}

fn var(processor: &Processor<Recorder>, name: &str) -> Option<f64> {
    processor.state().variables.get(name)
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.map_or(false, |a| (a - b).abs() < 1e-9)
}

#[test]
fn test_linear_motion() {
    let p = run("G01X10Y20\nM30");
    let rec = p.callback();
    assert_eq!(rec.events, vec!["motion", "finish"]);
    let mv = &rec.moves[0];
    assert_eq!(mv.mode, MotionMode::Linear);
    assert_eq!((mv.start.get("X"), mv.start.get("Y")), (Some(0.), Some(0.)));
    assert_eq!((mv.end.get("X"), mv.end.get("Y")), (Some(10.), Some(20.)));
    assert_eq!(mv.end.get("Z"), None);
    assert_eq!(var(&p, "X"), Some(10.));
}

#[test]
fn test_blocks_entered() {
    let p = run("X1\n\nX2 M30\nX3");
    assert_eq!(p.callback().blocks, vec![0, 1, 2]);
    assert_eq!(var(&p, "X"), Some(2.));
}

#[test]
fn test_parameters() {
    let p = run("R1=5\nX=R1*2 R2=R1 DIV 2\nDEF INT R5=3, R6\nDEF STRING[4] TEXT=\"ab\"");
    assert_eq!(var(&p, "X"), Some(10.));
    assert_eq!(var(&p, "R2"), Some(2.5));
    assert_eq!(var(&p, "r5"), Some(3.));
    assert_eq!(var(&p, "R6"), Some(0.));
    assert_eq!(var(&p, "TEXT"), None);
}

#[test]
fn test_unhandled_codes() {
    let p = run("G17 M3 MSG(\"hi\")\nTOOLCHANGE");
    assert_eq!(p.callback().events, vec!["G17", "M3", "instr MSG", "instr TOOLCHANGE"]);
}

#[test]
fn test_if_else() {
    let p = run("G01\nIF 0\nG01 X1\nELSE\nG00 X2\nENDIF");
    assert_eq!(p.state().motion_mode, MotionMode::Quick);
    assert_eq!(var(&p, "X"), Some(2.));
    assert_eq!(p.callback().moves.len(), 1);

    let p = run("IF 0\nIF 1\nX5\nELSE\nX6\nENDIF\nELSE\nX7\nENDIF");
    assert_eq!(var(&p, "X"), Some(7.));

    let p = run("R1=2\nIF R1==2\nX1\nELSE\nX2\nENDIF");
    assert_eq!(var(&p, "X"), Some(1.));

    // loops inside skipped branches are not an error
    let p = run("IF 0\nWHILE 1\nENDWHILE\nENDIF\nX3");
    assert_eq!(var(&p, "X"), Some(3.));
}

#[test]
fn test_flow_errors() {
    assert!(matches!(run_err("ENDIF").errtype, ProcessErrType::IfElseMismatch));
    assert!(matches!(run_err("ELSE").errtype, ProcessErrType::IfElseMismatch));
    assert!(matches!(run_err("IF \"a\"").errtype, ProcessErrType::InvalidCondition));
    let err = run_err("X1\nWHILE 1");
    assert_eq!(err.lineno, 2);
    assert!(matches!(err.errtype, ProcessErrType::UnsupportedFlowControl(FlowControlKind::While)));
}

#[test]
fn test_unknown_variable() {
    let err = run_err("\nR1=R2+1");
    assert_eq!(err.lineno, 2);
    assert_eq!(err.category(), ErrorCategory::Semantic);
    assert!(matches!(err.errtype, ProcessErrType::UnknownVariable(ref name) if name == "R2"));
    assert_eq!(err.to_string(), "error in line 2: unknown variable 'R2'");
}

#[test]
fn test_subprogram() {
    let sub = parse("X5\nM17\nX99").unwrap();
    let mut p = Processor::new(Recorder::default()).with_subprogram("SUB1", sub);
    p.process(&parse("sub1\nY3\nM30").unwrap()).unwrap();
    assert_eq!(p.callback().events, vec!["enter sub1", "motion", "leave sub1", "motion", "finish"]);
    assert_eq!(var(&p, "X"), Some(5.));
    assert_eq!(var(&p, "Y"), Some(3.));

    // an empty argument list is accepted
    p.process(&parse("SUB1()").unwrap()).unwrap();
    assert_eq!(p.callback().events.len(), 8);
}

#[test]
fn test_subprogram_end() {
    let mut p = Processor::new(Recorder::default()).with_subprogram("SUB1", parse("M30").unwrap());
    p.process(&parse("SUB1\nX1").unwrap()).unwrap();
    assert_eq!(p.callback().events, vec!["enter SUB1", "finish"]);
    assert_eq!(var(&p, "X"), None);
}

#[test]
fn test_subprogram_errors() {
    let mut p = Processor::new(()).with_subprogram("SUB1", parse("X1\nR1=R9").unwrap());
    let err = p.process(&parse("SUB1(1)").unwrap()).unwrap_err();
    assert!(matches!(err.errtype, ProcessErrType::UnexpectedSubprogramArgs(_)));

    let err = p.process(&parse("\nSUB1").unwrap()).unwrap_err();
    assert_eq!(err.lineno, 2);
    assert!(matches!(err.errtype, ProcessErrType::Subprogram { ref name, .. } if name == "SUB1"));
    assert_eq!(err.root().lineno, 2);
    assert!(matches!(err.root().errtype, ProcessErrType::UnknownVariable(_)));
    assert_eq!(err.to_string(),
               "error in line 2: in subprogram 'SUB1': error in line 2: unknown variable 'R9'");
}

#[test]
fn test_goto() {
    let p = run("GOTOF skip\nX1\nskip: X2");
    assert_eq!(p.callback().moves.len(), 1);
    assert_eq!(var(&p, "X"), Some(2.));

    let p = run("GOTOF N30\nX1\nN30 X2");
    assert_eq!(p.callback().blocks, vec![0, 2]);

    let p = run("GOTO 30\nX1\nN30 X2");
    assert_eq!(p.callback().blocks, vec![0, 2]);

    // direction is not enforced: the whole program is searched
    let p = run("R1=0\nback: R1=R1+1\nIF R1<3\nGOTOF back\nENDIF");
    assert_eq!(var(&p, "R1"), Some(3.));

    assert!(matches!(run_err("GOTO nowhere").errtype,
                     ProcessErrType::UnknownGotoTarget(ref t) if t == "nowhere"));
    assert!(matches!(run_err("GOTO 1.5").errtype, ProcessErrType::InvalidGotoTarget(_)));
}

#[test]
fn test_dwell() {
    let p = run("G04 F2.5\nG01 F100 X1\nG04");
    assert_eq!(p.callback().events, vec!["wait Some(2.5)", "motion", "wait None"]);
    assert_eq!(var(&p, "F"), Some(100.));
}

#[test]
fn test_radius_arc() {
    let p = run("G02 X10 Y0 CR=10");
    let mv = &p.callback().moves[0];
    assert_eq!(mv.mode, MotionMode::Clockwise);
    assert!(close(mv.start.get("I"), 5.));
    assert!(close(mv.start.get("J"), -75f64.sqrt()));
    // the radius only applies to its own block
    assert_eq!(var(&p, "CR"), None);

    let p = run("G03 X10 Y0 CR=10");
    assert!(close(p.callback().moves[0].start.get("J"), 75f64.sqrt()));
}

#[test]
fn test_arc_centers() {
    let p = run("G01 X1 Y2\nG03 X10 I4");
    let mv = &p.callback().moves[1];
    // centers are relative to the start position; a missing one defaults to it
    assert!(close(mv.start.get("I"), 5.));
    assert!(close(mv.start.get("J"), 2.));
    assert_eq!(var(&p, "I"), None);
}

#[test]
fn test_distance_modes() {
    let p = run("G91 X5\nX5\nG90 X1");
    let ends: Vec<_> = p.callback().moves.iter().map(|m| m.end.get("X")).collect();
    assert_eq!(ends, vec![Some(5.), Some(10.), Some(1.)]);

    let p = run("X10\nX=IC(2)\nG91 Y=AC(3)");
    assert_eq!(var(&p, "X"), Some(12.));
    assert_eq!(var(&p, "Y"), Some(3.));

    // non-axis variables are always absolute
    let p = run("G91 R1=2\nR1=2");
    assert_eq!(var(&p, "R1"), Some(2.));
}

#[test]
fn test_inch() {
    let p = run("G70 X1 F10 A2\nG71 Y1");
    assert!(close(var(&p, "X"), 25.4));
    assert!(close(var(&p, "F"), 254.));
    assert_eq!(var(&p, "A"), Some(2.));
    assert_eq!(var(&p, "Y"), Some(1.));
}

#[test]
fn test_transformation() {
    let mut p = Processor::new(Recorder::default());
    p.process(&parse("TRANS X10\nG01 X5 Y5\nATRANS Y1").unwrap()).unwrap();
    {
        let mv = &p.callback().moves[0];
        assert!(close(mv.start.get("X"), 0.) && close(mv.start.get("Y"), 0.));
        assert!(close(mv.end.get("X"), 15.) && close(mv.end.get("Y"), 5.));
    }
    let trans = &p.state().transformation;
    assert_eq!((trans.variables.get("X"), trans.variables.get("Y")), (Some(10.), Some(1.)));

    p.process(&parse("TRANS\nX7").unwrap()).unwrap();
    assert!(p.state().transformation.is_identity());
    let mv = &p.callback().moves[1];
    assert!(close(mv.start.get("X"), 15.) && close(mv.start.get("Y"), 5.));
    assert!(close(mv.end.get("X"), 7.) && close(mv.end.get("Y"), 5.));
}

#[test]
fn test_rotation() {
    let p = run("ROT RPL=90\nG01 X1 Y0");
    let mv = &p.callback().moves[0];
    assert!(close(mv.end.get("X"), 0.));
    assert!(close(mv.end.get("Y"), 1.));
    // the program keeps working in its own coordinates
    assert!(close(var(&p, "X"), 1.));
}

#[test]
fn test_machine_definition() {
    let machine: MachineDefinition = serde_json::from_str(r#"{
        "linear_axes": [{"names": ["U", "V"], "center_names": ["P", "Q"]}],
        "initial_motion_mode": "Quick"
    }"#).unwrap();
    assert_eq!(machine.circular_axes, vec!["A", "B", "C"]);

    let mut p = Processor::with_machine(Recorder::default(), machine);
    assert_eq!(p.state().motion_mode, MotionMode::Quick);
    p.process(&parse("U3 V4\nX1").unwrap()).unwrap();
    let rec = p.callback();
    assert_eq!(rec.moves.len(), 1);
    assert_eq!(rec.moves[0].end.get("V"), Some(4.));
    assert_eq!(var(&p, "X"), Some(1.));
}

#[derive(Debug, Arbitrary)]
struct Operands {
    #[strategy(-1000..1000i64)]
    a: i64,
    #[strategy(-1000..1000i64)]
    b: i64,
    #[strategy(1..100i64)]
    c: i64,
}

#[proptest]
fn parameters_follow_precedence(input: Operands) {
    let text = format!("R1={}+{}*{}\nR2=({}-{}) MOD {}", input.a, input.b, input.c,
                       input.a, input.b, input.c);
    let p = run(&text);
    assert_eq!(var(&p, "R1"), Some((input.a + input.b * input.c) as f64));
    assert_eq!(var(&p, "R2"), Some(((input.a - input.b) % input.c) as f64));
}

// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Interpreting a program against a simulated machine state.
//!
//! The `Processor` walks the blocks of a program and reports what the machine
//! would do through a `ProcessCallback`.  Axis writes are not applied one by
//! one: all coordinates written in a block are collected and reported as one
//! motion from the start to the end position when the block is done.

mod error;
mod eval;
mod machine;
mod state;
mod transform;
mod variables;

use std::collections::HashMap;
use std::rc::Rc;
use tracing::{event, Level};

use crate::ast::*;
use crate::util::num_to_int;

pub use self::error::*;
pub use self::eval::{condition, evaluate, Value};
pub use self::machine::*;
pub use self::state::*;
pub use self::transform::Transformation;
pub use self::variables::Variables;

/// Receiver of the processor's notifications.  All methods default to doing
/// nothing.
pub trait ProcessCallback {
    fn on_enter_block(&mut self, _index: usize, _block: &Block, _program: &Program) {}
    /// An instruction that is neither a transformation nor a known subprogram.
    fn on_instruction(&mut self, _instruction: &Instruction) {}
    fn on_unhandled_mcode(&mut self, _mcode: &MCode) {}
    fn on_unhandled_gcode(&mut self, _gcode: &GCode) {}
    /// A dwell (G4), with the delay given by `F` in the same block.
    fn on_wait(&mut self, _delay: Option<f64>) {}
    /// A motion between two snapshots of the variables, in machine
    /// coordinates.  Arc centers are set in `start`.
    fn on_motion(&mut self, _start: &Variables, _end: &Variables, _state: &State) {}
    fn on_enter_subprogram(&mut self, _name: &str, _program: &Program) {}
    fn on_leave_subprogram(&mut self, _name: &str, _program: &Program) {}
    fn on_finish(&mut self) {}
}

impl ProcessCallback for () {}

type ProcResult<T> = Result<T, ProcessErrType>;

/// Where to continue after the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Jump {
    To(usize),
    /// Leave the current (sub)program.
    Return,
}

/// State of one open IF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Taken,
    SkipToElse,
    SkipToEndIf,
}

/// Values written in the current block, before and after.
#[derive(Debug, Default)]
struct Motion {
    start: Variables,
    end: Variables,
}

/// Instructions starting a new transformation, and whether they replace the
/// current one (as opposed to adding to it).
fn transformation_instruction(name: &str) -> Option<bool> {
    match name {
        "TRANS" | "ROT" => Some(true),
        "ATRANS" | "AROT" => Some(false),
        _ => None,
    }
}

/// Functions overriding the absolute/relative mode of one assignment, like
/// `X=IC(5)`.
fn position_override(name: &str) -> Option<bool> {
    match name.to_ascii_uppercase().as_str() {
        "AC" | "DC" | "ACP" | "ACN" => Some(true),
        "IC" => Some(false),
        _ => None,
    }
}

/// `N100` used as a goto target refers to the block number 100.
fn block_number_reference(name: &str) -> Option<i64> {
    let digits = name.strip_prefix('N').or_else(|| name.strip_prefix('n'))?;
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub struct Processor<C> {
    callback: C,
    state: State,
    programs: HashMap<String, Rc<Program>>,
    stopped: bool,
    jump: Option<Jump>,
    waiting: bool,
    wait_delay: Option<f64>,
    setting_transform: bool,
    motion: Option<Motion>,
    branches: Vec<Branch>,
}

impl<C: ProcessCallback> Processor<C> {
    pub fn new(callback: C) -> Self {
        Self::with_machine(callback, MachineDefinition::default())
    }

    pub fn with_machine(callback: C, machine: MachineDefinition) -> Self {
        Processor {
            callback,
            state: State::new(machine),
            programs: HashMap::new(),
            stopped: false,
            jump: None,
            waiting: false,
            wait_delay: None,
            setting_transform: false,
            motion: None,
            branches: Vec::new(),
        }
    }

    /// Makes `program` callable as an instruction named `name`.
    pub fn with_subprogram(mut self, name: &str, program: Program) -> Self {
        self.add_subprogram(name, program);
        self
    }

    pub fn add_subprogram(&mut self, name: &str, program: Program) {
        self.programs.insert(name.to_ascii_uppercase(), Rc::new(program));
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Runs the program until its last block or a program end (M2, M30).
    ///
    /// The machine state is kept between calls; block-level bookkeeping
    /// left over from a failed call is dropped.
    pub fn process(&mut self, program: &Program) -> Result<(), ProcessError> {
        self.stopped = false;
        self.jump = None;
        self.waiting = false;
        self.wait_delay = None;
        self.setting_transform = false;
        self.motion = None;
        self.branches.clear();
        self.run(program)
    }

    fn run(&mut self, program: &Program) -> Result<(), ProcessError> {
        let mut index = 0;
        while let Some(block) = program.blocks.get(index) {
            event!(Level::TRACE, "executing block {} (line {})", index, block.lineno);
            self.callback.on_enter_block(index, block, program);
            index += 1;

            for statement in &block.statements {
                if self.stopped {
                    break;
                }
                self.statement(statement, program)
                    .map_err(|errtype| ProcessError { lineno: block.lineno, errtype })?;
            }

            if self.waiting {
                self.flush_wait();
            }
            if let Some(motion) = self.motion.take() {
                self.flush_motion(motion);
            }
            if self.setting_transform {
                self.setting_transform = false;
                self.state.transformation.reverse_on(&self.state.machine, &mut self.state.variables);
            }

            if self.stopped {
                break;
            }
            match self.jump.take() {
                Some(Jump::To(target)) => index = target,
                Some(Jump::Return) => break,
                None => (),
            }
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement, program: &Program) -> ProcResult<()> {
        match statement {
            Statement::FlowControl(flow) => self.flow_control(flow),
            _ if self.ignoring() => Ok(()),
            Statement::Declaration(decl) => self.declaration(decl),
            Statement::Assignment(assign) => self.assignment(assign),
            Statement::GCode(gcode) => {
                self.gcode(gcode);
                Ok(())
            }
            Statement::MCode(mcode) => {
                self.mcode(mcode);
                Ok(())
            }
            Statement::Goto(goto) => self.goto(goto, program),
            Statement::Instruction(instr) => self.instruction(instr),
        }
    }

    fn ignoring(&self) -> bool {
        matches!(self.branches.last(), Some(Branch::SkipToElse) | Some(Branch::SkipToEndIf))
    }

    fn flow_control(&mut self, flow: &FlowControl) -> ProcResult<()> {
        match flow {
            FlowControl::If(cond) => {
                let branch = if self.ignoring() {
                    Branch::SkipToEndIf
                } else if condition(cond, &self.state.variables)? {
                    Branch::Taken
                } else {
                    Branch::SkipToElse
                };
                self.branches.push(branch);
            }
            FlowControl::Else => {
                let branch = match self.branches.pop() {
                    Some(Branch::SkipToElse) => Branch::Taken,
                    Some(_) => Branch::SkipToEndIf,
                    None => return Err(ProcessErrType::IfElseMismatch),
                };
                self.branches.push(branch);
            }
            FlowControl::EndIf => {
                if self.branches.pop().is_none() {
                    return Err(ProcessErrType::IfElseMismatch);
                }
            }
            _ if self.ignoring() => (),
            other => return Err(ProcessErrType::UnsupportedFlowControl(other.kind())),
        }
        Ok(())
    }

    fn declaration(&mut self, decl: &Declaration) -> ProcResult<()> {
        let zero = match decl.var_type {
            VariableType::Int => Expr::int(0),
            VariableType::Real => Expr::real(0.0),
            _ => return Ok(()),
        };
        for var in &decl.variables {
            let value = self.assigned_value(&var.name, var.init.as_ref().unwrap_or(&zero), false)?;
            self.state.variables.set(&var.name, value);
        }
        Ok(())
    }

    /// Computes the value an assignment stores, honoring the distance mode,
    /// `AC`/`IC` style overrides and inch units.  In the transformation
    /// context, values are absolute unless overridden and relative values
    /// refer to the transformation's parameters.
    fn assigned_value(&self, variable: &str, expr: &Expr, in_transform: bool) -> ProcResult<f64> {
        let machine = &self.state.machine;
        let mut absolute = if in_transform || self.state.absolute {
            machine.is_absolute_assignable(variable)
        } else {
            !machine.is_relative_assignable(variable)
        };
        let mut expr = expr;
        if let Expr::Call(func) = expr {
            if let [Some(arg)] = func.args.as_slice() {
                if let Some(mode) = position_override(&func.name) {
                    absolute = mode;
                    expr = arg;
                }
            }
        }

        let value = evaluate(expr, &self.state.variables)?.as_number()?;
        let value = if self.state.metric { value } else { machine.inch_to_mm(variable, value) };
        if absolute {
            return Ok(value);
        }
        let scope = if in_transform { &self.state.transformation.variables } else { &self.state.variables };
        Ok(scope.get_or_default(machine.reference_variable(variable)) + value)
    }

    fn assignment(&mut self, assign: &Assignment) -> ProcResult<()> {
        let name = assign.variable.as_str();
        if self.setting_transform {
            let value = self.assigned_value(name, &assign.value, true)?;
            event!(Level::DEBUG, "transformation parameter {} = {}", name, value);
            self.state.transformation.variables.set(name, value);
            return Ok(());
        }

        let value = self.assigned_value(name, &assign.value, false)?;
        let machine = &self.state.machine;
        let temporary = machine.is_temporary_motion_variable(name);
        let coordinate = machine.is_coordinate_or_center(name);

        if self.waiting && name.eq_ignore_ascii_case(VELOCITY) {
            self.wait_delay = Some(value);
        } else if temporary || coordinate {
            let canonical = self.state.variables.canonical_name(name);
            let current = self.state.variables.get_or_default(&canonical);
            let motion = self.motion.get_or_insert_with(Motion::default);
            if temporary {
                motion.start.set(&canonical, value);
            } else {
                motion.start.set(&canonical, current);
                motion.end.set(&canonical, value);
            }
        } else {
            self.state.variables.set(name, value);
        }
        Ok(())
    }

    fn gcode(&mut self, gcode: &GCode) {
        match gcode.id {
            0 => self.state.motion_mode = MotionMode::Quick,
            1 => self.state.motion_mode = MotionMode::Linear,
            2 => self.state.motion_mode = MotionMode::Clockwise,
            3 => self.state.motion_mode = MotionMode::CounterClockwise,
            4 => self.waiting = true,
            70 => self.state.metric = false,
            71 => self.state.metric = true,
            90 => self.state.absolute = true,
            91 => self.state.absolute = false,
            _ => {
                event!(Level::DEBUG, "unhandled code G{:02}", gcode.id);
                self.callback.on_unhandled_gcode(gcode);
            }
        }
    }

    fn mcode(&mut self, mcode: &MCode) {
        match mcode.id {
            2 | 30 => {
                event!(Level::DEBUG, "program end by M{:02}", mcode.id);
                self.stopped = true;
                self.callback.on_finish();
            }
            17 => self.jump = Some(Jump::Return),
            _ => {
                event!(Level::DEBUG, "unhandled code M{:02}", mcode.id);
                self.callback.on_unhandled_mcode(mcode);
            }
        }
    }

    fn goto(&mut self, goto: &Goto, program: &Program) -> ProcResult<()> {
        let by_number = |number: i64| program.blocks.iter().position(|b| b.number == Some(number));
        let (target, index) = match &goto.target {
            None => ("start".to_string(), Some(0)),
            Some(Expr::Var(var)) if var.fields.is_none() => {
                let index = match block_number_reference(&var.name) {
                    Some(number) => by_number(number),
                    None => program.blocks.iter().position(|b| b.has_label(&var.name)),
                };
                (var.name.clone(), index)
            }
            Some(Expr::Num(Number { value, is_integer: true, .. })) => {
                let number = num_to_int(*value, |v| ProcessErrType::InvalidGotoTarget(v.to_string()))?;
                (number.to_string(), by_number(number))
            }
            Some(other) => return Err(ProcessErrType::InvalidGotoTarget(other.to_string())),
        };
        match index {
            Some(index) => {
                self.jump = Some(Jump::To(index));
                Ok(())
            }
            None => Err(ProcessErrType::UnknownGotoTarget(target)),
        }
    }

    fn instruction(&mut self, instr: &Instruction) -> ProcResult<()> {
        let name = instr.name.to_ascii_uppercase();

        if let Some(replace) = transformation_instruction(&name) {
            self.state.transformation.apply_to(&self.state.machine, &mut self.state.variables);
            if replace {
                self.state.transformation.variables.clear_own();
            }
            event!(Level::DEBUG, "{} starts a transformation", name);
            self.setting_transform = true;
            return Ok(());
        }

        if let Some(sub) = self.programs.get(&name).cloned() {
            if instr.args.as_ref().map_or(false, |args| !args.is_empty()) {
                return Err(ProcessErrType::UnexpectedSubprogramArgs(instr.name.clone()));
            }
            event!(Level::DEBUG, "entering subprogram {}", name);
            self.callback.on_enter_subprogram(&instr.name, &sub);
            self.run(&sub).map_err(|err| ProcessErrType::Subprogram {
                name: instr.name.clone(),
                source: Box::new(err),
            })?;
            if !self.stopped {
                event!(Level::DEBUG, "leaving subprogram {}", name);
                self.callback.on_leave_subprogram(&instr.name, &sub);
            }
            return Ok(());
        }

        self.callback.on_instruction(instr);
        Ok(())
    }

    fn flush_wait(&mut self) {
        self.waiting = false;
        let delay = self.wait_delay.take();
        self.callback.on_wait(delay);
    }

    fn flush_motion(&mut self, motion: Motion) {
        for name in motion.end.own_names() {
            self.state.variables.set(name, motion.end.get_or_default(name));
        }

        let mut start = Variables::with_parent(self.state.variables.clone());
        let mut end = Variables::with_parent(self.state.variables.clone());
        for name in motion.start.own_names() {
            start.set(name, motion.start.get_or_default(name));
        }
        for name in motion.end.own_names() {
            end.set(name, motion.end.get_or_default(name));
        }

        self.center_from_radius(&mut start, &end);
        self.set_missing_centers(&mut start);
        let transformation = &self.state.transformation;
        transformation.apply_to(&self.state.machine, &mut start);
        transformation.apply_to(&self.state.machine, &mut end);

        self.callback.on_motion(&start, &end, &self.state);
    }

    /// Sets the center of an arc given by its signed radius (`CR`) in the
    /// plane of the first linear group.  A positive radius selects the arc
    /// below 180 degrees.
    fn center_from_radius(&self, start: &mut Variables, end: &Variables) {
        let axes = match self.state.machine.linear_axes.first() {
            Some(axes) if axes.names.len() >= 2 && axes.center_names.len() >= 2 => axes,
            _ => return,
        };
        let radius = match start.get(CENTER_RADIUS) {
            Some(radius) => radius,
            None => return,
        };
        let (x0, y0) = (start.get_or_default(&axes.names[0]), start.get_or_default(&axes.names[1]));
        let (x1, y1) = (end.get_or_default(&axes.names[0]), end.get_or_default(&axes.names[1]));

        let (dx, dy) = ((x1 - x0) / 2., (y1 - y0) / 2.);
        let half_chord_sq = dx * dx + dy * dy;
        if half_chord_sq == 0.0 {
            return;
        }
        let half_chord = half_chord_sq.sqrt();
        let offset = (radius * radius - half_chord_sq).max(0.0).sqrt();
        let sign = if self.state.motion_mode == MotionMode::Clockwise {
            radius.signum()
        } else {
            -radius.signum()
        };
        start.set(&axes.center_names[0], x0 + dx + sign * offset * dy / half_chord);
        start.set(&axes.center_names[1], y0 + dy - sign * offset * dx / half_chord);
    }

    /// In arc modes, a center coordinate not given in the block defaults to
    /// the start position on its axis.
    fn set_missing_centers(&self, start: &mut Variables) {
        if !self.state.motion_mode.is_arc() {
            return;
        }
        for (center, name) in self.state.machine.centers_and_references() {
            if !start.has(center) {
                if let Some(value) = start.get(name) {
                    start.set(center, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_number_reference() {
        assert_eq!(block_number_reference("N100"), Some(100));
        assert_eq!(block_number_reference("n5"), Some(5));
        assert_eq!(block_number_reference("N"), None);
        assert_eq!(block_number_reference("NEXT1"), None);
        assert_eq!(block_number_reference("LAB"), None);
    }

    #[test]
    fn test_position_override() {
        assert_eq!(position_override("ac"), Some(true));
        assert_eq!(position_override("IC"), Some(false));
        assert_eq!(position_override("ACN"), Some(true));
        assert_eq!(position_override("SIN"), None);
    }
}

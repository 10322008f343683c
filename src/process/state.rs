// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use serde::{Deserialize, Serialize};

use super::machine::{MachineDefinition, VELOCITY, VELOCITY_QUICK};
use super::transform::Transformation;
use super::variables::Variables;

const MM_PER_MIN_TO_M_PER_S: f64 = 1e-3 / 60.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionMode {
    /// G0
    Quick,
    /// G1
    Linear,
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

impl MotionMode {
    pub fn is_arc(self) -> bool {
        self == MotionMode::Clockwise || self == MotionMode::CounterClockwise
    }
}

/// Modal machine state while processing.
#[derive(Debug, Clone)]
pub struct State {
    pub variables: Variables,
    /// G90 (true) or G91 (false).
    pub absolute: bool,
    /// G71 (true) or G70 (false).
    pub metric: bool,
    pub motion_mode: MotionMode,
    pub transformation: Transformation,
    pub machine: MachineDefinition,
}

impl State {
    pub fn new(machine: MachineDefinition) -> Self {
        State {
            variables: Variables::new(),
            absolute: true,
            metric: true,
            motion_mode: machine.initial_motion_mode,
            transformation: Transformation::new(),
            machine,
        }
    }

    /// The feed of the current motion mode in m/s.  Feeds are stored in
    /// mm/min, since inch values are converted on assignment.
    pub fn velocity_m_per_s(&self) -> f64 {
        let name = if self.motion_mode == MotionMode::Quick { VELOCITY_QUICK } else { VELOCITY };
        self.variables.get_or_default(name) * MM_PER_MIN_TO_M_PER_S
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity() {
        let mut state = State::new(MachineDefinition::default());
        state.variables.set("F", 6000.);
        state.variables.set("E", 12000.);
        assert!((state.velocity_m_per_s() - 0.1).abs() < 1e-12);
        state.motion_mode = MotionMode::Quick;
        assert!((state.velocity_m_per_s() - 0.2).abs() < 1e-12);
        state.metric = false;
        assert!((state.velocity_m_per_s() - 0.2).abs() < 1e-12);
    }
}

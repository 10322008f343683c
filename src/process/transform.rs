// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use super::machine::{MachineDefinition, TRANSFORM_ANGLE, TRANSFORM_X, TRANSFORM_Y};
use super::variables::Variables;

/// A frame given by a rotation in the plane of the first two axes of each
/// linear group, followed by a translation.
///
/// The parameters live in their own variable scope: `RPL` is the angle in
/// degrees, `X` and `Y` are the offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformation {
    pub variables: Variables,
}

impl Transformation {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if neither a rotation nor an offset is set.
    pub fn is_identity(&self) -> bool {
        self.angle() == 0.0 && self.offset() == (0.0, 0.0)
    }

    fn angle(&self) -> f64 {
        self.variables.get_or_default(TRANSFORM_ANGLE)
    }

    fn offset(&self) -> (f64, f64) {
        (self.variables.get_or_default(TRANSFORM_X), self.variables.get_or_default(TRANSFORM_Y))
    }

    fn rotate(&self, (x, y): (f64, f64), sign: f64) -> (f64, f64) {
        let angle = sign * self.angle();
        if angle == 0.0 {
            return (x, y);
        }
        let (sin, cos) = angle.to_radians().sin_cos();
        (x * cos - y * sin, x * sin + y * cos)
    }

    fn translate(&self, (x, y): (f64, f64), sign: f64) -> (f64, f64) {
        let (dx, dy) = self.offset();
        (x + sign * dx, y + sign * dy)
    }

    /// Rotates, then translates a point.
    pub fn apply_to_point(&self, point: (f64, f64)) -> (f64, f64) {
        self.translate(self.rotate(point, 1.0), 1.0)
    }

    pub fn reverse_point(&self, point: (f64, f64)) -> (f64, f64) {
        self.rotate(self.translate(point, -1.0), -1.0)
    }

    pub fn apply_to(&self, machine: &MachineDefinition, variables: &mut Variables) {
        self.map_axes(machine, variables, |p| self.apply_to_point(p));
    }

    pub fn reverse_on(&self, machine: &MachineDefinition, variables: &mut Variables) {
        self.map_axes(machine, variables, |p| self.reverse_point(p));
    }

    fn map_axes(&self, machine: &MachineDefinition, variables: &mut Variables,
                func: impl Fn((f64, f64)) -> (f64, f64)) {
        for axes in &machine.linear_axes {
            if axes.names.len() >= 2 {
                map_pair(variables, &axes.names[0], &axes.names[1], &func, true);
            }
            if axes.center_names.len() >= 2 {
                map_pair(variables, &axes.center_names[0], &axes.center_names[1], &func, false);
            }
        }
    }
}

/// Maps one coordinate pair; with `force` unset, only if one of the two is set.
fn map_pair(variables: &mut Variables, x_name: &str, y_name: &str,
            func: impl Fn((f64, f64)) -> (f64, f64), force: bool) {
    let x = variables.get(x_name);
    let y = variables.get(y_name);
    if force || x.is_some() || y.is_some() {
        let (x, y) = func((x.unwrap_or(0.0), y.unwrap_or(0.0)));
        variables.set(x_name, x);
        variables.set(y_name, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_rotate_then_translate() {
        let mut trans = Transformation::new();
        trans.variables.set("RPL", 90.);
        trans.variables.set("X", 10.);
        assert!(close(trans.apply_to_point((1., 0.)), (10., 1.)));
        assert!(close(trans.reverse_point((10., 1.)), (1., 0.)));
    }

    #[test]
    fn test_apply_to_variables() {
        let machine = MachineDefinition::default();
        let mut trans = Transformation::new();
        assert!(trans.is_identity());
        trans.variables.set("Y", 5.);
        assert!(!trans.is_identity());

        let mut vars = Variables::new();
        vars.set("X", 1.);
        trans.apply_to(&machine, &mut vars);
        assert_eq!(vars.get("X"), Some(1.));
        assert_eq!(vars.get("Y"), Some(5.));
        // centers are left alone when neither is set
        assert_eq!(vars.get("I"), None);

        vars.set("J", 0.);
        trans.reverse_on(&machine, &mut vars);
        assert_eq!(vars.get("Y"), Some(0.));
        assert_eq!(vars.get("I"), Some(0.));
        assert_eq!(vars.get("J"), Some(-5.));
    }
}

// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Description of the machine's axes.

use serde::{Deserialize, Serialize};

use super::state::MotionMode;

pub const INCH_TO_MM: f64 = 25.4;
pub const CENTER_RADIUS: &str = "CR";
pub const VELOCITY_QUICK: &str = "E";
pub const VELOCITY: &str = "F";
pub const TRANSFORM_ANGLE: &str = "RPL";
pub const TRANSFORM_X: &str = "X";
pub const TRANSFORM_Y: &str = "Y";

/// A group of linear axes, e.g. `X Y Z`, with the names of the arc center
/// coordinates belonging to each axis, e.g. `I J K`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearAxes {
    pub names: Vec<String>,
    #[serde(default)]
    pub center_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineDefinition {
    pub linear_axes: Vec<LinearAxes>,
    pub circular_axes: Vec<String>,
    pub initial_motion_mode: MotionMode,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn contains(list: &[String], name: &str) -> bool {
    list.iter().any(|n| n.eq_ignore_ascii_case(name))
}

impl Default for MachineDefinition {
    /// Three linear axes `X Y Z` with centers `I J K` and circular axes `A B C`.
    fn default() -> Self {
        MachineDefinition {
            linear_axes: vec![LinearAxes { names: names(&["X", "Y", "Z"]),
                                           center_names: names(&["I", "J", "K"]) }],
            circular_axes: names(&["A", "B", "C"]),
            initial_motion_mode: MotionMode::Linear,
        }
    }
}

impl MachineDefinition {
    /// Pairs of (center name, axis name) over all linear groups.
    pub fn centers_and_references(&self) -> impl Iterator<Item=(&str, &str)> {
        self.linear_axes.iter().flat_map(|axes| {
            axes.center_names.iter().zip(&axes.names).map(|(c, n)| (c.as_str(), n.as_str()))
        })
    }

    /// The variable a relative value is added to: the axis for a center
    /// name, else the variable itself.
    pub fn reference_variable<'a>(&'a self, variable: &'a str) -> &'a str {
        self.centers_and_references()
            .find(|(center, _)| center.eq_ignore_ascii_case(variable))
            .map_or(variable, |(_, name)| name)
    }

    pub fn is_linear_coordinate(&self, variable: &str) -> bool {
        self.linear_axes.iter().any(|axes| contains(&axes.names, variable))
    }

    pub fn is_linear_center(&self, variable: &str) -> bool {
        self.linear_axes.iter().any(|axes| contains(&axes.center_names, variable))
    }

    pub fn is_circular_coordinate(&self, variable: &str) -> bool {
        contains(&self.circular_axes, variable)
    }

    pub fn is_coordinate(&self, variable: &str) -> bool {
        self.is_linear_coordinate(variable) || self.is_circular_coordinate(variable)
    }

    pub fn is_coordinate_or_center(&self, variable: &str) -> bool {
        self.is_coordinate(variable) || self.is_linear_center(variable)
    }

    pub fn is_absolute_assignable(&self, variable: &str) -> bool {
        !self.is_linear_center(variable)
    }

    pub fn is_relative_assignable(&self, variable: &str) -> bool {
        self.is_coordinate_or_center(variable) ||
            [TRANSFORM_ANGLE, TRANSFORM_X, TRANSFORM_Y].iter().any(|n| n.eq_ignore_ascii_case(variable))
    }

    /// Variables that only matter for the motion of the current block.
    pub fn is_temporary_motion_variable(&self, variable: &str) -> bool {
        self.is_linear_center(variable) || variable.eq_ignore_ascii_case(CENTER_RADIUS)
    }

    pub fn is_length(&self, variable: &str) -> bool {
        self.is_linear_coordinate(variable) || self.is_linear_center(variable)
    }

    pub fn is_velocity(&self, variable: &str) -> bool {
        variable.eq_ignore_ascii_case(VELOCITY) || variable.eq_ignore_ascii_case(VELOCITY_QUICK)
    }

    /// Converts inch (or inch/min) to mm (or mm/min) for lengths and
    /// velocities; other values are returned unchanged.
    pub fn inch_to_mm(&self, variable: &str, value: f64) -> f64 {
        if self.is_length(variable) || self.is_velocity(variable) {
            INCH_TO_MM * value
        } else {
            value
        }
    }
}

// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::collections::HashMap;

/// Named numeric values with an optional parent scope.
///
/// Names are case-insensitive.  Lookups fall through to the parent when a
/// name is not set in this scope; writes always go to this scope.  Aliases
/// redirect one name to another and are resolved through the parent's
/// aliases first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, f64>,
    aliases: HashMap<String, String>,
    parent: Option<Box<Variables>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new empty scope on top of `parent`.
    pub fn with_parent(parent: Variables) -> Self {
        Variables { parent: Some(Box::new(parent)), ..Self::default() }
    }

    /// The enclosing scope, if any.
    pub fn parent(&self) -> Option<&Variables> {
        self.parent.as_deref()
    }

    /// The upper-cased name after resolving aliases.
    pub fn canonical_name(&self, name: &str) -> String {
        let name = match &self.parent {
            Some(parent) => parent.canonical_name(name),
            None => name.to_ascii_uppercase(),
        };
        match self.aliases.get(&name) {
            Some(target) => target.clone(),
            None => name,
        }
    }

    pub fn set_alias(&mut self, name: &str, target: &str) {
        self.aliases.insert(name.to_ascii_uppercase(), target.to_ascii_uppercase());
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.lookup(&self.canonical_name(name))
    }

    fn lookup(&self, resolved: &str) -> Option<f64> {
        match self.values.get(resolved) {
            Some(&value) => Some(value),
            None => self.parent.as_ref().and_then(|p| p.lookup(resolved)),
        }
    }

    pub fn get_or_default(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    /// Whether the name is set here or in a parent scope.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.values.contains_key(&self.canonical_name(name))
    }

    pub fn set(&mut self, name: &str, value: f64) {
        let name = self.canonical_name(name);
        self.values.insert(name, value);
    }

    /// Names set in this scope, sorted.
    pub fn own_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear_own(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let mut vars = Variables::new();
        vars.set("r1", 5.);
        assert_eq!(vars.get("R1"), Some(5.));
        assert!(vars.has_own("R1"));
        assert_eq!(vars.own_names(), vec!["R1"]);
    }

    #[test]
    fn test_parent_chain() {
        let mut parent = Variables::new();
        parent.set("X", 1.);
        parent.set("Y", 2.);
        let mut child = Variables::with_parent(parent);
        child.set("X", 10.);
        assert_eq!(child.get("X"), Some(10.));
        assert_eq!(child.get("Y"), Some(2.));
        assert_eq!(child.get("Z"), None);
        assert_eq!(child.get_or_default("Z"), 0.);
        assert!(child.has("Y"));
        assert!(!child.has_own("Y"));
        assert_eq!(child.parent().and_then(|p| p.get("X")), Some(1.));
        child.clear_own();
        assert_eq!(child.get("X"), Some(1.));
    }

    #[test]
    fn test_aliases() {
        let mut parent = Variables::new();
        parent.set_alias("radius", "r1");
        let mut child = Variables::with_parent(parent);
        child.set_alias("R1", "R2");
        child.set("radius", 3.);
        assert_eq!(child.get("R2"), Some(3.));
        assert_eq!(child.own_names(), vec!["R2"]);
    }
}

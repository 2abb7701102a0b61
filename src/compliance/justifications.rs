//! Index from standard and control keys to the components satisfying them.

use std::collections::HashMap;

/// Position of one satisfies entry inside the component list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Justification {
    pub component: usize,
    pub satisfies: usize,
}

/// standard key -> control key -> justifications, each list kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Justifications {
    mapping: HashMap<String, HashMap<String, Vec<Justification>>>,
}

impl Justifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, standard: &str, control: &str, justification: Justification) {
        self.mapping
            .entry(standard.to_string())
            .or_default()
            .entry(control.to_string())
            .or_default()
            .push(justification);
    }

    /// Justifications for a standard and control; empty for unknown pairs.
    pub fn get(&self, standard: &str, control: &str) -> &[Justification] {
        self.mapping
            .get(standard)
            .and_then(|controls| controls.get(control))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct standard/control pairs.
    pub fn len(&self) -> usize {
        self.mapping.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

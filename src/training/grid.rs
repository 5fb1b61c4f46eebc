//! Hyperparameter grids and their cartesian expansion

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One concrete hyperparameter assignment drawn from a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet(BTreeMap<String, f64>);

impl ParamSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn get_usize(&self, name: &str) -> Option<usize> {
        self.get(name).map(|v| v as usize)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ParamSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "defaults");
        }
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Exhaustive grid of candidate hyperparameter values.
///
/// Parameter names are kept ordered so expansion (and everything downstream,
/// including tie-breaks on equal scores) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamGrid {
    values: BTreeMap<String, Vec<f64>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        self.values.insert(name.into(), values.to_vec());
        self
    }

    /// Number of configurations the grid expands to.
    pub fn len(&self) -> usize {
        self.values.values().map(|v| v.len().max(1)).product()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cartesian expansion. An empty grid yields the single default
    /// configuration so every candidate is evaluated at least once.
    pub fn expand(&self) -> Vec<ParamSet> {
        let mut sets = vec![ParamSet::default()];
        for (name, candidates) in &self.values {
            if candidates.is_empty() {
                continue;
            }
            let mut next = Vec::with_capacity(sets.len() * candidates.len());
            for set in &sets {
                for value in candidates {
                    let mut expanded = set.clone();
                    expanded.insert(name.clone(), *value);
                    next.push(expanded);
                }
            }
            sets = next;
        }
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_yields_defaults() {
        let sets = ParamGrid::new().expand();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].is_empty());
    }

    #[test]
    fn test_cartesian_expansion() {
        let grid = ParamGrid::new()
            .with("alpha", &[0.1, 1.0])
            .with("max_depth", &[4.0, 8.0, 16.0]);

        let sets = grid.expand();
        assert_eq!(sets.len(), 6);
        assert_eq!(grid.len(), 6);

        // Every combination appears exactly once
        let mut seen: Vec<(f64, f64)> = sets
            .iter()
            .map(|s| (s.get("alpha").unwrap(), s.get("max_depth").unwrap()))
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let grid = ParamGrid::new().with("b", &[1.0, 2.0]).with("a", &[3.0]);
        assert_eq!(grid.expand(), grid.expand());
    }

    #[test]
    fn test_param_set_display() {
        let mut set = ParamSet::default();
        assert_eq!(set.to_string(), "defaults");
        set.insert("alpha", 0.5);
        assert_eq!(set.to_string(), "alpha=0.5");
    }
}

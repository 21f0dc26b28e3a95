//! This module provides a struct for representing reactions
use crate::configuration::CONFIGURATION;
use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    ///
    /// Negative coefficients are substrates, positive coefficients are products
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
    /// Reaction Activity
    #[builder(default = "ReactionActivity::Active")]
    pub activity: ReactionActivity,
}

impl Reaction {
    /// Whether the reaction can carry flux in both directions
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0f64 && self.upper_bound > 0f64
    }

    /// Whether the reaction can only run from its products to its substrates
    pub fn is_backward_only(&self) -> bool {
        self.lower_bound < 0f64 && self.upper_bound <= 0f64
    }

    /// Metabolites on one side of the reaction as written
    pub fn side(&self, side: Side) -> Vec<&str> {
        self.metabolites
            .iter()
            .filter(|(_, coef)| match side {
                Side::Left => **coef < 0f64,
                Side::Right => **coef > 0f64,
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// The directed steps this reaction can perform
    ///
    /// A reversible reaction yields a forward and a backward step, a backward-only reaction
    /// yields only the backward step.
    pub fn steps(&self) -> Vec<ReactionStep<'_>> {
        let left = self.side(Side::Left);
        let right = self.side(Side::Right);
        let forward = ReactionStep {
            direction: StepDirection::Forward,
            inputs: left.clone(),
            outputs: right.clone(),
        };
        let backward = ReactionStep {
            direction: StepDirection::Backward,
            inputs: right,
            outputs: left,
        };
        if self.is_reversible() {
            vec![forward, backward]
        } else if self.is_backward_only() {
            vec![backward]
        } else {
            vec![forward]
        }
    }

    /// Whether the reaction takes part in graph projections
    pub fn is_active(&self) -> bool {
        matches!(self.activity, ReactionActivity::Active)
    }
}

/// Side of a reaction equation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Substrates of the reaction as written
    Left,
    /// Products of the reaction as written
    Right,
}

/// Whether a step follows the reaction as written or its reverse
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepDirection {
    Forward,
    Backward,
}

/// One direction of a reaction: what it consumes and what it produces
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionStep<'a> {
    pub direction: StepDirection,
    pub inputs: Vec<&'a str>,
    pub outputs: Vec<&'a str>,
}

/// Whether a Reaction is active or inactive
#[derive(Clone, Debug, PartialEq)]
pub enum ReactionActivity {
    /// The Reaction is active and can carry flux
    Active,
    /// The Reaction is inactive and can't carry flux
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction(lower: f64, upper: f64) -> Reaction {
        ReactionBuilder::default()
            .id("r".to_string())
            .metabolites(IndexMap::from([
                ("a".to_string(), -1.0),
                ("b".to_string(), -2.0),
                ("c".to_string(), 1.0),
            ]))
            .lower_bound(lower)
            .upper_bound(upper)
            .build()
            .unwrap()
    }

    #[test]
    fn sides() {
        let rxn = reaction(0., 1000.);
        assert_eq!(rxn.side(Side::Left), vec!["a", "b"]);
        assert_eq!(rxn.side(Side::Right), vec!["c"]);
    }

    #[test]
    fn irreversible_steps() {
        let rxn = reaction(0., 1000.);
        let steps = rxn.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].direction, StepDirection::Forward);
        assert_eq!(steps[0].inputs, vec!["a", "b"]);
        assert_eq!(steps[0].outputs, vec!["c"]);
    }

    #[test]
    fn reversible_steps() {
        let rxn = reaction(-1000., 1000.);
        assert!(rxn.is_reversible());
        let steps = rxn.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].direction, StepDirection::Backward);
        assert_eq!(steps[1].inputs, vec!["c"]);
        assert_eq!(steps[1].outputs, vec!["a", "b"]);
    }

    #[test]
    fn backward_only_steps() {
        let rxn = reaction(-1000., 0.);
        assert!(!rxn.is_reversible());
        assert!(rxn.is_backward_only());
        let steps = rxn.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].direction, StepDirection::Backward);
        assert_eq!(steps[0].inputs, vec!["c"]);
    }

    #[test]
    fn default_bounds_are_irreversible() {
        let rxn = ReactionBuilder::default()
            .id("r".to_string())
            .build()
            .unwrap();
        assert!(!rxn.is_reversible());
        assert!(rxn.is_active());
    }
}

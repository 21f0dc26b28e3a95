//! This module provides the pathway struct, a named group of reactions
use derive_builder::Builder;
use indexmap::IndexSet;

/// Represents a pathway (or subsystem) of the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Pathway {
    /// Used to identify the pathway
    pub id: String,
    /// Human readable pathway name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Ids of the reactions belonging to the pathway
    #[builder(default = "IndexSet::new()")]
    pub reactions: IndexSet<String>,
}

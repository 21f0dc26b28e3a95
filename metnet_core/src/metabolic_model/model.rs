//! This module provides the Model struct for representing an entire metabolic model
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::pathway::Pathway;
use crate::metabolic_model::reaction::{Reaction, Side};

use indexmap::{IndexMap, IndexSet};

/// Represents a Genome Scale Metabolic Model
///
/// Graph projections only read from the model, see [`crate::graph::projection`].
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of pathway ids to Pathway Objects
    pub pathways: IndexMap<String, Pathway>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model::default()
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use metnet_core::metabolic_model::model::Model;
    /// use metnet_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction);
    /// assert!(model.contains_reaction("new_reaction"));
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Add a pathway to the model
    pub fn add_pathway(&mut self, pathway: Pathway) {
        let id = pathway.id.clone();
        self.pathways.insert(id, pathway);
    }

    // region Catalog queries
    /// All metabolites, in insertion order
    pub fn list_species(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    /// All reactions, in insertion order
    pub fn list_reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    /// All pathways, in insertion order
    pub fn list_pathways(&self) -> impl Iterator<Item = &Pathway> {
        self.pathways.values()
    }

    /// Compartment of a metabolite, None if the metabolite is unknown or has no compartment
    pub fn compartment_of(&self, id: &str) -> Option<&str> {
        self.metabolites
            .get(id)
            .and_then(|m| m.compartment.as_deref())
    }

    /// Metabolites on one side of a reaction, None if the reaction is unknown
    pub fn reactants_of(&self, reaction: &str, side: Side) -> Option<Vec<&str>> {
        self.reactions.get(reaction).map(|r| r.side(side))
    }

    /// Whether a reaction is reversible, None if the reaction is unknown
    pub fn is_reversible(&self, reaction: &str) -> Option<bool> {
        self.reactions.get(reaction).map(|r| r.is_reversible())
    }

    pub fn contains_species(&self, id: &str) -> bool {
        self.metabolites.contains_key(id)
    }

    pub fn contains_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    pub fn contains_pathway(&self, id: &str) -> bool {
        self.pathways.contains_key(id)
    }

    /// Whether any entity of the model has this id
    pub fn contains(&self, id: &str) -> bool {
        self.contains_species(id) || self.contains_reaction(id) || self.contains_pathway(id)
    }

    /// Metabolites taking part in the reactions of a pathway
    pub fn species_of_pathway(&self, pathway: &str) -> IndexSet<&str> {
        let mut species = IndexSet::new();
        if let Some(p) = self.pathways.get(pathway) {
            for rxn in p.reactions.iter().filter_map(|r| self.reactions.get(r)) {
                for met in rxn.metabolites.keys() {
                    if self.metabolites.contains_key(met) {
                        species.insert(met.as_str());
                    }
                }
            }
        }
        species
    }
    // endregion Catalog queries

    /// Group reactions into pathways by their subsystem
    ///
    /// Pathway ids are the subsystem names, reactions without a subsystem are not assigned.
    pub fn pathways_from_subsystems(&self) -> IndexMap<String, Pathway> {
        let mut pathways: IndexMap<String, Pathway> = IndexMap::new();
        for rxn in self.reactions.values() {
            if let Some(subsystem) = rxn.subsystem.as_ref() {
                pathways
                    .entry(subsystem.clone())
                    .or_insert_with(|| Pathway {
                        id: subsystem.clone(),
                        name: Some(subsystem.clone()),
                        reactions: IndexSet::new(),
                    })
                    .reactions
                    .insert(rxn.id.clone());
            }
        }
        pathways
    }
}

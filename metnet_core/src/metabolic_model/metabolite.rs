//! This module provides the metabolite struct representing a metabolite

use derive_builder::Builder;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// SMILES string describing the structure of the metabolite
    #[builder(default = "None")]
    pub smiles: Option<String>,
    /// InChI string describing the structure of the metabolite
    #[builder(default = "None")]
    pub inchi: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Create a metabolite with only an id
    pub fn new(id: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: None,
            formula: None,
            smiles: None,
            inchi: None,
            annotation: None,
        }
    }

    /// Structure string used for fingerprinting, SMILES is preferred over InChI
    pub fn structure(&self) -> Option<&str> {
        self.smiles
            .as_deref()
            .or(self.inchi.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

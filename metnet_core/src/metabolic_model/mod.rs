//! Module providing the Model struct for representing a metabolic model, the catalog every graph
//! projection is built from.

pub mod metabolite;
pub mod model;
pub mod pathway;
pub mod reaction;

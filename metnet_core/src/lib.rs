//! Graph analysis of metabolic networks.
//!
//! A [`Model`](metabolic_model::model::Model) is projected into one of four
//! [graph views](graph::ProjectionKind), optionally weighted by a
//! [weighting policy](weighting::WeightingPolicy), and analysed with path searches, Steiner tree
//! approximation, scope and precursor expansions, or centrality measures.

pub mod centrality;
pub mod configuration;
pub mod expansion;
pub mod graph;
pub mod metabolic_model;
pub mod paths;
pub mod steiner;
pub mod weighting;
mod utils;

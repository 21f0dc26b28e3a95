//! Edge weighting policies
//!
//! A policy assigns a weight to every edge of a graph in place. After any policy, edges whose
//! weight is not a finite, strictly positive number are removed, so shortest path searches and power
//! iteration never see them.
use tracing::debug;

use crate::graph::{EdgeEntry, EdgeIndex, MetabolicGraph};

pub mod degree;
pub mod external;
pub mod probability;
pub mod similarity;

pub use degree::{DegreeWeighting, DegreeWeightingBuilder};
pub use external::{ExternalWeights, WeightKey, WeightTable};
pub use probability::ProbabilityNormalization;
pub use similarity::{Fingerprint, SimilarityWeighting};

/// Counts describing what a policy did to a graph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightingReport {
    /// Edges which received a weight
    pub assigned: usize,
    /// Edges the policy could not weight, reset to the default weight
    pub unassigned: usize,
    /// Edges the policy could not weight and removed
    pub removed_unassigned: usize,
    /// Edges removed because their weight was NaN, infinite or not positive
    pub removed_invalid: usize,
    /// Policy inputs (table entries, vertices) which could not be used
    pub skipped: usize,
}

/// A rule assigning weights to the edges of a graph
pub trait WeightingPolicy {
    fn apply(&self, graph: &mut MetabolicGraph) -> WeightingReport;
}

/// Every edge weighs 1
#[derive(Clone, Copy, Debug, Default)]
pub struct Unweighted;

impl WeightingPolicy for Unweighted {
    fn apply(&self, graph: &mut MetabolicGraph) -> WeightingReport {
        assign_weights(graph, false, |_, _| Some(1.0))
    }
}

/// Weight every edge with `weight_of`, then drop invalid weights
///
/// Weights are all computed before any is written, so a policy reading the graph (degrees,
/// neighbours) sees the graph as it was before the policy ran.
pub(crate) fn assign_weights<F>(
    graph: &mut MetabolicGraph,
    remove_unassigned: bool,
    weight_of: F,
) -> WeightingReport
where
    F: Fn(&MetabolicGraph, EdgeEntry<'_>) -> Option<f64>,
{
    let view: &MetabolicGraph = graph;
    let computed: Vec<(EdgeIndex, Option<f64>)> = view
        .edges()
        .map(|entry| (entry.id, weight_of(view, entry)))
        .collect();
    let mut report = WeightingReport::default();
    for (idx, weight) in computed {
        match weight {
            Some(w) => {
                if let Some(edge) = graph.edge_mut(idx) {
                    edge.weight = Some(w);
                    report.assigned += 1;
                }
            }
            None if remove_unassigned => {
                graph.remove_edge(idx);
                report.removed_unassigned += 1;
            }
            None => {
                if let Some(edge) = graph.edge_mut(idx) {
                    edge.weight = None;
                }
                report.unassigned += 1;
            }
        }
    }
    report.removed_invalid = prune_invalid_weights(graph);
    report
}

/// Remove the edges whose assigned weight is NaN, infinite or not strictly positive
///
/// Unassigned weights are left alone, they read as 1.
pub fn prune_invalid_weights(graph: &mut MetabolicGraph) -> usize {
    let invalid: Vec<EdgeIndex> = graph
        .edges()
        .filter(|e| matches!(e.edge.weight, Some(w) if !w.is_finite() || w <= 0.0))
        .map(|e| e.id)
        .collect();
    for idx in invalid.iter() {
        graph.remove_edge(*idx);
    }
    if !invalid.is_empty() {
        debug!("Removed {} edges with invalid weights", invalid.len());
    }
    invalid.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::weighted_species_graph;

    #[test]
    fn unweighted_policy() {
        let mut graph = weighted_species_graph(&[("a", "b", 5.0), ("b", "c", 0.5)]);
        let report = Unweighted.apply(&mut graph);
        assert_eq!(report.assigned, 2);
        assert!(graph.edges().all(|e| e.edge.weight == Some(1.0)));
    }

    #[test]
    fn invalid_weights_are_pruned() {
        let mut graph = weighted_species_graph(&[
            ("a", "b", 1.0),
            ("b", "c", 0.0),
            ("c", "d", -2.0),
            ("d", "e", f64::NAN),
            ("e", "f", f64::INFINITY),
            ("f", "g", f64::NEG_INFINITY),
        ]);
        assert_eq!(prune_invalid_weights(&mut graph), 5);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.vertex_count(), 7);
    }
}

//! Degree based weights, penalizing paths through highly connected compounds
use derive_builder::Builder;

use crate::configuration::CONFIGURATION;
use crate::graph::MetabolicGraph;
use crate::weighting::{assign_weights, WeightingPolicy, WeightingReport};

/// Weight each edge by the degree of its target raised to `power`
///
/// On a directed graph the degree is the in-degree of the target. A graph produced by
/// [`MetabolicGraph::as_undirected`] holds every edge twice, so with `undirected_correction`
/// the degree is `(in + out) / 2`, the number of distinct links of the target.
#[derive(Builder, Clone, Debug)]
pub struct DegreeWeighting {
    /// Exponent applied to the degree
    #[builder(default = "CONFIGURATION.read().unwrap().degree_power")]
    pub power: f64,
    /// Use the combined degree halved, for graphs with mirrored edges
    #[builder(default = "false")]
    pub undirected_correction: bool,
}

impl Default for DegreeWeighting {
    fn default() -> Self {
        DegreeWeighting {
            power: CONFIGURATION
                .read()
                .map(|c| c.degree_power)
                .unwrap_or(2.0),
            undirected_correction: false,
        }
    }
}

impl WeightingPolicy for DegreeWeighting {
    fn apply(&self, graph: &mut MetabolicGraph) -> WeightingReport {
        assign_weights(graph, false, |g, entry| {
            let degree = if self.undirected_correction {
                (g.in_degree_of(entry.target) + g.out_degree_of(entry.target)) as f64 / 2.0
            } else {
                g.in_degree_of(entry.target) as f64
            };
            Some(degree.powf(self.power))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::species_graph;
    use crate::graph::VertexId;

    fn weight(graph: &MetabolicGraph, s: &str, t: &str) -> Option<f64> {
        let edges = graph
            .edges_between(&VertexId::new(s), &VertexId::new(t))
            .unwrap();
        graph.edge(edges[0]).unwrap().weight
    }

    #[test]
    fn squared_in_degree() {
        let mut graph = species_graph(&[("a", "hub"), ("b", "hub"), ("c", "hub"), ("hub", "d")]);
        let report = DegreeWeighting::default().apply(&mut graph);
        assert_eq!(report.assigned, 4);
        assert_eq!(weight(&graph, "a", "hub"), Some(9.0));
        assert_eq!(weight(&graph, "hub", "d"), Some(1.0));
    }

    #[test]
    fn undirected_correction() {
        let mut graph = species_graph(&[("a", "hub"), ("b", "hub"), ("hub", "d")]).as_undirected();
        let policy = DegreeWeightingBuilder::default()
            .power(1.0)
            .undirected_correction(true)
            .build()
            .unwrap();
        policy.apply(&mut graph);
        // hub has 3 distinct neighbours, 6 mirrored edge ends
        assert_eq!(weight(&graph, "a", "hub"), Some(3.0));
        assert_eq!(weight(&graph, "hub", "a"), Some(1.0));

        let mut uncorrected = species_graph(&[("a", "hub"), ("b", "hub"), ("hub", "d")]).as_undirected();
        DegreeWeightingBuilder::default()
            .power(1.0)
            .build()
            .unwrap()
            .apply(&mut uncorrected);
        assert_eq!(weight(&uncorrected, "a", "hub"), Some(3.0));
        assert_eq!(weight(&uncorrected, "hub", "d"), Some(1.0));
    }
}

//! Load points
use derive_builder::Builder;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::centrality::ScoreMap;
use crate::configuration::CONFIGURATION;
use crate::graph::transform::Combiner;
use crate::graph::{GraphError, MetabolicGraph, NodeIndex, ProjectionKind};
use crate::paths::k_shortest::yen;

/// Load point analysis over a compound transition graph
///
/// The load of a species is `ln[(p / k) / (P / K)]` where `p` is the number of alternative
/// shortest paths (up to `k` per ordered pair of connected species) crossing the species, `k`
/// its number of distinct neighbours, `P` the total number of paths and `K` the sum of the
/// neighbour counts. Species with no neighbour are left out, species crossed by no path score
/// `-inf`.
#[derive(Builder, Clone, Debug)]
pub struct LoadPoints {
    /// Alternative paths computed per pair
    #[builder(default = "CONFIGURATION.read().unwrap().k_paths")]
    pub k: usize,
}

impl LoadPoints {
    /// # Errors
    /// - [`GraphError::WrongProjection`] when the graph is not a compound transition graph
    /// - [`GraphError::InvalidParameter`] when `k` is 0
    pub fn compute(&self, graph: &MetabolicGraph) -> Result<ScoreMap, GraphError> {
        graph.require_kind(ProjectionKind::CompoundTransition)?;
        if self.k == 0 {
            return Err(GraphError::InvalidParameter(String::from(
                "at least one path per pair is needed",
            )));
        }
        // parallel edges would count the same route once per reaction
        let mut simple = graph.clone();
        simple.merge_parallel_edges(Combiner::Min);

        let nodes: Vec<NodeIndex> = simple.node_indices().collect();
        let mut crossings: IndexMap<NodeIndex, usize> = nodes.iter().map(|n| (*n, 0)).collect();
        let mut total_paths = 0usize;
        for s in nodes.iter() {
            for t in nodes.iter().filter(|t| *t != s) {
                for path in yen(&simple, *s, *t, self.k, true) {
                    total_paths += 1;
                    let inner = path.nodes.len().saturating_sub(1);
                    for node in path.nodes.iter().take(inner).skip(1) {
                        if let Some(count) = crossings.get_mut(node) {
                            *count += 1;
                        }
                    }
                }
            }
        }

        let degrees: IndexMap<NodeIndex, usize> = nodes
            .iter()
            .map(|n| (*n, simple.neighbors(*n).len()))
            .collect();
        let total_links: usize = degrees.values().sum();
        debug!("{} paths over {} links", total_paths, total_links);

        let mut loads = ScoreMap::new();
        for (node, degree) in degrees.iter().filter(|(_, d)| **d > 0) {
            let p = crossings.get(node).copied().unwrap_or(0);
            let load = if p == 0 {
                f64::NEG_INFINITY
            } else {
                ((p as f64 / *degree as f64) / (total_paths as f64 / total_links as f64)).ln()
            };
            loads.insert(simple.id_of(*node).clone(), load);
        }
        info!("Computed load of {} species", loads.len());
        Ok(loads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::species_graph;
    use crate::graph::{Vertex, VertexId};
    use approx::assert_relative_eq;

    fn id(s: &str) -> VertexId {
        VertexId::new(s)
    }

    #[test]
    fn hub_carries_the_load() {
        let mut graph = species_graph(&[("a", "h"), ("b", "h"), ("h", "c"), ("h", "d")]);
        graph.add_vertex(Vertex::species(id("lonely")));
        let loads = LoadPointsBuilder::default()
            .k(2)
            .build()
            .unwrap()
            .compute(&graph)
            .unwrap();
        // 8 paths, 4 of them through h; h has 4 neighbours out of 8 links
        assert_relative_eq!(loads[&id("h")], 0.0);
        assert_eq!(loads[&id("a")], f64::NEG_INFINITY);
        assert!(!loads.contains_key(&id("lonely")));
    }

    #[test]
    fn chain_loads() {
        let graph = species_graph(&[("a", "b"), ("b", "c")]);
        let loads = LoadPointsBuilder::default().build().unwrap().compute(&graph).unwrap();
        // b: (1 / 2) / (3 / 4)
        assert_relative_eq!(loads[&id("b")], (2.0f64 / 3.0).ln());
    }

    #[test]
    fn parallel_edges_count_once() {
        let mut graph = species_graph(&[("a", "b"), ("b", "c")]);
        let copy = graph.edges().next().unwrap().edge.clone();
        graph.add_edge(&id("a"), &id("b"), copy).unwrap();
        let loads = LoadPointsBuilder::default().build().unwrap().compute(&graph).unwrap();
        assert_relative_eq!(loads[&id("b")], (2.0f64 / 3.0).ln());
    }

    #[test]
    fn invalid_inputs() {
        let graph = species_graph(&[("a", "b")]);
        let analysis = LoadPoints { k: 0 };
        assert!(matches!(
            analysis.compute(&graph),
            Err(GraphError::InvalidParameter(_))
        ));
        let bipartite = MetabolicGraph::new(ProjectionKind::Bipartite);
        assert!(LoadPoints { k: 1 }.compute(&bipartite).is_err());
    }
}

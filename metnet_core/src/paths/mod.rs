//! Path searches over a [`MetabolicGraph`]
//!
//! Weights are read with [`Edge::weight_or_default`](crate::graph::Edge::weight_or_default), so
//! unweighted graphs measure distances in edges. Every search assumes non-negative weights, which
//! the weighting policies guarantee by removing invalid edges.
use indexmap::IndexSet;
use tracing::warn;

use crate::graph::{EdgeIndex, MetabolicGraph, NodeIndex, VertexId};

pub mod dijkstra;
pub mod k_shortest;
pub mod matrix;

pub use dijkstra::{distance, shortest_path, shortest_path_subnetwork, shortest_paths, ShortestPaths};
pub use k_shortest::{k_shortest_paths, k_shortest_subnetwork};
pub use matrix::{all_pairs, distance_matrix, floyd_warshall, DistanceMatrix};

/// A path through the graph
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Visited vertices, from source to target
    pub vertices: Vec<VertexId>,
    /// Traversed edges, one less than the vertices
    pub edges: Vec<EdgeIndex>,
    /// Sum of the edge weights
    pub weight: f64,
}

impl Path {
    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Vertices strictly between source and target
    pub fn intermediates(&self) -> &[VertexId] {
        if self.vertices.len() <= 2 {
            &[]
        } else {
            &self.vertices[1..self.vertices.len() - 1]
        }
    }
}

/// Graph extracted from a larger graph, with the number of requested ids it did not contain
#[derive(Clone, Debug)]
pub struct Subnetwork {
    pub graph: MetabolicGraph,
    pub skipped: usize,
}

/// Path over node indices, as found by the search routines
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RawPath {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
    pub cost: f64,
}

impl RawPath {
    pub(crate) fn into_path(self, graph: &MetabolicGraph) -> Path {
        Path {
            vertices: self
                .nodes
                .iter()
                .map(|n| graph.id_of(*n).clone())
                .collect(),
            edges: self.edges,
            weight: self.cost,
        }
    }
}

/// Node indices of the ids present in the graph, and the number of absent ids
pub(crate) fn resolve_ids<'a, I>(graph: &MetabolicGraph, ids: I) -> (IndexSet<NodeIndex>, usize)
where
    I: IntoIterator<Item = &'a VertexId>,
{
    let mut found = IndexSet::new();
    let mut skipped = 0;
    for id in ids {
        match graph.node_index(id) {
            Some(idx) => {
                found.insert(idx);
            }
            None => {
                warn!("Ignoring {}, it is not part of the graph", id);
                skipped += 1;
            }
        }
    }
    (found, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_intermediates() {
        let path = Path {
            vertices: ["a", "b", "c"].iter().map(|s| VertexId::new(s)).collect(),
            edges: vec![EdgeIndex::new(0), EdgeIndex::new(1)],
            weight: 2.0,
        };
        assert_eq!(path.len(), 2);
        assert_eq!(path.intermediates(), &[VertexId::new("b")]);
        let single = Path {
            vertices: vec![VertexId::new("a")],
            edges: vec![],
            weight: 0.0,
        };
        assert!(single.is_empty());
        assert!(single.intermediates().is_empty());
    }
}

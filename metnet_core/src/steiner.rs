//! Steiner tree approximation
//!
//! The connecting subnetwork of a set of terminals is approximated by the union of the shortest
//! paths between sources and targets. Pairs with no connecting path are left out.
use indexmap::IndexSet;
use tracing::debug;

use crate::graph::{EdgeIndex, MetabolicGraph, VertexId};
use crate::paths::dijkstra::{search, SearchMask};
use crate::paths::{resolve_ids, RawPath, Subnetwork};

/// Edges of the union of shortest paths from every source to every other target
///
/// With `weighted` unset every edge counts as 1. With `directed` unset, the lighter of the
/// `s -> t` and `t -> s` paths is kept for each pair. Ids absent from the graph are ignored.
pub fn approximate(
    graph: &MetabolicGraph,
    sources: &[VertexId],
    targets: &[VertexId],
    weighted: bool,
    directed: bool,
) -> Vec<EdgeIndex> {
    connect(graph, sources, targets, weighted, directed).0
}

fn connect(
    graph: &MetabolicGraph,
    sources: &[VertexId],
    targets: &[VertexId],
    weighted: bool,
    directed: bool,
) -> (Vec<EdgeIndex>, usize) {
    let (sources, skipped_sources) = resolve_ids(graph, sources);
    let (targets, skipped_targets) = resolve_ids(graph, targets);
    let mask = SearchMask::default();
    let mut edges: IndexSet<EdgeIndex> = IndexSet::new();
    let mut omitted = 0;
    for s in sources.iter() {
        let forward = search(graph, *s, None, &mask, weighted);
        for t in targets.iter().filter(|t| *t != s) {
            let mut best: Option<RawPath> = forward.path_to(graph, *t);
            if !directed {
                let backward = search(graph, *t, Some(*s), &mask, weighted).path_to(graph, *s);
                best = match (best, backward) {
                    (Some(f), Some(b)) if b.cost < f.cost => Some(b),
                    (None, b) => b,
                    (f, _) => f,
                };
            }
            match best {
                Some(path) => edges.extend(path.edges),
                None => omitted += 1,
            }
        }
    }
    if omitted > 0 {
        debug!("{} terminal pairs are not connected", omitted);
    }
    (edges.into_iter().collect(), skipped_sources + skipped_targets)
}

/// Graph made of the edges found by [`approximate`]
pub fn steiner_subnetwork(
    graph: &MetabolicGraph,
    sources: &[VertexId],
    targets: &[VertexId],
    weighted: bool,
    directed: bool,
) -> Subnetwork {
    let (edges, skipped) = connect(graph, sources, targets, weighted, directed);
    Subnetwork {
        graph: graph.edge_subgraph(edges.iter()),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::{species_graph, weighted_species_graph};

    fn id(s: &str) -> VertexId {
        VertexId::new(s)
    }

    #[test]
    fn union_of_shortest_paths() {
        let graph = species_graph(&[("a", "x"), ("x", "b"), ("x", "c"), ("a", "y"), ("y", "z"), ("z", "c")]);
        let edges = approximate(&graph, &[id("a")], &[id("b"), id("c")], true, true);
        assert_eq!(edges.len(), 3);
        let sub = steiner_subnetwork(&graph, &[id("a")], &[id("b"), id("c")], true, true);
        assert_eq!(sub.graph.vertex_count(), 4);
        assert!(!sub.graph.contains(&id("y")));
    }

    #[test]
    fn unweighted_counts_edges() {
        let graph = weighted_species_graph(&[("a", "b", 10.0), ("a", "c", 1.0), ("c", "d", 1.0), ("d", "b", 1.0)]);
        assert_eq!(approximate(&graph, &[id("a")], &[id("b")], true, true).len(), 3);
        assert_eq!(approximate(&graph, &[id("a")], &[id("b")], false, true).len(), 1);
    }

    #[test]
    fn undirected_takes_either_orientation() {
        let graph = species_graph(&[("b", "a")]);
        assert!(approximate(&graph, &[id("a")], &[id("b")], true, true).is_empty());
        assert_eq!(approximate(&graph, &[id("a")], &[id("b")], true, false).len(), 1);
    }

    #[test]
    fn disconnected_and_unknown_terminals() {
        let graph = species_graph(&[("a", "b"), ("c", "d")]);
        let sub = steiner_subnetwork(&graph, &[id("a"), id("nope")], &[id("b"), id("d")], true, true);
        assert_eq!(sub.skipped, 1);
        assert_eq!(sub.graph.edge_count(), 1);
    }
}

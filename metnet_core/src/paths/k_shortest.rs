//! Yen's k shortest simple paths
use indexmap::IndexSet;
use tracing::trace;

use crate::graph::{EdgeIndex, GraphError, MetabolicGraph, NodeIndex, VertexId};
use crate::paths::dijkstra::{search, SearchMask};
use crate::paths::{resolve_ids, Path, RawPath, Subnetwork};

/// Up to `k` loopless paths from `source` to `target`, by increasing weight
///
/// Paths are distinct by their edge sequence, so parallel edges (different reactions linking the
/// same pair) give different paths. Fewer than `k` paths are returned when no more exist.
pub fn k_shortest_paths(
    graph: &MetabolicGraph,
    source: &VertexId,
    target: &VertexId,
    k: usize,
) -> Result<Vec<Path>, GraphError> {
    let s = graph.require_node(source)?;
    let t = graph.require_node(target)?;
    Ok(yen(graph, s, t, k, true)
        .into_iter()
        .map(|raw| raw.into_path(graph))
        .collect())
}

pub(crate) fn yen(
    graph: &MetabolicGraph,
    source: NodeIndex,
    target: NodeIndex,
    k: usize,
    weighted: bool,
) -> Vec<RawPath> {
    let mut found: Vec<RawPath> = Vec::new();
    if k == 0 {
        return found;
    }
    let Some(first) = search(graph, source, Some(target), &SearchMask::default(), weighted)
        .path_to(graph, target)
    else {
        return found;
    };
    found.push(first);
    let mut candidates: Vec<RawPath> = Vec::new();

    while found.len() < k {
        let Some(previous) = found.last().cloned() else {
            break;
        };
        for i in 0..previous.edges.len() {
            let spur = previous.nodes[i];
            let root_nodes = &previous.nodes[..=i];
            let root_edges = &previous.edges[..i];

            let mut mask = SearchMask::default();
            for path in found.iter() {
                if path.edges.len() > i && path.edges[..i] == *root_edges {
                    mask.edges.insert(path.edges[i]);
                }
            }
            mask.nodes.extend(root_nodes[..i].iter().copied());

            let tree = search(graph, spur, Some(target), &mask, weighted);
            let Some(spur_path) = tree.path_to(graph, target) else {
                continue;
            };
            let root_cost: f64 = root_edges
                .iter()
                .map(|e| edge_cost(graph, *e, weighted))
                .sum();
            let mut nodes = root_nodes.to_vec();
            nodes.extend(spur_path.nodes.into_iter().skip(1));
            let mut edges = root_edges.to_vec();
            edges.extend(spur_path.edges);
            let candidate = RawPath {
                nodes,
                edges,
                cost: root_cost + spur_path.cost,
            };
            if !found.iter().any(|p| p.edges == candidate.edges)
                && !candidates.iter().any(|p| p.edges == candidate.edges)
            {
                candidates.push(candidate);
            }
        }
        if candidates.is_empty() {
            break;
        }
        // first minimum wins so ties keep discovery order
        let mut best = 0;
        for (pos, candidate) in candidates.iter().enumerate() {
            if candidate.cost < candidates[best].cost {
                best = pos;
            }
        }
        found.push(candidates.remove(best));
    }
    trace!("Found {} paths", found.len());
    found
}

fn edge_cost(graph: &MetabolicGraph, edge: EdgeIndex, weighted: bool) -> f64 {
    if weighted {
        graph
            .edge(edge)
            .map(|e| e.weight_or_default())
            .unwrap_or(f64::INFINITY)
    } else {
        1.0
    }
}

/// Union of the `k` shortest paths between every source and every other target
///
/// Ids absent from the graph are skipped and counted.
pub fn k_shortest_subnetwork(
    graph: &MetabolicGraph,
    sources: &[VertexId],
    targets: &[VertexId],
    k: usize,
) -> Subnetwork {
    let (sources, skipped_sources) = resolve_ids(graph, sources);
    let (targets, skipped_targets) = resolve_ids(graph, targets);
    let mut edges: IndexSet<EdgeIndex> = IndexSet::new();
    for s in sources.iter() {
        for t in targets.iter().filter(|t| *t != s) {
            for path in yen(graph, *s, *t, k, true) {
                edges.extend(path.edges);
            }
        }
    }
    Subnetwork {
        graph: graph.edge_subgraph(edges.iter()),
        skipped: skipped_sources + skipped_targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::{species_graph, weighted_species_graph};

    fn id(s: &str) -> VertexId {
        VertexId::new(s)
    }

    fn names(path: &Path) -> Vec<String> {
        path.vertices.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn classic_yen_graph() {
        let graph = weighted_species_graph(&[
            ("C", "D", 3.0),
            ("C", "E", 2.0),
            ("D", "F", 4.0),
            ("E", "D", 1.0),
            ("E", "F", 2.0),
            ("E", "G", 3.0),
            ("F", "G", 2.0),
            ("F", "H", 1.0),
            ("G", "H", 2.0),
        ]);
        let paths = k_shortest_paths(&graph, &id("C"), &id("H"), 3).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(names(&paths[0]), vec!["C", "E", "F", "H"]);
        assert_eq!(paths[0].weight, 5.0);
        assert_eq!(paths[1].weight, 7.0);
        assert_eq!(paths[2].weight, 8.0);
        for path in paths.iter() {
            let unique: IndexSet<&VertexId> = path.vertices.iter().collect();
            assert_eq!(unique.len(), path.vertices.len());
        }
    }

    #[test]
    fn fewer_paths_than_requested() {
        let graph = species_graph(&[("a", "b"), ("b", "c"), ("a", "c")]);
        let paths = k_shortest_paths(&graph, &id("a"), &id("c"), 10).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].len(), 1);
        assert_eq!(paths[1].len(), 2);
        assert!(k_shortest_paths(&graph, &id("c"), &id("a"), 3)
            .unwrap()
            .is_empty());
        assert!(k_shortest_paths(&graph, &id("a"), &id("c"), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn weights_are_non_decreasing() {
        let graph = weighted_species_graph(&[
            ("s", "a", 1.0),
            ("s", "b", 2.0),
            ("a", "t", 2.0),
            ("b", "t", 2.0),
            ("a", "b", 0.5),
            ("s", "t", 6.0),
        ]);
        let paths = k_shortest_paths(&graph, &id("s"), &id("t"), 5).unwrap();
        assert_eq!(paths.len(), 4);
        for pair in paths.windows(2) {
            assert!(pair[0].weight <= pair[1].weight);
        }
    }

    #[test]
    fn subnetwork_union() {
        let graph = species_graph(&[("a", "b"), ("b", "d"), ("a", "c"), ("c", "d"), ("d", "e")]);
        let sub = k_shortest_subnetwork(&graph, &[id("a")], &[id("d"), id("zz")], 2);
        assert_eq!(sub.skipped, 1);
        assert_eq!(sub.graph.edge_count(), 4);
        assert!(!sub.graph.contains(&id("e")));
    }
}

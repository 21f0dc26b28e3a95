//! Single source shortest paths
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use indexmap::{IndexMap, IndexSet};

use crate::graph::{EdgeIndex, GraphError, MetabolicGraph, NodeIndex, VertexId};
use crate::paths::{resolve_ids, Path, RawPath, Subnetwork};

/// Heap entry ordered so that the smallest distance pops first
#[derive(Copy, Clone, Debug)]
struct MinScored(f64, NodeIndex);

impl PartialEq for MinScored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MinScored {}

impl PartialOrd for MinScored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinScored {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .total_cmp(&self.0)
            .then_with(|| other.1.cmp(&self.1))
    }
}

/// Vertices and edges a search must not use
#[derive(Clone, Debug, Default)]
pub(crate) struct SearchMask {
    pub edges: IndexSet<EdgeIndex>,
    pub nodes: IndexSet<NodeIndex>,
}

/// Result of a Dijkstra search over node indices
#[derive(Clone, Debug)]
pub(crate) struct SearchTree {
    pub source: NodeIndex,
    pub distances: IndexMap<NodeIndex, f64>,
    pub predecessors: IndexMap<NodeIndex, EdgeIndex>,
}

impl SearchTree {
    /// Walk the predecessor edges back from `target`
    pub(crate) fn path_to(&self, graph: &MetabolicGraph, target: NodeIndex) -> Option<RawPath> {
        let cost = *self.distances.get(&target)?;
        let mut nodes = vec![target];
        let mut edges = Vec::new();
        let mut current = target;
        while current != self.source {
            let edge = *self.predecessors.get(&current)?;
            let (source, _) = graph.edge_endpoints(edge)?;
            edges.push(edge);
            nodes.push(source);
            current = source;
        }
        nodes.reverse();
        edges.reverse();
        Some(RawPath { nodes, edges, cost })
    }
}

/// Dijkstra search from `source`, stopping early once `target` is settled
///
/// When `weighted` is false every edge counts as 1. Among equally short paths, the one found
/// first (lowest edge index at the first divergence) is kept.
pub(crate) fn search(
    graph: &MetabolicGraph,
    source: NodeIndex,
    target: Option<NodeIndex>,
    mask: &SearchMask,
    weighted: bool,
) -> SearchTree {
    let mut distances: IndexMap<NodeIndex, f64> = IndexMap::new();
    let mut predecessors: IndexMap<NodeIndex, EdgeIndex> = IndexMap::new();
    let mut settled: IndexSet<NodeIndex> = IndexSet::new();
    let mut heap = BinaryHeap::new();

    distances.insert(source, 0.0);
    heap.push(MinScored(0.0, source));
    while let Some(MinScored(dist, node)) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        if Some(node) == target {
            break;
        }
        for entry in graph.out_edges(node) {
            if mask.edges.contains(&entry.id) || mask.nodes.contains(&entry.target) {
                continue;
            }
            if settled.contains(&entry.target) {
                continue;
            }
            let step = if weighted {
                entry.edge.weight_or_default()
            } else {
                1.0
            };
            let candidate = dist + step;
            let better = match distances.get(&entry.target) {
                Some(known) => candidate < *known,
                None => true,
            };
            if better {
                distances.insert(entry.target, candidate);
                predecessors.insert(entry.target, entry.id);
                heap.push(MinScored(candidate, entry.target));
            }
        }
    }
    SearchTree {
        source,
        distances,
        predecessors,
    }
}

/// Distances and predecessor edges from one source to every vertex of a graph
#[derive(Clone, Debug)]
pub struct ShortestPaths {
    pub source: VertexId,
    /// Distance of every vertex, `f64::INFINITY` when unreachable
    pub distances: IndexMap<VertexId, f64>,
    /// Edge through which each reached vertex (other than the source) was first reached
    pub predecessors: IndexMap<VertexId, EdgeIndex>,
    tree: SearchTree,
}

impl ShortestPaths {
    /// Distance to a vertex, `f64::INFINITY` when unreachable or absent
    pub fn distance(&self, target: &VertexId) -> f64 {
        self.distances
            .get(target)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Shortest path to a vertex, None when unreachable
    pub fn path_to(&self, graph: &MetabolicGraph, target: &VertexId) -> Option<Path> {
        let idx = graph.node_index(target)?;
        self.tree
            .path_to(graph, idx)
            .map(|raw| raw.into_path(graph))
    }
}

/// Shortest paths from `source` to every vertex
///
/// # Examples
/// ```rust
/// use metnet_core::graph::{Edge, MetabolicGraph, ProjectionKind, Vertex, VertexId};
/// use metnet_core::metabolic_model::reaction::StepDirection;
/// use metnet_core::paths::shortest_paths;
/// let mut graph = MetabolicGraph::new(ProjectionKind::CompoundTransition);
/// for id in ["a", "b", "c"] {
///     graph.add_vertex(Vertex::species(VertexId::new(id)));
/// }
/// graph.add_edge(&"a".into(), &"b".into(), Edge::new(StepDirection::Forward)).unwrap();
/// let tree = shortest_paths(&graph, &"a".into()).unwrap();
/// assert_eq!(tree.distance(&"a".into()), 0.0);
/// assert_eq!(tree.distance(&"b".into()), 1.0);
/// assert_eq!(tree.distance(&"c".into()), f64::INFINITY);
/// ```
pub fn shortest_paths(graph: &MetabolicGraph, source: &VertexId) -> Result<ShortestPaths, GraphError> {
    let s = graph.require_node(source)?;
    let tree = search(graph, s, None, &SearchMask::default(), true);
    let distances = graph
        .node_indices()
        .map(|n| {
            (
                graph.id_of(n).clone(),
                tree.distances.get(&n).copied().unwrap_or(f64::INFINITY),
            )
        })
        .collect();
    let predecessors = tree
        .predecessors
        .iter()
        .map(|(n, e)| (graph.id_of(*n).clone(), *e))
        .collect();
    Ok(ShortestPaths {
        source: source.clone(),
        distances,
        predecessors,
        tree,
    })
}

/// Minimum weight path between two vertices, None when `target` is unreachable
pub fn shortest_path(
    graph: &MetabolicGraph,
    source: &VertexId,
    target: &VertexId,
) -> Result<Option<Path>, GraphError> {
    let s = graph.require_node(source)?;
    let t = graph.require_node(target)?;
    let tree = search(graph, s, Some(t), &SearchMask::default(), true);
    Ok(tree.path_to(graph, t).map(|raw| raw.into_path(graph)))
}

/// Minimum cumulative weight between two vertices, `f64::INFINITY` when unreachable
pub fn distance(graph: &MetabolicGraph, source: &VertexId, target: &VertexId) -> Result<f64, GraphError> {
    Ok(shortest_path(graph, source, target)?
        .map(|p| p.weight)
        .unwrap_or(f64::INFINITY))
}

/// Union of the shortest paths from every source to every target
///
/// Unreachable pairs are left out, ids absent from the graph are skipped and counted.
pub fn shortest_path_subnetwork(
    graph: &MetabolicGraph,
    sources: &[VertexId],
    targets: &[VertexId],
) -> Subnetwork {
    let (sources, skipped_sources) = resolve_ids(graph, sources);
    let (targets, skipped_targets) = resolve_ids(graph, targets);
    let mut edges: IndexSet<EdgeIndex> = IndexSet::new();
    for s in sources.iter() {
        let tree = search(graph, *s, None, &SearchMask::default(), true);
        for t in targets.iter().filter(|t| *t != s) {
            if let Some(path) = tree.path_to(graph, *t) {
                edges.extend(path.edges);
            }
        }
    }
    Subnetwork {
        graph: graph.edge_subgraph(edges.iter()),
        skipped: skipped_sources + skipped_targets,
    }
}

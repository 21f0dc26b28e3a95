//! Distance matrices
use nalgebra::DMatrix;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::graph::transform::Combiner;
use crate::graph::{MetabolicGraph, VertexId};
use crate::paths::dijkstra::{search, SearchMask};
use crate::paths::resolve_ids;

/// Distances between row and column vertices, `f64::INFINITY` where unreachable
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    pub rows: Vec<VertexId>,
    pub columns: Vec<VertexId>,
    pub values: DMatrix<f64>,
    /// Requested ids absent from the graph
    pub skipped: usize,
}

impl DistanceMatrix {
    /// Distance from `row` to `column`, None if either id is not part of the matrix
    pub fn get(&self, row: &VertexId, column: &VertexId) -> Option<f64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[(i, j)])
    }

    /// Row major copy of the values
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.values.nrows())
            .map(|i| self.values.row(i).iter().copied().collect())
            .collect()
    }

    /// Replace both `d(a, b)` and `d(b, a)` by their minimum
    ///
    /// Only meaningful when rows and columns hold the same vertices in the same order.
    fn symmetrize(&mut self) {
        let n = self.values.nrows().min(self.values.ncols());
        for i in 0..n {
            for j in (i + 1)..n {
                let shortest = self.values[(i, j)].min(self.values[(j, i)]);
                self.values[(i, j)] = shortest;
                self.values[(j, i)] = shortest;
            }
        }
    }
}

/// Row and column ids are written as strings, unreachable cells as `"Infinity"`
impl Serialize for DistanceMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ids = |ids: &[VertexId]| -> Vec<String> { ids.iter().map(|id| id.to_string()).collect() };
        let values: Vec<Vec<Distance>> = self
            .to_rows()
            .into_iter()
            .map(|row| row.into_iter().map(Distance).collect())
            .collect();
        let mut state = serializer.serialize_struct("DistanceMatrix", 3)?;
        state.serialize_field("rows", &ids(&self.rows))?;
        state.serialize_field("columns", &ids(&self.columns))?;
        state.serialize_field("values", &values)?;
        state.end()
    }
}

/// Matrix cell keeping the unreachable sentinel in formats without infinite numbers
struct Distance(f64);

impl Serialize for Distance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0 == f64::INFINITY {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Dense adjacency matrix in vertex insertion order
///
/// Parallel edges are folded with `combiner`, missing edges are `f64::INFINITY` and the diagonal
/// is 0.
pub fn adjacency_matrix(graph: &MetabolicGraph, combiner: Combiner) -> DMatrix<f64> {
    let n = graph.vertex_count();
    let mut matrix = DMatrix::from_element(n, n, f64::INFINITY);
    for i in 0..n {
        matrix[(i, i)] = 0.0;
    }
    for entry in graph.edges() {
        if entry.source == entry.target {
            continue;
        }
        let (Some(i), Some(j)) = (
            graph.position(graph.id_of(entry.source)),
            graph.position(graph.id_of(entry.target)),
        ) else {
            continue;
        };
        let weight = entry.edge.weight_or_default();
        matrix[(i, j)] = if matrix[(i, j)].is_infinite() {
            weight
        } else {
            combiner.combine(matrix[(i, j)], weight)
        };
    }
    matrix
}

/// All pairs distances by matrix relaxation
///
/// Suited to small dense graphs. `combiner` decides how parallel edges contribute, `Min` keeps
/// the shortest one.
pub fn floyd_warshall(graph: &MetabolicGraph, combiner: Combiner) -> DistanceMatrix {
    let mut dist = adjacency_matrix(graph, combiner);
    let n = dist.nrows();
    for k in 0..n {
        for i in 0..n {
            let through = dist[(i, k)];
            if through.is_infinite() {
                continue;
            }
            for j in 0..n {
                let candidate = through + dist[(k, j)];
                if candidate < dist[(i, j)] {
                    dist[(i, j)] = candidate;
                }
            }
        }
    }
    let ids: Vec<VertexId> = graph.vertex_ids().cloned().collect();
    DistanceMatrix {
        rows: ids.clone(),
        columns: ids,
        values: dist,
        skipped: 0,
    }
}

/// All pairs distances with one Dijkstra search per vertex
pub fn all_pairs(graph: &MetabolicGraph) -> DistanceMatrix {
    let ids: Vec<VertexId> = graph.vertex_ids().cloned().collect();
    distance_matrix(graph, &ids, &ids, false)
}

/// Distances from every source to every target
///
/// Runs one search per source. With `full` set and identical source and target lists, the
/// matrix is made symmetric (minimum of both directions) when the graph is undirected. Ids absent
/// from the graph are left out of the matrix and counted.
pub fn distance_matrix(
    graph: &MetabolicGraph,
    sources: &[VertexId],
    targets: &[VertexId],
    full: bool,
) -> DistanceMatrix {
    let (sources, skipped_sources) = resolve_ids(graph, sources);
    let (targets, skipped_targets) = resolve_ids(graph, targets);
    let mut values = DMatrix::from_element(sources.len(), targets.len(), f64::INFINITY);
    for (i, s) in sources.iter().enumerate() {
        let tree = search(graph, *s, None, &SearchMask::default(), true);
        for (j, t) in targets.iter().enumerate() {
            if let Some(d) = tree.distances.get(t) {
                values[(i, j)] = *d;
            }
        }
    }
    let mut matrix = DistanceMatrix {
        rows: sources.iter().map(|n| graph.id_of(*n).clone()).collect(),
        columns: targets.iter().map(|n| graph.id_of(*n).clone()).collect(),
        values,
        skipped: skipped_sources + skipped_targets,
    };
    if full && matrix.rows == matrix.columns && graph.is_undirected() {
        debug!("Symmetrizing {0}x{0} distance matrix", matrix.rows.len());
        matrix.symmetrize();
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::{species_graph, weighted_species_graph};

    fn id(s: &str) -> VertexId {
        VertexId::new(s)
    }

    #[test]
    fn floyd_warshall_matches_dijkstra() {
        let graph = weighted_species_graph(&[
            ("a", "b", 4.0),
            ("a", "c", 1.0),
            ("c", "b", 2.0),
            ("b", "d", 1.0),
            ("d", "a", 7.0),
        ]);
        let fw = floyd_warshall(&graph, Combiner::Min);
        let dj = all_pairs(&graph);
        assert_eq!(fw.rows, dj.rows);
        assert_eq!(fw.values, dj.values);
        assert_eq!(fw.get(&id("a"), &id("d")), Some(4.0));
        assert_eq!(fw.get(&id("d"), &id("b")), Some(10.0));
        assert_eq!(fw.get(&id("a"), &id("zz")), None);
    }

    #[test]
    fn parallel_edge_combiners() {
        let mut graph = weighted_species_graph(&[("a", "b", 3.0)]);
        let mut edge = graph.edges().next().unwrap().edge.clone();
        edge.weight = Some(1.0);
        graph.add_edge(&id("a"), &id("b"), edge).unwrap();
        assert_eq!(adjacency_matrix(&graph, Combiner::Min)[(0, 1)], 1.0);
        assert_eq!(adjacency_matrix(&graph, Combiner::Max)[(0, 1)], 3.0);
        assert_eq!(adjacency_matrix(&graph, Combiner::Sum)[(0, 1)], 4.0);
        assert_eq!(adjacency_matrix(&graph, Combiner::Min)[(1, 0)], f64::INFINITY);
    }

    #[test]
    fn sources_by_targets() {
        let graph = species_graph(&[("a", "b"), ("b", "c"), ("c", "d")]);
        let matrix = distance_matrix(&graph, &[id("a"), id("c"), id("q")], &[id("d"), id("a")], false);
        assert_eq!(matrix.skipped, 1);
        assert_eq!(matrix.values.shape(), (2, 2));
        assert_eq!(matrix.to_rows(), vec![vec![3.0, 0.0], vec![1.0, f64::INFINITY]]);
    }

    #[test]
    fn symmetrized_only_when_undirected() {
        let ids = [id("a"), id("b")];
        let mut graph = weighted_species_graph(&[("a", "b", 2.0)]);
        let directed = distance_matrix(&graph, &ids, &ids, true);
        assert_eq!(directed.get(&id("b"), &id("a")), Some(f64::INFINITY));
        graph = graph.as_undirected();
        let undirected = distance_matrix(&graph, &ids, &ids, true);
        assert_eq!(undirected.get(&id("b"), &id("a")), Some(2.0));
        assert_eq!(undirected.values, undirected.values.transpose());
    }

    #[test]
    fn serialized_with_infinite_sentinel() {
        let graph = species_graph(&[("a", "b")]);
        let matrix = floyd_warshall(&graph, Combiner::Min);
        let value = serde_json::to_value(&matrix).unwrap();
        assert_eq!(value["rows"], serde_json::json!(["a", "b"]));
        assert_eq!(value["columns"], serde_json::json!(["a", "b"]));
        assert_eq!(value["values"][0][1], 1.0);
        assert_eq!(value["values"][1][0], "Infinity");
    }
}

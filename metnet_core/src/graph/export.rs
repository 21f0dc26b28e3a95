//! Deterministic snapshot of a graph for exporters
use serde::{Deserialize, Serialize};

use crate::graph::{MetabolicGraph, ProjectionKind, VertexKind};
use crate::metabolic_model::reaction::StepDirection;

/// Serializable snapshot of a [`MetabolicGraph`]
///
/// Vertices are sorted by id and edges by (source, target, direction, via), so two graphs with
/// the same content export identically whatever order they were built in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub kind: ProjectionKind,
    pub undirected: bool,
    pub vertices: Vec<VertexExport>,
    pub edges: Vec<EdgeExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexExport {
    pub id: String,
    pub kind: VertexKind,
    pub side: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: String,
    pub target: String,
    pub weight: Option<f64>,
    pub reversible: bool,
    pub direction: StepDirection,
    pub side: bool,
    pub via: Vec<String>,
}

impl MetabolicGraph {
    /// Snapshot the graph in a stable order
    pub fn export(&self) -> GraphExport {
        let mut vertices: Vec<VertexExport> = self
            .vertices()
            .map(|v| VertexExport {
                id: v.id.to_string(),
                kind: v.kind,
                side: v.is_side,
            })
            .collect();
        vertices.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<EdgeExport> = self
            .edges()
            .map(|e| {
                let mut via: Vec<String> = e.edge.via.iter().cloned().collect();
                via.sort();
                EdgeExport {
                    source: self.id_of(e.source).to_string(),
                    target: self.id_of(e.target).to_string(),
                    weight: e.edge.weight,
                    reversible: e.edge.reversible,
                    direction: e.edge.direction,
                    side: e.edge.side,
                    via,
                }
            })
            .collect();
        edges.sort_by(|a, b| {
            (&a.source, &a.target, a.direction == StepDirection::Backward, &a.via).cmp(&(
                &b.source,
                &b.target,
                b.direction == StepDirection::Backward,
                &b.via,
            ))
        });

        GraphExport {
            kind: self.kind(),
            undirected: self.is_undirected(),
            vertices,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::test_utils::species_graph;

    #[test]
    fn export_is_order_independent() {
        let first = species_graph(&[("a", "b"), ("c", "d"), ("b", "c")]);
        let second = species_graph(&[("c", "d"), ("b", "c"), ("a", "b")]);
        assert_eq!(first.export(), second.export());
        let export = first.export();
        let ids: Vec<&str> = export.vertices.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(export.edges[0].source, "a");
    }

    #[test]
    fn export_serializes() {
        let graph = species_graph(&[("a", "b")]);
        let json = serde_json::to_string(&graph.export()).unwrap();
        assert!(json.contains("\"CompoundTransition\""));
        assert!(json.contains("\"source\":\"a\""));
    }
}

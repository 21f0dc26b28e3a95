//! Fixed point expansions over the bipartite graph
//!
//! Both expansions walk the reaction steps of a [`ProjectionKind::Bipartite`] graph: the
//! substrates of a step are the sources of the reaction's incoming edges in that direction, its
//! products the targets of the outgoing ones. The growing species set never shrinks, and the
//! fixed point is reached when a full pass leaves its size unchanged.
use indexmap::IndexSet;
use tracing::warn;

use crate::graph::{EdgeIndex, GraphError, MetabolicGraph, NodeIndex, ProjectionKind, VertexId, VertexKind};
use crate::metabolic_model::reaction::StepDirection;

pub mod precursor;
pub mod scope;

pub use precursor::{precursors, PrecursorOptions, PrecursorOptionsBuilder};
pub use scope::{scope, ScopeOptions, ScopeOptionsBuilder};

/// Outcome of an expansion
#[derive(Clone, Debug)]
pub struct ExpansionResult {
    /// Species and reactions reached, with the edges of the steps that reached them
    pub graph: MetabolicGraph,
    pub species: IndexSet<VertexId>,
    pub reactions: IndexSet<String>,
    /// Number of passes until the fixed point
    pub passes: usize,
    /// Size of the species set after each pass
    pub trace: Vec<usize>,
    /// Requested ids absent from the graph
    pub skipped: usize,
}

/// One direction of a reaction vertex, as seen in the bipartite graph
#[derive(Clone, Debug)]
pub(crate) struct StepView {
    pub reaction: NodeIndex,
    pub direction: StepDirection,
    pub substrates: Vec<(EdgeIndex, NodeIndex)>,
    pub products: Vec<(EdgeIndex, NodeIndex)>,
}

/// Steps of the reactions not in `forbidden`, in vertex order, forward before backward
pub(crate) fn reaction_steps(graph: &MetabolicGraph, forbidden: &IndexSet<NodeIndex>) -> Vec<StepView> {
    let mut steps = Vec::new();
    for node in graph.node_indices() {
        let is_reaction = graph
            .vertex(node)
            .is_some_and(|v| v.kind == VertexKind::Reaction);
        if !is_reaction || forbidden.contains(&node) {
            continue;
        }
        let incoming = graph.in_edges(node);
        let outgoing = graph.out_edges(node);
        for direction in [StepDirection::Forward, StepDirection::Backward] {
            let substrates: Vec<_> = incoming
                .iter()
                .filter(|e| e.edge.direction == direction)
                .map(|e| (e.id, e.source))
                .collect();
            let products: Vec<_> = outgoing
                .iter()
                .filter(|e| e.edge.direction == direction)
                .map(|e| (e.id, e.target))
                .collect();
            if substrates.is_empty() && products.is_empty() {
                continue;
            }
            steps.push(StepView {
                reaction: node,
                direction,
                substrates,
                products,
            });
        }
    }
    steps
}

/// Vertices of the given kind whose base id is listed, and the number of ids matching none
///
/// Matching on the base id picks up every duplicated occurrence of a side compound.
pub(crate) fn resolve_bases(
    graph: &MetabolicGraph,
    ids: &IndexSet<String>,
    kind: VertexKind,
) -> (IndexSet<NodeIndex>, usize) {
    let mut found = IndexSet::new();
    let mut skipped = 0;
    for id in ids {
        let before = found.len();
        found.extend(graph.node_indices().filter(|n| {
            graph
                .vertex(*n)
                .is_some_and(|v| v.kind == kind && v.id.base == *id)
        }));
        if found.len() == before {
            warn!("Ignoring {}, no {:?} vertex has this id", id, kind);
            skipped += 1;
        }
    }
    (found, skipped)
}

pub(crate) fn require_bipartite(graph: &MetabolicGraph) -> Result<(), GraphError> {
    graph.require_kind(ProjectionKind::Bipartite)
}

/// Result graph made of the given edges plus the given species, even when isolated
pub(crate) fn assemble(
    graph: &MetabolicGraph,
    edges: &IndexSet<EdgeIndex>,
    species: &IndexSet<NodeIndex>,
) -> MetabolicGraph {
    let mut result = graph.edge_subgraph(edges.iter());
    for node in species {
        if let Some(vertex) = graph.vertex(*node) {
            result.add_vertex(vertex.clone());
        }
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::graph::projection::tests::model_from;
    use crate::graph::projection::{build, BuildOptions};

    /// Bipartite graph of a small network
    ///
    /// R1: A -> B, R2: B + C -> D, R3: D <-> E, R4: F -> A
    pub(crate) fn network() -> MetabolicGraph {
        let model = model_from(&[
            ("R1", &[("A", -1.0), ("B", 1.0)], false),
            ("R2", &[("B", -1.0), ("C", -1.0), ("D", 1.0)], false),
            ("R3", &[("D", -1.0), ("E", 1.0)], true),
            ("R4", &[("F", -1.0), ("A", 1.0)], false),
        ]);
        build(&model, ProjectionKind::Bipartite, &BuildOptions::default()).0
    }

    #[test]
    fn steps_follow_edge_directions() {
        let graph = network();
        let steps = reaction_steps(&graph, &IndexSet::new());
        assert_eq!(steps.len(), 5);
        let r3: Vec<&StepView> = steps
            .iter()
            .filter(|s| graph.id_of(s.reaction).base == "R3")
            .collect();
        assert_eq!(r3.len(), 2);
        assert_eq!(r3[0].direction, StepDirection::Forward);
        assert_eq!(graph.id_of(r3[1].substrates[0].1).base, "E");
        assert_eq!(graph.id_of(r3[1].products[0].1).base, "D");
    }

    #[test]
    fn bases_resolve_to_vertices() {
        let graph = network();
        let ids: IndexSet<String> = ["A", "R1", "zz"].iter().map(|s| s.to_string()).collect();
        let (found, skipped) = resolve_bases(&graph, &ids, VertexKind::Species);
        assert_eq!(found.len(), 1);
        assert_eq!(skipped, 2);
    }
}

//! Choke points
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use crate::graph::{EdgeEntry, GraphError, MetabolicGraph, NodeIndex, ProjectionKind, VertexId, VertexKind};

/// Why a reaction is a choke point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ChokeRole {
    /// Only reaction producing the species
    Producer,
    /// Only reaction consuming the species
    Consumer,
}

/// A reaction which is the sole producer or sole consumer of a species
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChokePoint {
    pub reaction: String,
    pub species: VertexId,
    pub role: ChokeRole,
}

/// Every (reaction, species) pair making a reaction a choke point
///
/// Producers and consumers are read from the `via` sets of a compound transition graph, or from
/// the reaction neighbours of species in a bipartite graph.
///
/// # Errors
/// [`GraphError::WrongProjection`] for reaction adjacency and pathway overlap graphs
pub fn choke_points(graph: &MetabolicGraph) -> Result<Vec<ChokePoint>, GraphError> {
    let roles: fn(&MetabolicGraph, NodeIndex) -> (Vec<String>, Vec<String>) = match graph.kind() {
        ProjectionKind::CompoundTransition => compound_roles,
        ProjectionKind::Bipartite => bipartite_roles,
        found => {
            return Err(GraphError::WrongProjection {
                expected: ProjectionKind::CompoundTransition,
                found,
            })
        }
    };
    let mut found = Vec::new();
    for node in graph.node_indices() {
        let Some(vertex) = graph.vertex(node) else {
            continue;
        };
        if vertex.kind != VertexKind::Species {
            continue;
        }
        let (producers, consumers) = roles(graph, node);
        for (reactions, role) in [(producers, ChokeRole::Producer), (consumers, ChokeRole::Consumer)] {
            if let [reaction] = reactions.as_slice() {
                found.push(ChokePoint {
                    reaction: reaction.clone(),
                    species: vertex.id.clone(),
                    role,
                });
            }
        }
    }
    debug!("Found {} choke point pairs", found.len());
    Ok(found)
}

/// Reactions which are choke points for at least one species
pub fn choke_reactions(graph: &MetabolicGraph) -> Result<IndexSet<String>, GraphError> {
    Ok(choke_points(graph)?
        .into_iter()
        .map(|c| c.reaction)
        .collect())
}

fn compound_roles(graph: &MetabolicGraph, node: NodeIndex) -> (Vec<String>, Vec<String>) {
    (
        reactions_via(&graph.in_edges(node)),
        reactions_via(&graph.out_edges(node)),
    )
}

/// Distinct reactions behind the edges, self loops excluded
fn reactions_via(edges: &[EdgeEntry<'_>]) -> Vec<String> {
    edges
        .iter()
        .filter(|e| e.source != e.target)
        .flat_map(|e| e.edge.via.iter().cloned())
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

fn bipartite_roles(graph: &MetabolicGraph, node: NodeIndex) -> (Vec<String>, Vec<String>) {
    let names = |nodes: IndexSet<NodeIndex>| -> Vec<String> {
        nodes
            .into_iter()
            .filter_map(|n| graph.vertex(n))
            .filter(|v| v.kind == VertexKind::Reaction)
            .map(|v| v.id.base.clone())
            .collect::<IndexSet<String>>()
            .into_iter()
            .collect()
    };
    (names(graph.predecessors(node)), names(graph.successors(node)))
}

/// Number of choke point pairs per reaction
pub fn choke_counts(points: &[ChokePoint]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for point in points {
        *counts.entry(point.reaction.clone()).or_insert(0) += 1;
    }
    counts
}

//! Directed multigraph views of a metabolic model
//!
//! A [`MetabolicGraph`] holds typed vertices (species, reactions, pathways) and edges carrying a
//! weight, a reversibility flag, a side compound flag and back references to the entities
//! justifying them. The four projections of a [`Model`](crate::metabolic_model::model::Model)
//! are built in [`projection`], the structural transformations (undirected mirroring, parallel
//! edge merging, compartment merging) live in [`transform`].
use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metabolic_model::reaction::StepDirection;

pub mod export;
pub mod projection;
pub mod transform;

pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};

// region Vertices and Edges
/// Identity of a vertex
///
/// `base` is the id of the catalog entity, `context` is only set for side compound occurrences
/// duplicated per reaction, and holds the id of that reaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId {
    pub base: String,
    pub context: Option<String>,
}

impl VertexId {
    pub fn new(base: &str) -> VertexId {
        VertexId {
            base: base.to_string(),
            context: None,
        }
    }

    /// Identity of an entity occurring in the context of a reaction
    pub fn occurrence(base: &str, context: &str) -> VertexId {
        VertexId {
            base: base.to_string(),
            context: Some(context.to_string()),
        }
    }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}_{}", self.base, context),
            None => write!(f, "{}", self.base),
        }
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        VertexId::new(value)
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        VertexId {
            base: value,
            context: None,
        }
    }
}

/// Which kind of catalog entity a vertex stands for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexKind {
    Species,
    Reaction,
    Pathway,
}

/// A vertex of a [`MetabolicGraph`]
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub kind: VertexKind,
    /// Set for side compounds (and their duplicated occurrences)
    pub is_side: bool,
}

impl Vertex {
    pub fn species(id: VertexId) -> Vertex {
        Vertex {
            id,
            kind: VertexKind::Species,
            is_side: false,
        }
    }

    pub fn reaction(id: &str) -> Vertex {
        Vertex {
            id: VertexId::new(id),
            kind: VertexKind::Reaction,
            is_side: false,
        }
    }

    pub fn pathway(id: &str) -> Vertex {
        Vertex {
            id: VertexId::new(id),
            kind: VertexKind::Pathway,
            is_side: false,
        }
    }
}

/// An edge of a [`MetabolicGraph`]
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    /// Weight of the edge, None until a weighting policy assigns one
    pub weight: Option<f64>,
    /// Whether the reaction(s) behind the edge are reversible
    pub reversible: bool,
    /// Whether the edge follows the reaction as written or its reverse
    pub direction: StepDirection,
    /// Whether the edge touches a side compound
    pub side: bool,
    /// Ids of the entities justifying the edge
    ///
    /// Reactions for bipartite and compound transition edges, linking species for reaction
    /// adjacency edges and shared species for pathway overlap edges.
    pub via: IndexSet<String>,
}

impl Edge {
    pub fn new(direction: StepDirection) -> Edge {
        Edge {
            weight: None,
            reversible: false,
            direction,
            side: false,
            via: IndexSet::new(),
        }
    }

    /// Edge justified by a single entity
    pub fn via(direction: StepDirection, entity: &str) -> Edge {
        let mut edge = Edge::new(direction);
        edge.via.insert(entity.to_string());
        edge
    }

    /// The weight, an unassigned weight reads as 1
    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// Borrowed view of an edge together with its endpoints
#[derive(Clone, Copy, Debug)]
pub struct EdgeEntry<'a> {
    pub id: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub edge: &'a Edge,
}
// endregion Vertices and Edges

/// The four graph views of a metabolic model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionKind {
    /// Species and reactions, substrate -> reaction -> product
    Bipartite,
    /// Species only, substrate -> product for every reaction
    CompoundTransition,
    /// Reactions only, producer -> consumer of a shared species
    ReactionAdjacency,
    /// Pathways only, linked when they share species
    PathwayOverlap,
}

/// A directed multigraph projected from a metabolic model
#[derive(Clone, Debug)]
pub struct MetabolicGraph {
    graph: StableDiGraph<Vertex, Edge>,
    index: IndexMap<VertexId, NodeIndex>,
    kind: ProjectionKind,
    undirected: bool,
}

impl MetabolicGraph {
    /// Create an empty graph of the given kind
    pub fn new(kind: ProjectionKind) -> MetabolicGraph {
        MetabolicGraph {
            graph: StableDiGraph::new(),
            index: IndexMap::new(),
            kind,
            undirected: false,
        }
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    /// Whether every edge has been mirrored by [`MetabolicGraph::as_undirected`]
    pub fn is_undirected(&self) -> bool {
        self.undirected
    }

    pub(crate) fn set_undirected(&mut self, undirected: bool) {
        self.undirected = undirected;
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Fail with [`GraphError::WrongProjection`] unless the graph has the expected kind
    pub fn require_kind(&self, expected: ProjectionKind) -> Result<(), GraphError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(GraphError::WrongProjection {
                expected,
                found: self.kind,
            })
        }
    }

    // region Vertex access
    /// Add a vertex, returning the index of the existing vertex if the id is already present
    pub fn add_vertex(&mut self, vertex: Vertex) -> NodeIndex {
        if let Some(idx) = self.index.get(&vertex.id) {
            return *idx;
        }
        let id = vertex.id.clone();
        let idx = self.graph.add_node(vertex);
        self.index.insert(id, idx);
        idx
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_index(&self, id: &VertexId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Index of a vertex, or a [`GraphError::VertexNotFound`]
    pub fn require_node(&self, id: &VertexId) -> Result<NodeIndex, GraphError> {
        self.node_index(id)
            .ok_or_else(|| GraphError::VertexNotFound(id.to_string()))
    }

    pub fn vertex(&self, idx: NodeIndex) -> Option<&Vertex> {
        self.graph.node_weight(idx)
    }

    pub fn vertex_by_id(&self, id: &VertexId) -> Option<&Vertex> {
        self.node_index(id).and_then(|idx| self.graph.node_weight(idx))
    }

    /// Id of a vertex known to be in the graph
    pub(crate) fn id_of(&self, idx: NodeIndex) -> &VertexId {
        &self.graph[idx].id
    }

    /// Vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.index.values().map(move |idx| &self.graph[*idx])
    }

    /// Vertex indices in insertion order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.index.values().copied()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = &VertexId> + '_ {
        self.index.keys()
    }

    /// Position of a vertex in insertion order, used to index dense vectors and matrices
    pub fn position(&self, id: &VertexId) -> Option<usize> {
        self.index.get_index_of(id)
    }

    /// Remove a vertex and its incident edges
    pub fn remove_vertex(&mut self, id: &VertexId) -> Option<Vertex> {
        let idx = self.index.shift_remove(id)?;
        self.graph.remove_node(idx)
    }

    /// Remove every vertex whose base id is in `ids`, including duplicated occurrences
    ///
    /// Returns the number of removed vertices.
    pub fn remove_vertices<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let bases: IndexSet<&str> = ids.into_iter().collect();
        let doomed: Vec<VertexId> = self
            .index
            .keys()
            .filter(|id| bases.contains(id.base.as_str()))
            .cloned()
            .collect();
        let mut removed = 0;
        for id in doomed.iter() {
            if self.remove_vertex(id).is_some() {
                removed += 1;
            }
        }
        removed
    }
    // endregion Vertex access

    // region Edge access
    /// Add an edge between two vertices already in the graph
    pub fn add_edge(
        &mut self,
        source: &VertexId,
        target: &VertexId,
        edge: Edge,
    ) -> Result<EdgeIndex, GraphError> {
        let s = self.require_node(source)?;
        let t = self.require_node(target)?;
        Ok(self.graph.add_edge(s, t, edge))
    }

    pub(crate) fn add_edge_between(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        edge: Edge,
    ) -> EdgeIndex {
        self.graph.add_edge(source, target, edge)
    }

    pub fn edge(&self, idx: EdgeIndex) -> Option<&Edge> {
        self.graph.edge_weight(idx)
    }

    pub(crate) fn edge_mut(&mut self, idx: EdgeIndex) -> Option<&mut Edge> {
        self.graph.edge_weight_mut(idx)
    }

    pub fn edge_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// Every edge, ordered by edge index
    pub fn edges(&self) -> impl Iterator<Item = EdgeEntry<'_>> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (source, target) = self.graph.edge_endpoints(e)?;
            Some(EdgeEntry {
                id: e,
                source,
                target,
                edge: &self.graph[e],
            })
        })
    }

    pub fn edge_indices(&self) -> Vec<EdgeIndex> {
        self.graph.edge_indices().collect()
    }

    /// Edges leaving (`Outgoing`) or entering (`Incoming`) a vertex, ordered by edge index
    pub fn edges_directed(&self, idx: NodeIndex, direction: Direction) -> Vec<EdgeEntry<'_>> {
        let mut entries: Vec<EdgeEntry> = self
            .graph
            .edges_directed(idx, direction)
            .filter_map(|e| {
                let (source, target) = self.graph.edge_endpoints(e.id())?;
                Some(EdgeEntry {
                    id: e.id(),
                    source,
                    target,
                    edge: e.weight(),
                })
            })
            .collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    pub fn out_edges(&self, idx: NodeIndex) -> Vec<EdgeEntry<'_>> {
        self.edges_directed(idx, Direction::Outgoing)
    }

    pub fn in_edges(&self, idx: NodeIndex) -> Vec<EdgeEntry<'_>> {
        self.edges_directed(idx, Direction::Incoming)
    }

    /// Distinct vertices reached by an outgoing edge
    pub fn successors(&self, idx: NodeIndex) -> IndexSet<NodeIndex> {
        self.out_edges(idx).into_iter().map(|e| e.target).collect()
    }

    /// Distinct vertices with an edge toward this vertex
    pub fn predecessors(&self, idx: NodeIndex) -> IndexSet<NodeIndex> {
        self.in_edges(idx).into_iter().map(|e| e.source).collect()
    }

    /// Distinct vertices linked to this vertex in either direction
    pub fn neighbors(&self, idx: NodeIndex) -> IndexSet<NodeIndex> {
        let mut neighbors = self.predecessors(idx);
        neighbors.extend(self.successors(idx));
        neighbors.shift_remove(&idx);
        neighbors
    }

    /// Edges running from `source` to `target`
    pub fn edges_between(
        &self,
        source: &VertexId,
        target: &VertexId,
    ) -> Result<Vec<EdgeIndex>, GraphError> {
        let s = self.require_node(source)?;
        let t = self.require_node(target)?;
        Ok(self
            .out_edges(s)
            .into_iter()
            .filter(|e| e.target == t)
            .map(|e| e.id)
            .collect())
    }

    /// Assign a weight to an edge of the graph
    pub fn set_weight(&mut self, idx: EdgeIndex, weight: f64) -> Result<(), GraphError> {
        match self.graph.edge_weight_mut(idx) {
            Some(edge) => {
                edge.weight = Some(weight);
                Ok(())
            }
            None => Err(GraphError::EdgeNotFound(format!("{}", idx.index()))),
        }
    }

    pub fn remove_edge(&mut self, idx: EdgeIndex) -> Option<Edge> {
        self.graph.remove_edge(idx)
    }
    // endregion Edge access

    // region Degrees
    pub fn in_degree(&self, id: &VertexId) -> Result<usize, GraphError> {
        let idx = self.require_node(id)?;
        Ok(self.graph.edges_directed(idx, Direction::Incoming).count())
    }

    pub fn out_degree(&self, id: &VertexId) -> Result<usize, GraphError> {
        let idx = self.require_node(id)?;
        Ok(self.graph.edges_directed(idx, Direction::Outgoing).count())
    }

    /// In-degree plus out-degree
    pub fn degree(&self, id: &VertexId) -> Result<usize, GraphError> {
        Ok(self.in_degree(id)? + self.out_degree(id)?)
    }

    pub(crate) fn in_degree_of(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    pub(crate) fn out_degree_of(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }
    // endregion Degrees
}

/// Errors raised by operations on a graph that does not hold the referenced element
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} is not present in the graph")]
    VertexNotFound(String),
    #[error("Edge {0} is not present in the graph")]
    EdgeNotFound(String),
    #[error("Operation requires a {expected:?} graph, but the graph is {found:?}")]
    WrongProjection {
        expected: ProjectionKind,
        found: ProjectionKind,
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

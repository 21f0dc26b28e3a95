//! Structural transformations of a projection
//!
//! None of these touch the model the graph was built from.
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use tracing::debug;

use crate::configuration::CONFIGURATION;
use crate::graph::{Edge, EdgeIndex, GraphError, MetabolicGraph, NodeIndex, VertexId, VertexKind};
use crate::metabolic_model::model::Model;

/// Rule used to combine the weights of parallel edges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combiner {
    Min,
    Max,
    Sum,
}

impl Combiner {
    pub fn combine(&self, a: f64, b: f64) -> f64 {
        match self {
            Combiner::Min => a.min(b),
            Combiner::Max => a.max(b),
            Combiner::Sum => a + b,
        }
    }
}

/// Key under which species of different compartments are merged
#[derive(Clone, Debug)]
pub enum MergeKey {
    /// Species with the same name are merged (species without a name keep their id)
    ByName,
    /// Species with the same id once the matching suffix is removed are merged
    StripSuffix(Regex),
}

impl MergeKey {
    /// Strip the compartment suffix configured in [`CONFIGURATION`]
    pub fn default_suffix() -> Result<MergeKey, GraphError> {
        let pattern = CONFIGURATION
            .read()
            .map_err(|_| GraphError::InvalidParameter("configuration unavailable".to_string()))?
            .compartment_suffix
            .clone();
        let regex = Regex::new(&pattern).map_err(|e| GraphError::InvalidParameter(e.to_string()))?;
        Ok(MergeKey::StripSuffix(regex))
    }

    fn key_of(&self, model: &Model, id: &str) -> String {
        match self {
            MergeKey::ByName => model
                .metabolites
                .get(id)
                .and_then(|m| m.name.clone())
                .unwrap_or_else(|| id.to_string()),
            MergeKey::StripSuffix(regex) => regex.replace(id, "").into_owned(),
        }
    }
}

impl MetabolicGraph {
    /// Copy of the graph where every edge u -> v is joined by a mirrored v -> u
    ///
    /// The mirrored edge carries the same weight and metadata.
    pub fn as_undirected(&self) -> MetabolicGraph {
        let mut undirected = self.clone();
        for entry in self.edges() {
            undirected.add_edge_between(entry.target, entry.source, entry.edge.clone());
        }
        undirected.set_undirected(true);
        undirected
    }

    /// Copy of the graph with every edge reversed
    pub fn reversed(&self) -> MetabolicGraph {
        let mut reversed = self.clone();
        for idx in self.edge_indices() {
            reversed.remove_edge(idx);
        }
        for entry in self.edges() {
            reversed.add_edge_between(entry.target, entry.source, entry.edge.clone());
        }
        reversed
    }

    /// Collapse edges sharing the same source and target with a [`Combiner`]
    ///
    /// Returns the number of removed edges.
    pub fn merge_parallel_edges(&mut self, combiner: Combiner) -> usize {
        self.merge_parallel_edges_with(|a, b| combiner.combine(a, b))
    }

    /// Collapse edges sharing the same source and target with an associative function over
    /// their weights
    ///
    /// The first edge of each group survives; the `via` sets are unioned and the flags are
    /// or-ed. When no edge of a group has a weight, the merged edge stays unassigned, otherwise
    /// unassigned weights count as 1.
    pub fn merge_parallel_edges_with<F>(&mut self, combine: F) -> usize
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut groups: IndexMap<(NodeIndex, NodeIndex), Vec<EdgeIndex>> = IndexMap::new();
        for entry in self.edges() {
            groups
                .entry((entry.source, entry.target))
                .or_default()
                .push(entry.id);
        }
        let mut removed = 0;
        for (_, edges) in groups.into_iter().filter(|(_, e)| e.len() > 1) {
            let mut merged = match self.edge(edges[0]) {
                Some(edge) => edge.clone(),
                None => continue,
            };
            for idx in edges.iter().skip(1) {
                if let Some(other) = self.remove_edge(*idx) {
                    merged.weight = match (merged.weight, other.weight) {
                        (None, None) => None,
                        (a, b) => Some(combine(a.unwrap_or(1.0), b.unwrap_or(1.0))),
                    };
                    merged.reversible |= other.reversible;
                    merged.side |= other.side;
                    merged.via.extend(other.via);
                    removed += 1;
                }
            }
            if let Some(edge) = self.edge_mut(edges[0]) {
                *edge = merged;
            }
        }
        debug!("Merged {} parallel edges", removed);
        removed
    }

    /// Merge species vertices standing for the same compound in different compartments
    ///
    /// The first vertex of each group (in insertion order) survives, the edges of the others are
    /// re-pointed to it and self loops created by the contraction are dropped. Duplicated side
    /// compound occurrences are only merged with occurrences of the same reaction.
    ///
    /// Returns the number of merged (removed) vertices.
    pub fn decompartmentalize(&mut self, model: &Model, key: &MergeKey) -> usize {
        let mut groups: IndexMap<(String, Option<String>), Vec<NodeIndex>> = IndexMap::new();
        for idx in self.node_indices().collect::<Vec<_>>() {
            let vertex = &self.graph[idx];
            if vertex.kind != VertexKind::Species {
                continue;
            }
            let merge_key = key.key_of(model, &vertex.id.base);
            groups
                .entry((merge_key, vertex.id.context.clone()))
                .or_default()
                .push(idx);
        }

        let mut merged = 0;
        for (_, members) in groups.into_iter().filter(|(_, m)| m.len() > 1) {
            let survivor = members[0];
            for idx in members.iter().skip(1) {
                let mut moved: Vec<(NodeIndex, NodeIndex, Edge)> = Vec::new();
                for entry in self.out_edges(*idx) {
                    moved.push((survivor, entry.target, entry.edge.clone()));
                }
                for entry in self.in_edges(*idx) {
                    moved.push((entry.source, survivor, entry.edge.clone()));
                }
                let id = self.id_of(*idx).clone();
                self.remove_vertex(&id);
                for (source, target, edge) in moved {
                    let source = if source == *idx { survivor } else { source };
                    let target = if target == *idx { survivor } else { target };
                    if source != target {
                        self.add_edge_between(source, target, edge);
                    }
                }
                merged += 1;
            }
        }
        debug!("Merged {} compartment specific vertices", merged);
        merged
    }

    /// Graph restricted to the given vertices and the edges between them
    pub fn induced_subgraph<'a, I>(&self, ids: I) -> MetabolicGraph
    where
        I: IntoIterator<Item = &'a VertexId>,
    {
        let keep: IndexSet<&VertexId> = ids.into_iter().collect();
        let mut sub = MetabolicGraph::new(self.kind());
        sub.set_undirected(self.is_undirected());
        for vertex in self.vertices().filter(|v| keep.contains(&v.id)) {
            sub.add_vertex(vertex.clone());
        }
        for entry in self.edges() {
            if let (Some(s), Some(t)) = (
                sub.node_index(self.id_of(entry.source)),
                sub.node_index(self.id_of(entry.target)),
            ) {
                sub.add_edge_between(s, t, entry.edge.clone());
            }
        }
        sub
    }

    /// Graph made of the given edges and their endpoints
    pub fn edge_subgraph<'a, I>(&self, edges: I) -> MetabolicGraph
    where
        I: IntoIterator<Item = &'a EdgeIndex>,
    {
        let mut sub = MetabolicGraph::new(self.kind());
        sub.set_undirected(self.is_undirected());
        let mut seen: IndexSet<EdgeIndex> = IndexSet::new();
        for idx in edges {
            if !seen.insert(*idx) {
                continue;
            }
            let (Some((source, target)), Some(edge)) = (self.edge_endpoints(*idx), self.edge(*idx))
            else {
                continue;
            };
            let s = sub.add_vertex(self.graph[source].clone());
            let t = sub.add_vertex(self.graph[target].clone());
            sub.add_edge_between(s, t, edge.clone());
        }
        sub
    }
}

//! Weights supplied by the caller as a lookup table
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::graph::{MetabolicGraph, VertexId};
use crate::weighting::{assign_weights, WeightingPolicy, WeightingReport};

/// Key of an external weight: the edge endpoints and optionally the reaction behind the edge
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightKey {
    pub source: VertexId,
    pub target: VertexId,
    pub context: Option<String>,
}

impl WeightKey {
    pub fn new(source: &str, target: &str) -> WeightKey {
        WeightKey {
            source: VertexId::new(source),
            target: VertexId::new(target),
            context: None,
        }
    }

    pub fn with_context(source: &str, target: &str, context: &str) -> WeightKey {
        WeightKey {
            source: VertexId::new(source),
            target: VertexId::new(target),
            context: Some(context.to_string()),
        }
    }
}

pub type WeightTable = IndexMap<WeightKey, f64>;

/// Weights read from a table keyed by (source, target, context)
///
/// An edge is first looked up with each reaction of its `via` set as context, then without
/// context. Edges missing from the table are removed when `remove_unassigned` is set, otherwise
/// their weight is reset to the default, which reads as 1. Infinite entries are pruned like any
/// other invalid weight.
#[derive(Clone, Debug)]
pub struct ExternalWeights {
    pub table: WeightTable,
    pub remove_unassigned: bool,
}

impl ExternalWeights {
    pub fn new(table: WeightTable, remove_unassigned: bool) -> ExternalWeights {
        ExternalWeights {
            table,
            remove_unassigned,
        }
    }
}

impl WeightingPolicy for ExternalWeights {
    fn apply(&self, graph: &mut MetabolicGraph) -> WeightingReport {
        let skipped = self
            .table
            .keys()
            .filter(|k| !graph.contains(&k.source) || !graph.contains(&k.target))
            .count();
        if skipped > 0 {
            warn!("{} weight entries reference vertices absent from the graph", skipped);
        }

        let mut report = assign_weights(graph, self.remove_unassigned, |g, entry| {
            let source = g.id_of(entry.source);
            let target = g.id_of(entry.target);
            let mut key = WeightKey {
                source: source.clone(),
                target: target.clone(),
                context: None,
            };
            for reaction in entry.edge.via.iter() {
                key.context = Some(reaction.clone());
                if let Some(w) = self.table.get(&key) {
                    return Some(*w);
                }
            }
            key.context = None;
            self.table.get(&key).copied()
        });
        report.skipped = skipped;
        report
    }
}

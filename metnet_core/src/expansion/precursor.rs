//! Precursor network of a set of target compounds
use derive_builder::Builder;
use indexmap::IndexSet;
use tracing::{debug, info};

use crate::expansion::{assemble, reaction_steps, require_bipartite, resolve_bases, ExpansionResult};
use crate::graph::{EdgeIndex, GraphError, MetabolicGraph, NodeIndex, VertexKind};

/// Inputs of a precursor expansion
#[derive(Builder, Clone, Debug, Default)]
pub struct PrecursorOptions {
    /// Compounds to produce
    #[builder(default = "IndexSet::new()")]
    pub targets: IndexSet<String>,
    /// Compounds never propagated, on top of the vertices flagged as side
    #[builder(default = "IndexSet::new()")]
    pub side_compounds: IndexSet<String>,
    /// Reactions which are never added
    #[builder(default = "IndexSet::new()")]
    pub forbidden: IndexSet<String>,
}

/// Species and reactions from which the targets can be produced
///
/// A reaction step is added when one of its products is producible, and its substrates become
/// producible. Side compounds neither trigger a step nor become producible.
///
/// # Errors
/// [`GraphError::WrongProjection`] when the graph is not bipartite
pub fn precursors(
    graph: &MetabolicGraph,
    options: &PrecursorOptions,
) -> Result<ExpansionResult, GraphError> {
    require_bipartite(graph)?;
    let (targets, skipped_targets) = resolve_bases(graph, &options.targets, VertexKind::Species);
    let (forbidden, skipped_forbidden) = resolve_bases(graph, &options.forbidden, VertexKind::Reaction);
    let is_side = |node: &NodeIndex| {
        graph.vertex(*node).is_some_and(|v| {
            v.is_side || options.side_compounds.contains(&v.id.base)
        })
    };
    let steps = reaction_steps(graph, &forbidden);

    let mut producible: IndexSet<NodeIndex> = targets.iter().copied().collect();
    let mut added: IndexSet<usize> = IndexSet::new();
    let mut trace = Vec::new();
    loop {
        let before = producible.len();
        for (i, step) in steps.iter().enumerate() {
            if added.contains(&i) {
                continue;
            }
            let triggered = step
                .products
                .iter()
                .any(|(_, p)| !is_side(p) && producible.contains(p));
            if triggered {
                added.insert(i);
                producible.extend(
                    step.substrates
                        .iter()
                        .map(|(_, s)| *s)
                        .filter(|s| !is_side(s)),
                );
            }
        }
        trace.push(producible.len());
        debug!("Precursor pass {}: {} producible species", trace.len(), producible.len());
        if producible.len() == before {
            break;
        }
    }

    let mut edges: IndexSet<EdgeIndex> = IndexSet::new();
    let mut reactions: IndexSet<NodeIndex> = IndexSet::new();
    for i in added.iter() {
        let step = &steps[*i];
        reactions.insert(step.reaction);
        edges.extend(
            step.substrates
                .iter()
                .chain(step.products.iter())
                .filter(|(_, n)| producible.contains(n))
                .map(|(e, _)| *e),
        );
    }
    let result = ExpansionResult {
        graph: assemble(graph, &edges, &producible),
        species: producible.iter().map(|n| graph.id_of(*n).clone()).collect(),
        reactions: reactions.iter().map(|n| graph.id_of(*n).base.clone()).collect(),
        passes: trace.len(),
        trace,
        skipped: skipped_targets + skipped_forbidden,
    };
    info!(
        "Precursor network of {} species and {} reactions in {} passes",
        result.species.len(),
        result.reactions.len(),
        result.passes
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::tests::network;
    use crate::graph::projection::tests::model_from;
    use crate::graph::projection::{build, BuildOptionsBuilder, SideCompoundHandling};
    use crate::graph::{ProjectionKind, VertexId};

    fn ids(values: &[&str]) -> IndexSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn targets(values: &[&str]) -> PrecursorOptions {
        PrecursorOptionsBuilder::default()
            .targets(ids(values))
            .build()
            .unwrap()
    }

    #[test]
    fn walks_back_from_targets() {
        let graph = network();
        let result = precursors(&graph, &targets(&["D"])).unwrap();
        let species: Vec<String> = result.species.iter().map(|s| s.to_string()).collect();
        assert_eq!(species, vec!["D", "B", "C", "E", "A", "F"]);
        assert_eq!(result.reactions, ids(&["R1", "R2", "R3", "R4"]));
        assert_eq!(result.skipped, 0);
        assert_eq!(result.trace.len(), result.passes);
        assert!(result.trace.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn byproducts_are_left_out() {
        let model = model_from(&[
            ("R1", &[("a", -1.0), ("t", 1.0), ("waste", 1.0)], false),
            ("R2", &[("waste", -1.0), ("z", 1.0)], false),
        ]);
        let (graph, _) = build(&model, ProjectionKind::Bipartite, &Default::default());
        let result = precursors(&graph, &targets(&["t"])).unwrap();
        assert_eq!(result.reactions, ids(&["R1"]));
        assert!(!result.graph.contains(&VertexId::new("waste")));
        assert_eq!(result.graph.edge_count(), 2);
    }

    #[test]
    fn side_compounds_do_not_propagate() {
        let model = model_from(&[
            ("R1", &[("a", -1.0), ("atp", -1.0), ("t", 1.0)], false),
            ("R2", &[("x", -1.0), ("atp", 1.0)], false),
        ]);
        let options = BuildOptionsBuilder::default()
            .side_compounds(ids(&["atp"]))
            .side_handling(SideCompoundHandling::Keep)
            .build()
            .unwrap();
        let (graph, _) = build(&model, ProjectionKind::Bipartite, &options);
        let result = precursors(&graph, &targets(&["t"])).unwrap();
        assert_eq!(result.reactions, ids(&["R1"]));
        assert!(!result.species.contains(&VertexId::new("atp")));
        assert!(!result.species.contains(&VertexId::new("x")));

        let unflagged = build(&model, ProjectionKind::Bipartite, &Default::default()).0;
        let mut opts = targets(&["t"]);
        opts.side_compounds = ids(&["atp"]);
        let result = precursors(&unflagged, &opts).unwrap();
        assert_eq!(result.species.len(), 2);
    }

    #[test]
    fn requires_bipartite_graph() {
        let graph = MetabolicGraph::new(ProjectionKind::ReactionAdjacency);
        assert!(precursors(&graph, &targets(&["x"])).is_err());
    }
}

//! Forward scope of a set of seed compounds
use derive_builder::Builder;
use indexmap::IndexSet;
use tracing::{debug, info};

use crate::expansion::{assemble, reaction_steps, require_bipartite, resolve_bases, ExpansionResult};
use crate::graph::{EdgeIndex, GraphError, MetabolicGraph, NodeIndex, VertexKind};

/// Inputs of a scope expansion
#[derive(Builder, Clone, Debug, Default)]
pub struct ScopeOptions {
    /// Compounds of interest
    #[builder(default = "IndexSet::new()")]
    pub seeds: IndexSet<String>,
    /// Ubiquitous compounds considered always available
    #[builder(default = "IndexSet::new()")]
    pub bootstrap: IndexSet<String>,
    /// Reactions which never activate
    #[builder(default = "IndexSet::new()")]
    pub forbidden: IndexSet<String>,
    /// Keep the bootstrap compounds in the result
    #[builder(default = "false")]
    pub include_bootstrap: bool,
}

/// Species and reactions reachable from the seeds
///
/// A reaction step activates the first time all its substrates are available, and makes its
/// products available. Steps without substrates never activate.
///
/// # Errors
/// [`GraphError::WrongProjection`] when the graph is not bipartite
///
/// # Examples
/// ```rust
/// use indexmap::IndexSet;
/// use metnet_core::expansion::{scope, ScopeOptionsBuilder};
/// use metnet_core::graph::{MetabolicGraph, ProjectionKind};
/// let graph = MetabolicGraph::new(ProjectionKind::Bipartite);
/// let options = ScopeOptionsBuilder::default()
///     .seeds(IndexSet::from(["glc".to_string()]))
///     .build()
///     .unwrap();
/// let result = scope(&graph, &options).unwrap();
/// assert_eq!(result.skipped, 1);
/// assert!(result.species.is_empty());
/// ```
pub fn scope(graph: &MetabolicGraph, options: &ScopeOptions) -> Result<ExpansionResult, GraphError> {
    require_bipartite(graph)?;
    let (seeds, skipped_seeds) = resolve_bases(graph, &options.seeds, VertexKind::Species);
    let (bootstrap, skipped_bootstrap) = resolve_bases(graph, &options.bootstrap, VertexKind::Species);
    let (forbidden, skipped_forbidden) = resolve_bases(graph, &options.forbidden, VertexKind::Reaction);
    let steps = reaction_steps(graph, &forbidden);

    let mut available: IndexSet<NodeIndex> = seeds.iter().chain(bootstrap.iter()).copied().collect();
    let mut activated: IndexSet<usize> = IndexSet::new();
    let mut trace = Vec::new();
    loop {
        let before = available.len();
        for (i, step) in steps.iter().enumerate() {
            if activated.contains(&i) || step.substrates.is_empty() {
                continue;
            }
            if step.substrates.iter().all(|(_, s)| available.contains(s)) {
                activated.insert(i);
                available.extend(step.products.iter().map(|(_, p)| *p));
            }
        }
        trace.push(available.len());
        debug!("Scope pass {}: {} available species", trace.len(), available.len());
        if available.len() == before {
            break;
        }
    }

    let hidden: IndexSet<NodeIndex> = if options.include_bootstrap {
        IndexSet::new()
    } else {
        bootstrap.difference(&seeds).copied().collect()
    };
    let mut edges: IndexSet<EdgeIndex> = IndexSet::new();
    let mut reactions: IndexSet<NodeIndex> = IndexSet::new();
    for i in activated.iter() {
        let step = &steps[*i];
        reactions.insert(step.reaction);
        edges.extend(
            step.substrates
                .iter()
                .chain(step.products.iter())
                .filter(|(_, n)| !hidden.contains(n))
                .map(|(e, _)| *e),
        );
    }
    let species: IndexSet<NodeIndex> = available.difference(&hidden).copied().collect();
    let result = ExpansionResult {
        graph: assemble(graph, &edges, &species),
        species: species.iter().map(|n| graph.id_of(*n).clone()).collect(),
        reactions: reactions.iter().map(|n| graph.id_of(*n).base.clone()).collect(),
        passes: trace.len(),
        trace,
        skipped: skipped_seeds + skipped_bootstrap + skipped_forbidden,
    };
    info!(
        "Scope reached {} species and {} reactions in {} passes",
        result.species.len(),
        result.reactions.len(),
        result.passes
    );
    Ok(result)
}

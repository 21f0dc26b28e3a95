//! Construction of the graph projections of a metabolic model
//!
//! Each projection is a strategy implementing [`Projection`]; [`build`] picks the strategy for a
//! [`ProjectionKind`], populates a graph and then applies the exclusions of the
//! [`BuildOptions`].
use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use crate::graph::{Edge, MetabolicGraph, NodeIndex, ProjectionKind, Vertex, VertexId};
use crate::metabolic_model::model::Model;
use crate::metabolic_model::pathway::Pathway;
use crate::metabolic_model::reaction::{Reaction, StepDirection};

/// How side compounds are represented in a projection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SideCompoundHandling {
    /// Side compounds are removed from the graph
    #[default]
    Remove,
    /// Each reaction gets its own copy of a side compound (bipartite graphs only, other
    /// projections treat this as [`SideCompoundHandling::Keep`])
    Duplicate,
    /// Side compounds stay as single vertices, flagged as side
    Keep,
}

/// Options controlling the construction of a projection
#[derive(Builder, Clone, Debug, Default)]
pub struct BuildOptions {
    /// Ids of entities (species, reactions or pathways) removed after construction
    #[builder(default = "IndexSet::new()")]
    pub excluded: IndexSet<String>,
    /// Ids of ubiquitous species (water, ATP, ...)
    #[builder(default = "IndexSet::new()")]
    pub side_compounds: IndexSet<String>,
    /// Representation of the side compounds
    #[builder(default = "SideCompoundHandling::Remove")]
    pub side_handling: SideCompoundHandling,
}

impl BuildOptions {
    fn is_side(&self, id: &str) -> bool {
        self.side_compounds.contains(id)
    }

    /// Whether a species can link vertices in projections without species vertices
    fn links(&self, id: &str) -> bool {
        !self.is_side(id) && !self.excluded.contains(id)
    }
}

/// Summary of a projection build
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Exclusion and side compound ids which are not in the model
    pub skipped: usize,
    /// Vertices removed by exclusions or side compound removal
    pub removed: usize,
    /// Inactive reactions left out of the projection
    pub inactive_reactions: usize,
}

/// Construction rules of one projection kind
pub trait Projection {
    fn kind(&self) -> ProjectionKind;

    /// Add the vertices and edges of the projection to an empty graph
    fn populate(&self, model: &Model, options: &BuildOptions, graph: &mut MetabolicGraph);
}

/// Build a projection of the model
///
/// # Parameters
/// - `model`: catalog to read from
/// - `kind`: which projection to build
/// - `options`: exclusions and side compound handling
///
/// # Returns
/// The graph, and a [`BuildReport`] counting the skipped ids
///
/// # Examples
/// ```rust
/// use metnet_core::graph::ProjectionKind;
/// use metnet_core::graph::projection::{build, BuildOptions};
/// use metnet_core::metabolic_model::model::Model;
/// let (graph, report) = build(&Model::new_empty(), ProjectionKind::Bipartite, &BuildOptions::default());
/// assert!(graph.is_empty());
/// assert_eq!(report.skipped, 0);
/// ```
pub fn build(
    model: &Model,
    kind: ProjectionKind,
    options: &BuildOptions,
) -> (MetabolicGraph, BuildReport) {
    let strategy: Box<dyn Projection> = match kind {
        ProjectionKind::Bipartite => Box::new(BipartiteProjection),
        ProjectionKind::CompoundTransition => Box::new(CompoundProjection),
        ProjectionKind::ReactionAdjacency => Box::new(ReactionProjection),
        ProjectionKind::PathwayOverlap => Box::new(PathwayProjection),
    };
    build_with(model, strategy.as_ref(), options)
}

/// Build a projection with an explicit strategy
pub fn build_with(
    model: &Model,
    strategy: &dyn Projection,
    options: &BuildOptions,
) -> (MetabolicGraph, BuildReport) {
    let mut report = BuildReport::default();
    for id in options.excluded.iter().chain(options.side_compounds.iter()) {
        if !model.contains(id) {
            warn!("Ignoring {}, it is not part of the model", id);
            report.skipped += 1;
        }
    }
    report.inactive_reactions = model.list_reactions().filter(|r| !r.is_active()).count();

    let mut graph = MetabolicGraph::new(strategy.kind());
    strategy.populate(model, options, &mut graph);

    report.removed = graph.remove_vertices(options.excluded.iter().map(|s| s.as_str()));
    if options.side_handling == SideCompoundHandling::Remove {
        report.removed += graph.remove_vertices(options.side_compounds.iter().map(|s| s.as_str()));
    }
    info!(
        "Built {:?} graph with {} vertices and {} edges ({} skipped ids, {} removed vertices)",
        graph.kind(),
        graph.vertex_count(),
        graph.edge_count(),
        report.skipped,
        report.removed
    );
    (graph, report)
}

/// Active reactions of the model, in catalog order
fn active_reactions(model: &Model) -> impl Iterator<Item = &Reaction> {
    model.list_reactions().filter(|r| {
        if !r.is_active() {
            debug!("Skipping inactive reaction {}", r.id);
        }
        r.is_active()
    })
}

/// Add a species vertex for every metabolite except duplicated side compounds
fn add_species(model: &Model, options: &BuildOptions, graph: &mut MetabolicGraph, duplicate: bool) {
    for met in model.list_species() {
        let side = options.is_side(&met.id);
        if side && duplicate {
            continue;
        }
        let mut vertex = Vertex::species(VertexId::new(&met.id));
        vertex.is_side = side;
        graph.add_vertex(vertex);
    }
}

// region Bipartite
/// Species and reactions, substrate -> reaction and reaction -> product
pub struct BipartiteProjection;

impl BipartiteProjection {
    /// Vertex of a species in the context of a reaction
    fn species_node(
        model: &Model,
        options: &BuildOptions,
        graph: &mut MetabolicGraph,
        species: &str,
        reaction: &str,
    ) -> Option<NodeIndex> {
        if !model.contains_species(species) {
            debug!("Reaction {} references unknown species {}", reaction, species);
            return None;
        }
        if options.is_side(species) && options.side_handling == SideCompoundHandling::Duplicate {
            let mut vertex = Vertex::species(VertexId::occurrence(species, reaction));
            vertex.is_side = true;
            return Some(graph.add_vertex(vertex));
        }
        graph.node_index(&VertexId::new(species))
    }
}

impl Projection for BipartiteProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Bipartite
    }

    fn populate(&self, model: &Model, options: &BuildOptions, graph: &mut MetabolicGraph) {
        let duplicate = options.side_handling == SideCompoundHandling::Duplicate;
        add_species(model, options, graph, duplicate);
        for rxn in active_reactions(model) {
            let rxn_node = graph.add_vertex(Vertex::reaction(&rxn.id));
            for step in rxn.steps() {
                for input in step.inputs.iter() {
                    if let Some(s) = Self::species_node(model, options, graph, input, &rxn.id) {
                        let mut edge = Edge::via(step.direction, &rxn.id);
                        edge.reversible = rxn.is_reversible();
                        edge.side = options.is_side(input);
                        graph.add_edge_between(s, rxn_node, edge);
                    }
                }
                for output in step.outputs.iter() {
                    if let Some(p) = Self::species_node(model, options, graph, output, &rxn.id) {
                        let mut edge = Edge::via(step.direction, &rxn.id);
                        edge.reversible = rxn.is_reversible();
                        edge.side = options.is_side(output);
                        graph.add_edge_between(rxn_node, p, edge);
                    }
                }
            }
        }
    }
}
// endregion Bipartite

// region Compound transition
/// Species only, an edge from each substrate to each product of a reaction
pub struct CompoundProjection;

impl Projection for CompoundProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::CompoundTransition
    }

    fn populate(&self, model: &Model, options: &BuildOptions, graph: &mut MetabolicGraph) {
        add_species(model, options, graph, false);
        for rxn in active_reactions(model) {
            for step in rxn.steps() {
                for input in step.inputs.iter() {
                    let Some(s) = graph.node_index(&VertexId::new(input)) else {
                        continue;
                    };
                    for output in step.outputs.iter().filter(|o| *o != input) {
                        let Some(p) = graph.node_index(&VertexId::new(output)) else {
                            continue;
                        };
                        let mut edge = Edge::via(step.direction, &rxn.id);
                        edge.reversible = rxn.is_reversible();
                        edge.side = options.is_side(input) || options.is_side(output);
                        graph.add_edge_between(s, p, edge);
                    }
                }
            }
        }
    }
}
// endregion Compound transition

// region Reaction adjacency
/// Reactions only, an edge from the producer to the consumer of a species
pub struct ReactionProjection;

impl Projection for ReactionProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::ReactionAdjacency
    }

    fn populate(&self, model: &Model, options: &BuildOptions, graph: &mut MetabolicGraph) {
        let mut producers: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        let mut consumers: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        let mut reversible: IndexMap<&str, bool> = IndexMap::new();
        for rxn in active_reactions(model) {
            graph.add_vertex(Vertex::reaction(&rxn.id));
            reversible.insert(rxn.id.as_str(), rxn.is_reversible());
            for step in rxn.steps() {
                for input in step.inputs.into_iter().filter(|s| options.links(s)) {
                    consumers.entry(input).or_default().insert(rxn.id.as_str());
                }
                for output in step.outputs.into_iter().filter(|s| options.links(s)) {
                    producers.entry(output).or_default().insert(rxn.id.as_str());
                }
            }
        }

        let mut links: IndexMap<(&str, &str), Edge> = IndexMap::new();
        for (species, producing) in producers.iter() {
            if !model.contains_species(species) {
                continue;
            }
            let Some(consuming) = consumers.get(species) else {
                continue;
            };
            for p in producing.iter() {
                for c in consuming.iter().filter(|c| *c != p) {
                    let edge = links
                        .entry((*p, *c))
                        .or_insert_with(|| Edge::new(StepDirection::Forward));
                    edge.via.insert(species.to_string());
                    edge.reversible = reversible[p] && reversible[c];
                }
            }
        }
        for ((p, c), edge) in links {
            if let (Some(s), Some(t)) = (
                graph.node_index(&VertexId::new(p)),
                graph.node_index(&VertexId::new(c)),
            ) {
                graph.add_edge_between(s, t, edge);
            }
        }
    }
}
// endregion Reaction adjacency

// region Pathway overlap
/// Pathways only, linked in both directions when they share species
///
/// When the model has no explicit pathways, pathways are derived from the reaction subsystems.
pub struct PathwayProjection;

impl Projection for PathwayProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::PathwayOverlap
    }

    fn populate(&self, model: &Model, options: &BuildOptions, graph: &mut MetabolicGraph) {
        let derived: IndexMap<String, Pathway>;
        let pathways: Vec<&Pathway> = if model.pathways.is_empty() {
            derived = model.pathways_from_subsystems();
            info!("No pathways in the model, using {} subsystems", derived.len());
            derived.values().collect()
        } else {
            model.list_pathways().collect()
        };

        let mut members: Vec<(NodeIndex, IndexSet<&str>)> = Vec::new();
        for pathway in pathways {
            let node = graph.add_vertex(Vertex::pathway(&pathway.id));
            let mut species = IndexSet::new();
            for rxn in pathway
                .reactions
                .iter()
                .filter_map(|r| model.reactions.get(r))
                .filter(|r| r.is_active())
            {
                for met in rxn.metabolites.keys() {
                    if model.contains_species(met) && options.links(met) {
                        species.insert(met.as_str());
                    }
                }
            }
            members.push((node, species));
        }

        for (i, (first, first_species)) in members.iter().enumerate() {
            for (second, second_species) in members.iter().skip(i + 1) {
                let shared: IndexSet<String> = first_species
                    .intersection(second_species)
                    .map(|s| s.to_string())
                    .collect();
                if shared.is_empty() {
                    continue;
                }
                let mut edge = Edge::new(StepDirection::Forward);
                edge.weight = Some(shared.len() as f64);
                edge.reversible = true;
                edge.via = shared;
                let mut mirror = edge.clone();
                mirror.direction = StepDirection::Backward;
                graph.add_edge_between(*first, *second, edge);
                graph.add_edge_between(*second, *first, mirror);
            }
        }
    }
}
// endregion Pathway overlap

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::graph::VertexKind;
    use crate::metabolic_model::metabolite::Metabolite;
    use crate::metabolic_model::reaction::{ReactionActivity, ReactionBuilder};

    /// Model made of (id, [(species, coefficient)], reversible) reactions
    pub(crate) fn model_from(reactions: &[(&str, &[(&str, f64)], bool)]) -> Model {
        let mut model = Model::new_empty();
        for (id, metabolites, reversible) in reactions {
            for (met, _) in metabolites.iter() {
                if !model.contains_species(met) {
                    model.add_metabolite(Metabolite::new(met));
                }
            }
            model.add_reaction(
                ReactionBuilder::default()
                    .id(id.to_string())
                    .metabolites(
                        metabolites
                            .iter()
                            .map(|(m, c)| (m.to_string(), *c))
                            .collect(),
                    )
                    .lower_bound(if *reversible { -1000. } else { 0. })
                    .upper_bound(1000.)
                    .build()
                    .unwrap(),
            );
        }
        model
    }

    fn edge_pairs(graph: &MetabolicGraph) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = graph
            .edges()
            .map(|e| {
                (
                    graph.id_of(e.source).to_string(),
                    graph.id_of(e.target).to_string(),
                )
            })
            .collect();
        pairs.sort();
        pairs
    }

    fn pair(s: &str, t: &str) -> (String, String) {
        (s.to_string(), t.to_string())
    }

    #[test]
    fn compound_graph_of_single_reaction() {
        let model = model_from(&[("R", &[("A", -1.), ("B", -1.), ("C", 1.)], false)]);
        let (graph, _) = build(&model, ProjectionKind::CompoundTransition, &BuildOptions::default());
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(edge_pairs(&graph), vec![pair("A", "C"), pair("B", "C")]);
        let edge = graph.edges().next().unwrap().edge;
        assert!(edge.via.contains("R"));
        assert!(!edge.reversible);
    }

    #[test]
    fn compound_graph_reversible_reaction() {
        let model = model_from(&[("R", &[("A", -1.), ("C", 1.)], true)]);
        let (graph, _) = build(&model, ProjectionKind::CompoundTransition, &BuildOptions::default());
        assert_eq!(edge_pairs(&graph), vec![pair("A", "C"), pair("C", "A")]);
        assert!(graph.edges().all(|e| e.edge.reversible));
    }

    #[test]
    fn bipartite_graph() {
        let model = model_from(&[
            ("R1", &[("A", -1.), ("B", 1.)], false),
            ("R2", &[("B", -1.), ("C", 1.)], true),
        ]);
        let (graph, _) = build(&model, ProjectionKind::Bipartite, &BuildOptions::default());
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(
            edge_pairs(&graph),
            vec![
                pair("A", "R1"),
                pair("B", "R2"),
                pair("C", "R2"),
                pair("R1", "B"),
                pair("R2", "B"),
                pair("R2", "C"),
            ]
        );
        let r2 = graph.vertex_by_id(&VertexId::new("R2")).unwrap();
        assert_eq!(r2.kind, VertexKind::Reaction);
    }

    #[test]
    fn duplicated_side_compounds() {
        let model = model_from(&[
            ("R1", &[("A", -1.), ("atp", -1.), ("B", 1.)], false),
            ("R2", &[("B", -1.), ("atp", -1.), ("C", 1.)], false),
        ]);
        let options = BuildOptionsBuilder::default()
            .side_compounds(IndexSet::from(["atp".to_string()]))
            .side_handling(SideCompoundHandling::Duplicate)
            .build()
            .unwrap();
        let (graph, report) = build(&model, ProjectionKind::Bipartite, &options);
        assert_eq!(report.skipped, 0);
        assert!(!graph.contains(&VertexId::new("atp")));
        let copy = graph
            .vertex_by_id(&VertexId::occurrence("atp", "R1"))
            .unwrap();
        assert!(copy.is_side);
        assert!(graph.contains(&VertexId::occurrence("atp", "R2")));
        assert_eq!(graph.edges().filter(|e| e.edge.side).count(), 2);
    }

    #[test]
    fn exclusions_and_side_compound_removal() {
        let model = model_from(&[
            ("R1", &[("A", -1.), ("h2o", -1.), ("B", 1.)], false),
            ("R2", &[("B", -1.), ("C", 1.)], false),
        ]);
        let options = BuildOptionsBuilder::default()
            .excluded(IndexSet::from(["R2".to_string(), "typo".to_string()]))
            .side_compounds(IndexSet::from(["h2o".to_string()]))
            .build()
            .unwrap();
        let (graph, report) = build(&model, ProjectionKind::Bipartite, &options);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.removed, 2);
        assert!(!graph.contains(&VertexId::new("R2")));
        assert!(!graph.contains(&VertexId::new("h2o")));
        assert_eq!(edge_pairs(&graph), vec![pair("A", "R1"), pair("R1", "B")]);
    }

    #[test]
    fn inactive_reactions_are_skipped() {
        let mut model = model_from(&[("R1", &[("A", -1.), ("B", 1.)], false)]);
        model.reactions.get_mut("R1").unwrap().activity = ReactionActivity::Inactive;
        let (graph, report) = build(&model, ProjectionKind::CompoundTransition, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(report.inactive_reactions, 1);
    }

    #[test]
    fn reaction_adjacency_ignores_side_compounds() {
        let model = model_from(&[
            ("R1", &[("A", -1.), ("B", 1.), ("atp", 1.)], false),
            ("R2", &[("B", -1.), ("C", 1.)], false),
            ("R3", &[("atp", -1.), ("D", 1.)], false),
        ]);
        let options = BuildOptionsBuilder::default()
            .side_compounds(IndexSet::from(["atp".to_string()]))
            .build()
            .unwrap();
        let (graph, _) = build(&model, ProjectionKind::ReactionAdjacency, &options);
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(edge_pairs(&graph), vec![pair("R1", "R2")]);
        let edge = graph.edges().next().unwrap().edge;
        assert_eq!(edge.via.iter().collect::<Vec<_>>(), vec!["B"]);

        let (all_links, _) = build(&model, ProjectionKind::ReactionAdjacency, &BuildOptions::default());
        assert_eq!(all_links.edge_count(), 2);
    }

    #[test]
    fn pathway_overlap() {
        let mut model = model_from(&[
            ("R1", &[("A", -1.), ("B", 1.)], false),
            ("R2", &[("B", -1.), ("C", 1.)], false),
            ("R3", &[("D", -1.), ("E", 1.)], false),
        ]);
        for (rxn, subsystem) in [("R1", "P1"), ("R2", "P2"), ("R3", "P3")] {
            model.reactions.get_mut(rxn).unwrap().subsystem = Some(subsystem.to_string());
        }
        let (graph, _) = build(&model, ProjectionKind::PathwayOverlap, &BuildOptions::default());
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(edge_pairs(&graph), vec![pair("P1", "P2"), pair("P2", "P1")]);
        let edge = graph.edges().next().unwrap().edge;
        assert_eq!(edge.weight, Some(1.0));
        assert!(edge.via.contains("B"));
    }

    #[test]
    fn empty_model_gives_empty_graph() {
        let model = Model::new_empty();
        for kind in [
            ProjectionKind::Bipartite,
            ProjectionKind::CompoundTransition,
            ProjectionKind::ReactionAdjacency,
            ProjectionKind::PathwayOverlap,
        ] {
            let (graph, report) = build(&model, kind, &BuildOptions::default());
            assert!(graph.is_empty());
            assert_eq!(graph.kind(), kind);
            assert_eq!(report, BuildReport::default());
        }
    }
}

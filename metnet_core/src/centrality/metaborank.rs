//! MetaboRank: personalized PageRank in both directions of the compound graph
//!
//! The forward run ranks compounds reachable from the seeds, the reverse run (on the reversed
//! graph) ranks compounds the seeds can be reached from. Dividing each personalized score by the
//! global score of the same direction highlights compounds specifically close to the seeds.
use derive_builder::Builder;
use indexmap::IndexMap;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::centrality::{max_normalize, rank_scores, RankMap, ScoreMap};
use crate::configuration::CONFIGURATION;
use crate::graph::{GraphError, MetabolicGraph, ProjectionKind, VertexId};
use crate::weighting::{ProbabilityNormalization, WeightingPolicy};

/// Parameters of a MetaboRank analysis
///
/// # Examples
/// ```rust
/// use indexmap::IndexMap;
/// use metnet_core::centrality::MetaboRankBuilder;
/// use metnet_core::graph::VertexId;
/// let ranking = MetaboRankBuilder::default()
///     .seeds(IndexMap::from([(VertexId::new("glc"), 1.0)]))
///     .build()
///     .unwrap();
/// assert_eq!(ranking.damping, 0.85);
/// assert_eq!(ranking.max_iterations, 15000);
/// ```
#[derive(Builder, Clone, Debug)]
pub struct MetaboRank {
    /// Probability of following an edge rather than jumping
    #[builder(default = "CONFIGURATION.read().unwrap().damping")]
    pub damping: f64,
    /// L1 change between successive vectors below which the iteration stops
    #[builder(default = "CONFIGURATION.read().unwrap().tolerance")]
    pub tolerance: f64,
    #[builder(default = "CONFIGURATION.read().unwrap().max_iterations")]
    pub max_iterations: usize,
    /// Seed compounds and their relative weights
    #[builder(default = "IndexMap::new()")]
    pub seeds: IndexMap<VertexId, f64>,
}

/// Outcome of a power iteration
#[derive(Clone, Debug, PartialEq)]
pub struct PowerIterationResult {
    pub scores: DVector<f64>,
    pub iterations: usize,
    /// Whether the tolerance was reached before the iteration cap
    pub converged: bool,
}

/// Scores of one run
#[derive(Clone, Debug, Serialize)]
pub struct RankedScores {
    #[serde(serialize_with = "serialize_by_id")]
    pub scores: ScoreMap,
    /// Scores divided by the largest one
    #[serde(serialize_with = "serialize_by_id")]
    pub normalized: ScoreMap,
    #[serde(serialize_with = "serialize_by_id")]
    pub ranks: RankMap,
    pub iterations: usize,
    pub converged: bool,
}

/// The four runs of a MetaboRank analysis and the ratios between them
#[derive(Clone, Debug, Serialize)]
pub struct MetaboRankResult {
    pub global_forward: RankedScores,
    pub global_reverse: RankedScores,
    pub personalized_forward: RankedScores,
    pub personalized_reverse: RankedScores,
    /// Personalized over global score on the graph
    #[serde(serialize_with = "serialize_by_id")]
    pub forward_ratio: ScoreMap,
    /// Personalized over global score on the reversed graph
    #[serde(serialize_with = "serialize_by_id")]
    pub reverse_ratio: ScoreMap,
    /// Mean of the two ratios
    #[serde(serialize_with = "serialize_by_id")]
    pub recommendation: ScoreMap,
    #[serde(serialize_with = "serialize_by_id")]
    pub recommendation_ranks: RankMap,
    /// Seeds absent from the graph or with an unusable weight
    pub skipped_seeds: usize,
}

/// Serialize a map keyed by vertex as a map keyed by the vertex id string
fn serialize_by_id<S, V>(map: &IndexMap<VertexId, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_map(map.iter().map(|(k, v)| (k.to_string(), v)))
}

/// Column stochastic transition matrix of a probability weighted graph
///
/// Entry `(target, source)` holds the weight of the `source -> target` edges, parallel edges are
/// summed. Vertices are indexed in insertion order.
pub fn transition_matrix(graph: &MetabolicGraph) -> CsrMatrix<f64> {
    let n = graph.vertex_count();
    let mut coo = CooMatrix::new(n, n);
    for entry in graph.edges() {
        let (Some(source), Some(target)) = (
            graph.position(graph.id_of(entry.source)),
            graph.position(graph.id_of(entry.target)),
        ) else {
            continue;
        };
        coo.push(target, source, entry.edge.weight_or_default());
    }
    CsrMatrix::from(&coo)
}

/// Iterate `v' = d·M·v + (1-d)·jump` from the uniform vector
///
/// The mass of columns summing to zero (vertices without outgoing edges) is sent along `jump`,
/// so the vector keeps summing to 1 when `jump` does. Stops when the L1 change falls below
/// `tolerance` or after `max_iterations` updates.
pub fn power_iteration(
    matrix: &CsrMatrix<f64>,
    jump: &DVector<f64>,
    damping: f64,
    tolerance: f64,
    max_iterations: usize,
) -> PowerIterationResult {
    let n = matrix.nrows();
    if n == 0 {
        return PowerIterationResult {
            scores: DVector::zeros(0),
            iterations: 0,
            converged: true,
        };
    }
    let mut column_sums = DVector::<f64>::zeros(n);
    for (_, col, value) in matrix.triplet_iter() {
        column_sums[col] += value;
    }
    let dangling: Vec<usize> = (0..n).filter(|j| column_sums[*j] <= 0.0).collect();

    let mut scores = DVector::from_element(n, 1.0 / n as f64);
    let mut iterations = 0;
    let mut converged = false;
    while iterations < max_iterations {
        iterations += 1;
        let dangling_mass: f64 = dangling.iter().map(|j| scores[*j]).sum();
        let mut next = jump * ((1.0 - damping) + damping * dangling_mass);
        for (i, row) in matrix.row_iter().enumerate() {
            let flow: f64 = row
                .col_indices()
                .iter()
                .zip(row.values())
                .map(|(j, w)| w * scores[*j])
                .sum();
            next[i] += damping * flow;
        }
        let change = (&next - &scores).abs().sum();
        scores = next;
        if change < tolerance {
            converged = true;
            break;
        }
    }
    if !converged {
        debug!("Power iteration stopped after {} iterations without converging", iterations);
    }
    PowerIterationResult {
        scores,
        iterations,
        converged,
    }
}

impl MetaboRank {
    /// Run the four power iterations over a compound transition graph
    ///
    /// `weighting` is applied to the graph and to its reversed twin before their outgoing weights
    /// are normalized into transition probabilities. Seeds absent from the graph are skipped and
    /// counted; without any usable seed the personalized runs use the uniform jump.
    ///
    /// # Errors
    /// - [`GraphError::WrongProjection`] when the graph is not a compound transition graph
    /// - [`GraphError::InvalidParameter`] for a damping outside `[0, 1]` or a non positive
    ///   tolerance
    pub fn compute(
        &self,
        graph: &MetabolicGraph,
        weighting: &dyn WeightingPolicy,
    ) -> Result<MetaboRankResult, GraphError> {
        graph.require_kind(ProjectionKind::CompoundTransition)?;
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(GraphError::InvalidParameter(format!(
                "damping {} is not within [0, 1]",
                self.damping
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(GraphError::InvalidParameter(format!(
                "tolerance {} is not positive",
                self.tolerance
            )));
        }

        let (personal_jump, skipped_seeds) = self.seed_vector(graph);
        let uniform = uniform_jump(graph.vertex_count());

        let mut forward = graph.clone();
        weighting.apply(&mut forward);
        ProbabilityNormalization.apply(&mut forward);
        let mut reverse = graph.reversed();
        weighting.apply(&mut reverse);
        ProbabilityNormalization.apply(&mut reverse);
        let forward_matrix = transition_matrix(&forward);
        let reverse_matrix = transition_matrix(&reverse);

        let ids: Vec<VertexId> = graph.vertex_ids().cloned().collect();
        let run = |matrix: &CsrMatrix<f64>, jump: &DVector<f64>| {
            let result = power_iteration(
                matrix,
                jump,
                self.damping,
                self.tolerance,
                self.max_iterations,
            );
            ranked(&ids, result)
        };
        let global_forward = run(&forward_matrix, &uniform);
        let global_reverse = run(&reverse_matrix, &uniform);
        let personalized_forward = run(&forward_matrix, &personal_jump);
        let personalized_reverse = run(&reverse_matrix, &personal_jump);

        let forward_ratio = ratio(&personalized_forward.scores, &global_forward.scores);
        let reverse_ratio = ratio(&personalized_reverse.scores, &global_reverse.scores);
        let recommendation: ScoreMap = forward_ratio
            .iter()
            .map(|(id, f)| {
                let r = reverse_ratio.get(id).copied().unwrap_or(0.0);
                (id.clone(), (f + r) / 2.0)
            })
            .collect();
        let recommendation_ranks = rank_scores(&recommendation);
        info!(
            "MetaboRank over {} vertices, iterations: {} / {} / {} / {}",
            ids.len(),
            global_forward.iterations,
            global_reverse.iterations,
            personalized_forward.iterations,
            personalized_reverse.iterations
        );
        Ok(MetaboRankResult {
            global_forward,
            global_reverse,
            personalized_forward,
            personalized_reverse,
            forward_ratio,
            reverse_ratio,
            recommendation,
            recommendation_ranks,
            skipped_seeds,
        })
    }

    /// Jump vector concentrated on the seeds, and the number of unusable seeds
    fn seed_vector(&self, graph: &MetabolicGraph) -> (DVector<f64>, usize) {
        let n = graph.vertex_count();
        let mut jump = DVector::<f64>::zeros(n);
        let mut skipped = 0;
        for (id, weight) in self.seeds.iter() {
            let position = graph.position(id);
            match position {
                Some(i) if weight.is_finite() && *weight > 0.0 => jump[i] += *weight,
                Some(_) => {
                    warn!("Ignoring seed {} with weight {}", id, weight);
                    skipped += 1;
                }
                None => {
                    warn!("Ignoring seed {}, it is not part of the graph", id);
                    skipped += 1;
                }
            }
        }
        let total = jump.sum();
        if total > 0.0 {
            (jump / total, skipped)
        } else {
            if !self.seeds.is_empty() {
                warn!("No usable seed, personalized runs use a uniform jump");
            }
            (uniform_jump(n), skipped)
        }
    }
}

fn uniform_jump(n: usize) -> DVector<f64> {
    if n == 0 {
        DVector::zeros(0)
    } else {
        DVector::from_element(n, 1.0 / n as f64)
    }
}

fn ranked(ids: &[VertexId], result: PowerIterationResult) -> RankedScores {
    let scores: ScoreMap = ids
        .iter()
        .cloned()
        .zip(result.scores.iter().copied())
        .collect();
    RankedScores {
        normalized: max_normalize(&scores),
        ranks: rank_scores(&scores),
        scores,
        iterations: result.iterations,
        converged: result.converged,
    }
}

/// Per vertex quotient, 0 where the denominator is not positive
fn ratio(numerator: &ScoreMap, denominator: &ScoreMap) -> ScoreMap {
    numerator
        .iter()
        .map(|(id, n)| {
            let d = denominator.get(id).copied().unwrap_or(0.0);
            (id.clone(), if d > 0.0 { n / d } else { 0.0 })
        })
        .collect()
}

//! Topological importance of species and reactions
//!
//! - [`choke`]: reactions which are the only producer or consumer of a species
//! - [`load`]: species crossed by more alternative paths than their degree predicts
//! - [`metaborank`]: personalized, two directional PageRank over the compound graph
use indexmap::IndexMap;

use crate::graph::VertexId;

pub mod choke;
pub mod load;
pub mod metaborank;

pub use choke::{choke_points, choke_reactions, ChokePoint, ChokeRole};
pub use load::{LoadPoints, LoadPointsBuilder};
pub use metaborank::{power_iteration, MetaboRank, MetaboRankBuilder, MetaboRankResult, PowerIterationResult};

/// Score of each vertex
pub type ScoreMap = IndexMap<VertexId, f64>;
/// 1-based rank of each vertex
pub type RankMap = IndexMap<VertexId, usize>;

/// Rank scores by decreasing value
///
/// Ties keep insertion order, and NaN scores rank last.
///
/// # Examples
/// ```rust
/// use metnet_core::centrality::{rank_scores, ScoreMap};
/// use metnet_core::graph::VertexId;
/// let scores: ScoreMap = [("a".into(), 0.2), ("b".into(), 0.7), ("c".into(), 0.2)]
///     .into_iter()
///     .collect();
/// let ranks = rank_scores(&scores);
/// assert_eq!(ranks[&VertexId::new("b")], 1);
/// assert_eq!(ranks[&VertexId::new("a")], 2);
/// assert_eq!(ranks[&VertexId::new("c")], 3);
/// ```
pub fn rank_scores(scores: &ScoreMap) -> RankMap {
    let mut order: Vec<(&VertexId, f64)> = scores.iter().map(|(id, s)| (id, *s)).collect();
    // stable sort, NaN sorted as smallest
    order.sort_by(|a, b| {
        let key = |x: f64| if x.is_nan() { f64::NEG_INFINITY } else { x };
        key(b.1).total_cmp(&key(a.1))
    });
    order
        .into_iter()
        .enumerate()
        .map(|(i, (id, _))| (id.clone(), i + 1))
        .collect()
}

/// Divide every score by the largest one
///
/// Scores are returned unchanged when the maximum is not a positive finite number.
pub fn max_normalize(scores: &ScoreMap) -> ScoreMap {
    let max = scores
        .values()
        .copied()
        .filter(|s| s.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return scores.clone();
    }
    scores.iter().map(|(id, s)| (id.clone(), s / max)).collect()
}

//! Structural similarity weights
//!
//! Species structures (SMILES, or InChI when no SMILES is given) are turned into hashed
//! substring fingerprints and compared with the Tanimoto coefficient. The edge weight is the
//! structural distance `(1 - similarity)^power`, so transitions between similar compounds are
//! cheap.
use indexmap::IndexMap;
use tracing::warn;

use crate::configuration::CONFIGURATION;
use crate::graph::{MetabolicGraph, VertexId, VertexKind};
use crate::metabolic_model::model::Model;
use crate::utils::hashing::hash_to_bucket;
use crate::weighting::{assign_weights, WeightingPolicy, WeightingReport};

/// Bit vector marking the substrings found in a structure string
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint {
    words: Vec<u64>,
}

impl Fingerprint {
    /// Hash every substring of up to `ngram` characters into a `bits` wide vector
    pub fn from_structure(structure: &str, bits: usize, ngram: usize) -> Fingerprint {
        let bits = bits.max(1);
        let mut words = vec![0u64; bits.div_ceil(64)];
        let chars: Vec<char> = structure.chars().filter(|c| !c.is_whitespace()).collect();
        for len in 1..=ngram.max(1) {
            for window in chars.windows(len) {
                let fragment: String = window.iter().collect();
                let bit = hash_to_bucket(&fragment, bits);
                words[bit / 64] |= 1u64 << (bit % 64);
            }
        }
        Fingerprint { words }
    }

    /// Number of set bits
    pub fn cardinality(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Tanimoto coefficient, 0 when both fingerprints are empty
    pub fn tanimoto(&self, other: &Fingerprint) -> f64 {
        let (mut both, mut either) = (0u32, 0u32);
        for (a, b) in self.words.iter().zip(other.words.iter()) {
            both += (a & b).count_ones();
            either += (a | b).count_ones();
        }
        if either == 0 {
            0.0
        } else {
            both as f64 / either as f64
        }
    }
}

/// Weight edges by the structural distance between their endpoints
///
/// The weight is `(1 - tanimoto)^power`, floored at `f64::EPSILON` so identical structures (the
/// two sides of a transport) stay connected at the lowest cost. Edges touching a vertex without
/// structure (unannotated species, reactions) are removed.
pub struct SimilarityWeighting<'a> {
    pub model: &'a Model,
    /// Exponent applied to the structural distance
    pub power: f64,
    pub bits: usize,
    pub ngram: usize,
}

impl<'a> SimilarityWeighting<'a> {
    pub fn new(model: &'a Model) -> SimilarityWeighting<'a> {
        let (bits, ngram) = CONFIGURATION
            .read()
            .map(|c| (c.fingerprint_bits, c.fingerprint_ngram))
            .unwrap_or((1024, 3));
        SimilarityWeighting {
            model,
            power: 1.0,
            bits,
            ngram,
        }
    }

    pub fn with_power(mut self, power: f64) -> SimilarityWeighting<'a> {
        self.power = power;
        self
    }

    fn fingerprints(&self, graph: &MetabolicGraph) -> IndexMap<VertexId, Fingerprint> {
        graph
            .vertices()
            .filter(|v| v.kind == VertexKind::Species)
            .filter_map(|v| {
                let structure = self.model.metabolites.get(&v.id.base)?.structure()?;
                Some((
                    v.id.clone(),
                    Fingerprint::from_structure(structure, self.bits, self.ngram),
                ))
            })
            .collect()
    }
}

impl WeightingPolicy for SimilarityWeighting<'_> {
    fn apply(&self, graph: &mut MetabolicGraph) -> WeightingReport {
        let fingerprints = self.fingerprints(graph);
        let unannotated = graph.vertex_count() - fingerprints.len();
        if unannotated > 0 {
            warn!("{} vertices have no structure, their edges are removed", unannotated);
        }
        let mut report = assign_weights(graph, true, |g, entry| {
            let source = fingerprints.get(g.id_of(entry.source))?;
            let target = fingerprints.get(g.id_of(entry.target))?;
            Some((1.0 - source.tanimoto(target)).powf(self.power).max(f64::EPSILON))
        });
        report.skipped = unannotated;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::species_graph;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;

    #[test]
    fn tanimoto_bounds() {
        let ethanol = Fingerprint::from_structure("CCO", 1024, 3);
        let same = Fingerprint::from_structure("C CO", 1024, 3);
        let propanol = Fingerprint::from_structure("CCCO", 1024, 3);
        let benzene = Fingerprint::from_structure("c1ccccc1", 1024, 3);
        assert_eq!(ethanol, same);
        assert_eq!(ethanol.tanimoto(&same), 1.0);
        let close = ethanol.tanimoto(&propanol);
        let far = ethanol.tanimoto(&benzene);
        assert!(close > far);
        assert!(close > 0.0 && close < 1.0);
        let empty = Fingerprint::from_structure("", 64, 3);
        assert_eq!(empty.cardinality(), 0);
        assert_eq!(empty.tanimoto(&empty), 0.0);
    }

    #[test]
    fn unannotated_edges_are_removed() {
        let mut model = Model::new_empty();
        for (id, smiles) in [("etoh", Some("CCO")), ("prop", Some("CCCO")), ("x", None)] {
            model.add_metabolite(
                MetaboliteBuilder::default()
                    .id(id.to_string())
                    .smiles(smiles.map(|s| s.to_string()))
                    .build()
                    .unwrap(),
            );
        }
        let mut graph = species_graph(&[("etoh", "prop"), ("prop", "x")]);
        let report = SimilarityWeighting::new(&model).apply(&mut graph);
        assert_eq!(report.removed_unassigned, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(graph.edge_count(), 1);
        let weight = graph.edges().next().unwrap().edge.weight.unwrap();
        assert!(weight > 0.0 && weight < 1.0);
    }

    #[test]
    fn identical_structures_stay_connected() {
        let mut model = Model::new_empty();
        let glucose = "OCC1OC(O)C(O)C(O)C1O";
        let g6p = "OC1OC(COP(O)(O)=O)C(O)C(O)C1O";
        for (id, smiles) in [("glc_e", glucose), ("glc_c", glucose), ("g6p_c", g6p)] {
            model.add_metabolite(
                MetaboliteBuilder::default()
                    .id(id.to_string())
                    .smiles(Some(smiles.to_string()))
                    .build()
                    .unwrap(),
            );
        }
        let mut graph = species_graph(&[("glc_e", "glc_c"), ("glc_c", "g6p_c")]);
        let report = SimilarityWeighting::new(&model).with_power(2.0).apply(&mut graph);
        assert_eq!(report.removed_invalid, 0);
        assert_eq!(graph.edge_count(), 2);
        let transport = graph
            .edges_between(&VertexId::new("glc_e"), &VertexId::new("glc_c"))
            .unwrap();
        assert_eq!(graph.edge(transport[0]).unwrap().weight, Some(f64::EPSILON));
        let reaction = graph
            .edges_between(&VertexId::new("glc_c"), &VertexId::new("g6p_c"))
            .unwrap();
        assert!(graph.edge(reaction[0]).unwrap().weight.unwrap() > f64::EPSILON);
    }
}

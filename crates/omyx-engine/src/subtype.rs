//! Cancer subtype classification.
//!
//! Each candidate subtype of the requested cancer type is scored against the
//! marker evidence of all layers. Scoring is three independent channels per
//! marker (expression level, mutation status, copy number), and the best
//! total wins with definition order breaking ties.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use omyx_knowledge::{CancerSubtypeProfile, MarkerState, ReferenceKnowledge};

use crate::layer_stats::LayerResults;
use crate::policy::*;

pub const UNKNOWN_SUBTYPE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtypePrediction {
    /// Display name of the resolved cancer type.
    pub cancer_type: String,
    pub predicted_subtype: String,
    /// 0..=95
    pub confidence: u32,
    pub evidence: Vec<String>,
    pub description: String,
    pub treatment: String,
    pub prognosis: String,
    pub all_subtype_scores: BTreeMap<String, u32>,
}

/// Marker evidence gathered once per run and shared by every candidate.
#[derive(Debug, Default)]
struct MarkerEvidence<'a> {
    expression: HashMap<&'a str, f64>,
    mutated: HashSet<&'a str>,
    has_cnv: bool,
    amplified: HashSet<&'a str>,
    deleted: HashSet<&'a str>,
}

impl<'a> MarkerEvidence<'a> {
    fn collect(results: &'a LayerResults) -> Self {
        let mut ev = MarkerEvidence::default();

        if let Some(expr) = results.expression() {
            // Registry hits take precedence over the variance ranking.
            for s in &expr.biomarkers_found {
                ev.expression.entry(s.gene.as_str()).or_insert(s.mean);
            }
            for s in expr.top_variable.iter().take(SUBTYPE_EXPRESSION_CANDIDATES) {
                ev.expression.entry(s.gene.as_str()).or_insert(s.mean);
            }
        }

        if let Some(mutation) = results.mutation() {
            ev.mutated.extend(
                mutation
                    .frequently_mutated
                    .iter()
                    .filter(|s| s.frequency > SUBTYPE_MUTATION_FREQUENCY)
                    .map(|s| s.gene.as_str()),
            );
            ev.mutated.extend(
                mutation
                    .top_mutated
                    .iter()
                    .take(SUBTYPE_TOP_MUTATED)
                    .map(|s| s.gene.as_str()),
            );
        }

        if let Some(cnv) = results.cnv() {
            ev.has_cnv = true;
            ev.amplified.extend(cnv.amplified.iter().map(|s| s.gene.as_str()));
            ev.deleted.extend(cnv.deleted.iter().map(|s| s.gene.as_str()));
        }

        ev
    }

    /// Score one subtype profile; returns the total and its evidence lines.
    fn score(&self, profile: &CancerSubtypeProfile) -> (u32, Vec<String>) {
        let mut score = 0;
        let mut evidence = Vec::new();

        for marker in &profile.markers {
            let gene = marker.gene.as_str();
            let expected = marker.expected;

            if let Some(&level) = self.expression.get(gene) {
                match expected {
                    MarkerState::High if level > HIGH_EXPRESSION => {
                        score += SUBTYPE_EXPRESSION_MATCH;
                        evidence.push(format!("{gene}: high ✓"));
                    }
                    MarkerState::Low if level <= HIGH_EXPRESSION => {
                        score += SUBTYPE_EXPRESSION_MATCH;
                        evidence.push(format!("{gene}: low ✓"));
                    }
                    MarkerState::Variable => {
                        score += SUBTYPE_WEAK_MATCH;
                        evidence.push(format!("{gene}: detected"));
                    }
                    _ => {}
                }
            }

            let is_mutated = self.mutated.contains(gene);
            match expected {
                MarkerState::Mutated | MarkerState::Rearranged if is_mutated => {
                    score += SUBTYPE_MUTATION_MATCH;
                    evidence.push(format!("{gene}: mutated ✓"));
                }
                MarkerState::Normal if !is_mutated => score += SUBTYPE_WEAK_MATCH,
                _ => {}
            }

            if self.has_cnv {
                if self.amplified.contains(gene)
                    && matches!(expected, MarkerState::High | MarkerState::Amplified)
                {
                    score += SUBTYPE_CNV_MATCH;
                    evidence.push(format!("{gene}: amplified ✓"));
                }
                if self.deleted.contains(gene)
                    && matches!(expected, MarkerState::Low | MarkerState::Deleted)
                {
                    score += SUBTYPE_CNV_MATCH;
                    evidence.push(format!("{gene}: deleted ✓"));
                }
            }
        }

        (score, evidence)
    }
}

/// Classify the run into one subtype of `cancer_type`.
///
/// Unrecognised cancer types use the default profile set. The first subtype
/// in definition order to reach the best score is selected; when no subtype
/// scores above zero the prediction is "Unknown".
pub fn classify_subtype(results: &LayerResults, cancer_type: &str, kb: &ReferenceKnowledge) -> SubtypePrediction {
    let (profile_set, recognised) = kb.resolve_cancer_type(cancer_type);
    if !recognised {
        warn!(
            requested = cancer_type,
            fallback = %profile_set.key,
            "Unrecognised cancer type, using default subtype profiles"
        );
    }

    let evidence = MarkerEvidence::collect(results);

    let mut all_subtype_scores = BTreeMap::new();
    let mut best: Option<(&CancerSubtypeProfile, u32, Vec<String>)> = None;
    let mut best_score = 0;

    for profile in &profile_set.subtypes {
        let (score, lines) = evidence.score(profile);
        debug!(subtype = %profile.subtype_name, score, "Subtype scored");
        all_subtype_scores.insert(profile.subtype_name.clone(), score);

        if score > best_score {
            best_score = score;
            best = Some((profile, score, lines));
        }
    }

    match best {
        Some((profile, score, mut lines)) => {
            let denominator = (2 * profile.markers.len()).max(1) as f64;
            let raw = (score as f64 / denominator * 100.0).round() as u32;
            lines.truncate(SUBTYPE_EVIDENCE_LIMIT);
            SubtypePrediction {
                cancer_type: profile_set.display_name.clone(),
                predicted_subtype: profile.subtype_name.clone(),
                confidence: raw.min(SUBTYPE_CONFIDENCE_CAP).max(SUBTYPE_CONFIDENCE_FLOOR),
                evidence: lines,
                description: profile.description.clone(),
                treatment: profile.treatment.clone(),
                prognosis: format!("{} - {}", profile.subtype_name, profile.description),
                all_subtype_scores,
            }
        }
        None => SubtypePrediction {
            cancer_type: profile_set.display_name.clone(),
            predicted_subtype: UNKNOWN_SUBTYPE.to_string(),
            confidence: SUBTYPE_NO_EVIDENCE_CONFIDENCE,
            evidence: vec![],
            description: String::new(),
            treatment: String::new(),
            prognosis: format!("{UNKNOWN_SUBTYPE} - "),
            all_subtype_scores,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer_stats::compute_layer;
    use omyx_common::{LayerMatrix, LayerType};
    use omyx_test_utils::matrix;
    use pretty_assertions::assert_eq;

    fn classify(matrices: &[LayerMatrix], cancer_type: &str) -> SubtypePrediction {
        let kb = ReferenceKnowledge::builtin();
        let results: LayerResults = matrices.iter().map(|m| compute_layer(m, &kb)).collect();
        classify_subtype(&results, cancer_type, &kb)
    }

    #[test]
    fn test_luminal_a_profile() {
        let expr = matrix(
            LayerType::Expression,
            &[
                ("ESR1", &[9.0, 11.0]),
                ("PGR", &[7.0, 9.0]),
                ("ERBB2", &[1.0, 2.0]),
                ("MKI67", &[2.0, 3.0]),
            ],
        );
        let p = classify(&[expr], "breast");
        assert_eq!(p.predicted_subtype, "Luminal A");
        assert_eq!(p.cancer_type, "Breast Cancer");
        // 4 markers × 2 points: full marks, capped
        assert_eq!(p.all_subtype_scores["Luminal A"], 8);
        assert_eq!(p.confidence, SUBTYPE_CONFIDENCE_CAP);
        assert_eq!(
            p.evidence,
            vec!["ESR1: high ✓", "PGR: high ✓", "ERBB2: low ✓", "MKI67: low ✓"]
        );
        assert_eq!(p.prognosis, format!("Luminal A - {}", p.description));
    }

    #[test]
    fn test_first_definition_wins_ties() {
        // ESR1 high alone gives Luminal A and Luminal B two points each
        let expr = matrix(LayerType::Expression, &[("ESR1", &[9.0, 11.0])]);
        let p = classify(&[expr], "breast");
        assert_eq!(p.all_subtype_scores["Luminal A"], 2);
        assert_eq!(p.all_subtype_scores["Luminal B"], 2);
        assert_eq!(p.predicted_subtype, "Luminal A");
        // 2 / 8 = 25%, raised to the floor
        assert_eq!(p.confidence, SUBTYPE_CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_no_evidence_is_unknown() {
        let meth = matrix(LayerType::Methylation, &[("ESR1", &[0.9, 0.9])]);
        let p = classify(&[meth], "breast");
        assert_eq!(p.predicted_subtype, UNKNOWN_SUBTYPE);
        assert_eq!(p.confidence, SUBTYPE_NO_EVIDENCE_CONFIDENCE);
        assert!(p.evidence.is_empty());
        assert_eq!(p.all_subtype_scores.len(), 4);
        assert!(p.all_subtype_scores.values().all(|&s| s == 0));
    }

    #[test]
    fn test_unrecognised_cancer_type_falls_back() {
        let expr = matrix(LayerType::Expression, &[("ESR1", &[9.0, 11.0])]);
        assert_eq!(classify(&[expr.clone()], "Breast").cancer_type, "Breast Cancer");
        assert_eq!(classify(&[expr], "unicorn").cancer_type, "Breast Cancer");
    }

    #[test]
    fn test_lung_mutation_and_normal_channels() {
        let mutations = matrix(
            LayerType::Mutation,
            &[
                ("EGFR", &[1.0, 1.0, 1.0, 0.0]),
                ("KRAS", &[0.0, 0.0, 0.0, 0.0]),
            ],
        );
        let p = classify(&[mutations], "lung");
        assert_eq!(p.cancer_type, "Lung Cancer (NSCLC)");
        // KRAS has no mutated sample but is still in the top mutated set,
        // so it counts as mutated rather than normal.
        // EGFR mutated (+3), ALK normal (+1)
        assert_eq!(p.all_subtype_scores["EGFR-mutant"], 4);
        assert_eq!(p.all_subtype_scores["ALK-rearranged"], 0);
        assert_eq!(p.all_subtype_scores["KRAS-mutant"], 3);
        assert_eq!(p.all_subtype_scores["PD-L1 high"], 1);
        assert_eq!(p.predicted_subtype, "EGFR-mutant");
        // 4 / 6 = 66.7%
        assert_eq!(p.confidence, 67);
        assert_eq!(p.evidence, vec!["EGFR: mutated ✓"]);
    }

    #[test]
    fn test_cnv_channel() {
        let cnv = matrix(LayerType::Cnv, &[("ERBB2", &[1.5, 1.1])]);
        let p = classify(&[cnv], "gastric");
        assert_eq!(p.predicted_subtype, "HER2-positive");
        assert_eq!(p.evidence, vec!["ERBB2: amplified ✓"]);
        assert_eq!(p.confidence, 95);
    }

    #[test]
    fn test_evidence_is_capped() {
        let expr = matrix(
            LayerType::Expression,
            &[
                ("ESR1", &[1.0, 2.0]),
                ("PGR", &[1.0, 2.0]),
                ("ERBB2", &[9.0, 12.0]),
                ("MKI67", &[9.0, 12.0]),
            ],
        );
        let cnv = matrix(
            LayerType::Cnv,
            &[("ERBB2", &[1.0, 1.0]), ("ESR1", &[-1.0, -1.0]), ("PGR", &[-1.0, -1.0])],
        );
        let p = classify(&[expr, cnv], "breast");
        assert_eq!(p.predicted_subtype, "HER2-enriched");
        assert_eq!(p.all_subtype_scores["HER2-enriched"], 14);
        assert_eq!(p.evidence.len(), SUBTYPE_EVIDENCE_LIMIT);
        assert_eq!(p.evidence[0], "ESR1: low ✓");
        assert_eq!(p.evidence[1], "ESR1: deleted ✓");
    }
}

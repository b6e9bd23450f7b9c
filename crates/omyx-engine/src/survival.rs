//! Prognostic risk scoring.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use omyx_knowledge::{ReferenceKnowledge, RiskDirection};

use crate::layer_stats::LayerResults;
use crate::policy::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskGroup {
    Low,
    IntermediateLow,
    IntermediateHigh,
    High,
    Unknown,
}

impl RiskGroup {
    /// Band for a clamped score, with its five-year survival range.
    pub fn from_score(score: u32) -> (Self, &'static str) {
        match score {
            s if s < 35 => (RiskGroup::Low, "85-95%"),
            s if s < 55 => (RiskGroup::IntermediateLow, "70-85%"),
            s if s < 70 => (RiskGroup::IntermediateHigh, "50-70%"),
            _ => (RiskGroup::High, "30-50%"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskGroup::Low              => "Low",
            RiskGroup::IntermediateLow  => "Intermediate-Low",
            RiskGroup::IntermediateHigh => "Intermediate-High",
            RiskGroup::High             => "High",
            RiskGroup::Unknown          => "Unknown",
        }
    }
}

impl fmt::Display for RiskGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskGroup {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    /// 10..=95, or 50 with an `Unknown` group when no expression layer exists.
    pub risk_score: u32,
    pub risk_group: RiskGroup,
    pub five_year_survival: String,
    pub risk_factors: Vec<String>,
    pub protective_factors: Vec<String>,
}

impl RiskScore {
    fn unknown() -> Self {
        Self {
            risk_score: RISK_BASELINE as u32,
            risk_group: RiskGroup::Unknown,
            five_year_survival: "N/A".to_string(),
            risk_factors: vec![],
            protective_factors: vec![],
        }
    }
}

/// Combine prognostic signatures and driver mutations into a risk score.
pub fn score_risk(results: &LayerResults, kb: &ReferenceKnowledge) -> RiskScore {
    let Some(expr) = results.expression() else {
        debug!("No expression layer, risk group unknown");
        return RiskScore::unknown();
    };

    // Later entries overwrite earlier ones for the same gene.
    let pool: HashMap<&str, f64> = expr
        .top_variable
        .iter()
        .chain(&expr.biomarkers_found)
        .map(|s| (s.gene.as_str(), s.mean))
        .collect();

    let mut score = RISK_BASELINE;
    let mut risk_factors = Vec::new();
    let mut protective_factors = Vec::new();

    for sig in kb.prognostic_signatures() {
        let observed: Vec<f64> = sig.genes.iter().filter_map(|g| pool.get(g.as_str()).copied()).collect();
        if observed.len() < MIN_SIGNATURE_GENES {
            debug!(signature = %sig.name, observed = observed.len(), "Signature skipped");
            continue;
        }
        let avg = observed.iter().sum::<f64>() / observed.len() as f64;

        match sig.risk_direction {
            RiskDirection::High if avg > HIGH_EXPRESSION => {
                score += SIGNATURE_RISK_STEP * sig.weight;
                risk_factors.push(format!("High {}", sig.name));
            }
            RiskDirection::Low if avg < LOW_EXPRESSION => {
                score += SIGNATURE_RISK_STEP * sig.weight;
                risk_factors.push(format!("Low {}", sig.name));
            }
            RiskDirection::High if avg < LOW_EXPRESSION => {
                score -= SIGNATURE_PROTECTIVE_STEP;
                protective_factors.push(format!("Low {}", sig.name));
            }
            RiskDirection::Low if avg > HIGH_EXPRESSION => {
                score -= SIGNATURE_PROTECTIVE_STEP;
                protective_factors.push(format!("High {}", sig.name));
            }
            _ => {}
        }
    }

    if let Some(mutation) = results.mutation() {
        let mutated = |gene: &str| mutation.frequently_mutated.iter().any(|s| s.gene == gene);
        if mutated("TP53") {
            score += TP53_MUTATION_RISK;
            risk_factors.push("TP53 mutation".to_string());
        }
        if mutated("BRCA1") || mutated("BRCA2") {
            protective_factors.push("BRCA (PARP eligible)".to_string());
        }
    }

    let risk_score = score.clamp(RISK_SCORE_MIN, RISK_SCORE_MAX) as u32;
    let (risk_group, band) = RiskGroup::from_score(risk_score);

    risk_factors.truncate(RISK_FACTOR_LIMIT);
    protective_factors.truncate(PROTECTIVE_FACTOR_LIMIT);

    RiskScore {
        risk_score,
        risk_group,
        five_year_survival: band.to_string(),
        risk_factors,
        protective_factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer_stats::compute_layer;
    use omyx_common::{LayerMatrix, LayerType};
    use omyx_test_utils::matrix;
    use pretty_assertions::assert_eq;

    fn risk(matrices: &[LayerMatrix]) -> RiskScore {
        let kb = ReferenceKnowledge::builtin();
        let results: LayerResults = matrices.iter().map(|m| compute_layer(m, &kb)).collect();
        score_risk(&results, &kb)
    }

    #[test]
    fn test_no_expression_is_unknown() {
        let r = risk(&[matrix(LayerType::Mutation, &[("TP53", &[1.0, 1.0])])]);
        assert_eq!(r, RiskScore::unknown());
        assert_eq!(serde_json::to_value(&r).unwrap()["risk_group"], "Unknown");
    }

    #[test]
    fn test_baseline_without_signals() {
        let r = risk(&[matrix(LayerType::Expression, &[("MKI67", &[4.0, 4.5])])]);
        assert_eq!(r.risk_score, 50);
        assert_eq!(r.risk_group, RiskGroup::IntermediateLow);
        assert_eq!(r.five_year_survival, "70-85%");
        assert!(r.risk_factors.is_empty());
    }

    #[test]
    fn test_high_proliferation_and_tp53() {
        let r = risk(&[
            matrix(
                LayerType::Expression,
                &[("MKI67", &[8.0, 10.0]), ("TOP2A", &[7.0, 9.0])],
            ),
            matrix(LayerType::Mutation, &[("TP53", &[1.0, 0.0])]),
        ]);
        // 50 + 8 × 2.0 + 12
        assert_eq!(r.risk_score, 78);
        assert_eq!(r.risk_group, RiskGroup::High);
        assert_eq!(r.five_year_survival, "30-50%");
        assert_eq!(r.risk_factors, vec!["High proliferation", "TP53 mutation"]);
    }

    #[test]
    fn test_protective_signals_and_floor() {
        let r = risk(&[
            matrix(
                LayerType::Expression,
                &[
                    ("MKI67", &[1.0, 2.0]),
                    ("TOP2A", &[1.0, 2.0]),
                    ("CD8A", &[8.0, 9.0]),
                    ("GZMB", &[8.0, 9.0]),
                ],
            ),
            matrix(LayerType::Mutation, &[("BRCA2", &[1.0, 1.0])]),
        ]);
        assert_eq!(r.risk_score, 40);
        assert_eq!(
            r.protective_factors,
            vec!["Low proliferation", "High immune", "BRCA (PARP eligible)"]
        );
        assert_eq!(r.risk_group.to_string(), "Intermediate-Low");
    }

    #[test]
    fn test_score_is_clamped() {
        let r = risk(&[
            matrix(
                LayerType::Expression,
                &[
                    ("MKI67", &[9.0, 10.0]),
                    ("PCNA", &[9.0, 10.0]),
                    ("CD8A", &[0.5, 1.0]),
                    ("GZMA", &[0.5, 1.0]),
                    ("SOX2", &[9.0, 10.0]),
                    ("CD44", &[9.0, 10.0]),
                    ("MMP2", &[9.0, 10.0]),
                    ("VIM", &[9.0, 10.0]),
                ],
            ),
            matrix(LayerType::Mutation, &[("TP53", &[1.0, 1.0])]),
        ]);
        assert_eq!(r.risk_score, 95);
        assert_eq!(r.risk_factors.len(), RISK_FACTOR_LIMIT);
        assert_eq!(r.risk_factors[0], "High proliferation");
    }

    #[test]
    fn test_band_cut_points() {
        let bands = [
            (10, RiskGroup::Low, "85-95%"),
            (34, RiskGroup::Low, "85-95%"),
            (35, RiskGroup::IntermediateLow, "70-85%"),
            (54, RiskGroup::IntermediateLow, "70-85%"),
            (55, RiskGroup::IntermediateHigh, "50-70%"),
            (69, RiskGroup::IntermediateHigh, "50-70%"),
            (70, RiskGroup::High, "30-50%"),
            (95, RiskGroup::High, "30-50%"),
        ];
        for (score, group, survival) in bands {
            assert_eq!(RiskGroup::from_score(score), (group, survival), "score {score}");
        }
    }

    #[test]
    fn test_all_protective_is_low_risk() {
        let r = risk(&[matrix(
            LayerType::Expression,
            &[
                ("MKI67", &[1.0, 2.0]),
                ("TOP2A", &[1.0, 2.0]),
                ("CD8A", &[8.0, 9.0]),
                ("GZMB", &[8.0, 9.0]),
                ("SOX2", &[1.0, 2.0]),
                ("CD44", &[1.0, 2.0]),
                ("MMP2", &[1.0, 2.0]),
                ("VIM", &[1.0, 2.0]),
            ],
        )]);
        // 50 - 4 × 5
        assert_eq!(r.risk_score, 30);
        assert_eq!(r.risk_group, RiskGroup::Low);
        assert_eq!(r.five_year_survival, "85-95%");
        assert!(r.risk_factors.is_empty());
        assert_eq!(r.protective_factors.len(), PROTECTIVE_FACTOR_LIMIT);
    }
}

//! Cell-type composition from bulk expression.
//!
//! Signature scoring rather than true deconvolution: each cell type scores
//! the mean expression of its markers present in the matrix, and the scores
//! are normalised into percentages.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use omyx_common::LayerMatrix;
use omyx_knowledge::ReferenceKnowledge;

use crate::normalise::{apportion_percent, finite_mean, rounded};
use crate::policy::{
    CELL_SCORE_FLOOR, IMMUNOTHERAPY_BASELINE, MACROPHAGE_SUPPRESSION_FACTOR, MIN_PRESENT_MARKERS,
};

const CD8_T_CELLS: &str = "CD8_T_Cells";
const NK_CELLS: &str = "NK_Cells";
const TREGS: &str = "Tregs";
const MACROPHAGES: &str = "Macrophages";
const FIBROBLASTS: &str = "Fibroblasts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeconvolutionResult {
    /// Percent per cell type; sums to exactly 100.0.
    pub cell_fractions: BTreeMap<String, f64>,
    #[serde(serialize_with = "rounded::dp1")]
    pub immune_infiltration: f64,
    #[serde(serialize_with = "rounded::dp1")]
    pub immunosuppressive_score: f64,
    /// 0..=100
    pub immunotherapy_score: u32,
    pub insights: Vec<Insight>,
    pub markers_detected: BTreeMap<String, usize>,
    /// Raw signature scores before flooring and normalisation.
    #[serde(skip)]
    pub cell_scores: BTreeMap<String, f64>,
}

impl DeconvolutionResult {
    pub fn fraction(&self, cell_type: &str) -> f64 {
        self.cell_fractions.get(cell_type).copied().unwrap_or(0.0)
    }
}

// ── Insight rules ───────────────────────────────────────────────────────────

enum Metric {
    Fraction(&'static str),
    ImmuneInfiltration,
}

struct InsightRule {
    metric: Metric,
    above: f64,
    kind: InsightKind,
    text: &'static str,
}

const INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        metric: Metric::Fraction(CD8_T_CELLS),
        above: 15.0,
        kind: InsightKind::Positive,
        text: "High CD8+ T cell infiltration suggests potential immunotherapy responsiveness",
    },
    InsightRule {
        metric: Metric::Fraction(TREGS),
        above: 10.0,
        kind: InsightKind::Warning,
        text: "Elevated Tregs may indicate immunosuppressive microenvironment",
    },
    InsightRule {
        metric: Metric::Fraction(FIBROBLASTS),
        above: 20.0,
        kind: InsightKind::Warning,
        text: "High fibroblast content suggests stromal-rich tumor, possible therapy resistance",
    },
    InsightRule {
        metric: Metric::ImmuneInfiltration,
        above: 25.0,
        kind: InsightKind::Positive,
        text: "Strong immune infiltration - consider checkpoint inhibitor therapy",
    },
];

// ── Scoring ─────────────────────────────────────────────────────────────────

/// Estimate cell-type percentages from an expression matrix.
pub fn deconvolve(matrix: &LayerMatrix, kb: &ReferenceKnowledge) -> DeconvolutionResult {
    // Presence is case-insensitive on the gene index.
    let upper_index: HashSet<String> = matrix.genes().iter().map(|g| g.to_uppercase()).collect();

    // First row per gene identifier.
    let mut first_row: HashMap<&str, &[f64]> = HashMap::new();
    for (gene, row) in matrix.rows() {
        first_row.entry(gene).or_insert(row);
    }

    let mut scores = Vec::with_capacity(kb.cell_types().len());
    let mut cell_scores = BTreeMap::new();
    let mut markers_detected = BTreeMap::new();

    for sig in kb.cell_types() {
        let present: Vec<&str> = sig
            .marker_genes
            .iter()
            .map(String::as_str)
            .filter(|m| upper_index.contains(*m))
            .collect();
        markers_detected.insert(sig.cell_type.clone(), present.len());

        let score = if present.len() >= MIN_PRESENT_MARKERS {
            let means: Vec<f64> = present
                .iter()
                .filter_map(|m| {
                    let row = first_row
                        .get(m)
                        .or_else(|| first_row.get(m.to_uppercase().as_str()))?;
                    finite_mean(row).map(|(mean, _)| mean)
                })
                .collect();
            if means.is_empty() {
                0.0
            } else {
                means.iter().sum::<f64>() / means.len() as f64
            }
        } else {
            0.0
        };

        debug!(cell_type = %sig.cell_type, present = present.len(), score, "Cell-type signature scored");
        cell_scores.insert(sig.cell_type.clone(), score);
        scores.push(score);
    }

    let floored: Vec<f64> = scores.iter().map(|s| s.max(CELL_SCORE_FLOOR)).collect();
    let cell_fractions: BTreeMap<String, f64> = kb
        .cell_types()
        .iter()
        .map(|sig| sig.cell_type.clone())
        .zip(apportion_percent(&floored))
        .collect();

    let fraction = |ct: &str| cell_fractions.get(ct).copied().unwrap_or(0.0);
    let immune_infiltration = fraction(CD8_T_CELLS) + fraction(NK_CELLS);
    let immunosuppressive_score = fraction(TREGS) + fraction(MACROPHAGES) * MACROPHAGE_SUPPRESSION_FACTOR;

    let insights = INSIGHT_RULES
        .iter()
        .filter(|rule| {
            let value = match rule.metric {
                Metric::Fraction(ct) => fraction(ct),
                Metric::ImmuneInfiltration => immune_infiltration,
            };
            value > rule.above
        })
        .map(|rule| Insight { kind: rule.kind, text: rule.text.to_string() })
        .collect();

    let immunotherapy_score = (immune_infiltration * 2.0 - immunosuppressive_score + IMMUNOTHERAPY_BASELINE)
        .clamp(0.0, 100.0) as u32;

    DeconvolutionResult {
        cell_fractions,
        immune_infiltration,
        immunosuppressive_score,
        immunotherapy_score,
        insights,
        markers_detected,
        cell_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omyx_common::LayerType;
    use omyx_test_utils::{matrix, matrix_owned};

    fn kb() -> ReferenceKnowledge {
        ReferenceKnowledge::builtin()
    }

    fn total(result: &DeconvolutionResult) -> f64 {
        result.cell_fractions.values().sum()
    }

    #[test]
    fn test_no_markers_splits_evenly() {
        let m = matrix(LayerType::Expression, &[("NOTAMARKER", &[1.0, 2.0])]);
        let r = deconvolve(&m, &kb());
        assert_eq!(r.cell_fractions.len(), 10);
        assert!(r.cell_fractions.values().all(|&v| v == 10.0));
        assert!((total(&r) - 100.0).abs() < 1e-9);
        assert!(r.markers_detected.values().all(|&n| n == 0));
    }

    #[test]
    fn test_single_marker_is_not_enough() {
        let m = matrix(
            LayerType::Expression,
            &[("CD8A", &[50.0, 50.0]), ("EPCAM", &[1.0, 1.0]), ("KRT8", &[1.0, 1.0])],
        );
        let r = deconvolve(&m, &kb());
        assert_eq!(r.markers_detected["CD8_T_Cells"], 1);
        assert_eq!(r.cell_scores["CD8_T_Cells"], 0.0);
        assert_eq!(r.cell_scores["Tumor_Epithelial"], 1.0);
        assert_eq!(r.markers_detected["Tumor_Epithelial"], 2);
        // epithelium carries score 1.0, every other type the 0.01 floor
        assert!(r.fraction("Tumor_Epithelial") > 90.0);
        assert!(r.fraction("CD8_T_Cells") < 1.0);
        assert!((total(&r) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_cd8_rich_sample_gets_positive_insights() {
        let m = matrix(
            LayerType::Expression,
            &[("CD8A", &[20.0, 20.0]), ("GZMB", &[20.0, 20.0]), ("NKG7", &[5.0, 5.0]), ("GNLY", &[5.0, 5.0])],
        );
        let r = deconvolve(&m, &kb());
        // scores 20 and 5 against eight floored types: 79.74% and 19.94%
        assert!((r.fraction("CD8_T_Cells") - 79.74).abs() <= 0.1);
        assert!((r.fraction("NK_Cells") - 19.94).abs() <= 0.1);
        assert!(r.immune_infiltration > 99.0);
        assert_eq!(r.immunotherapy_score, 100);

        let kinds: Vec<InsightKind> = r.insights.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsightKind::Positive, InsightKind::Positive]);
        assert!(r.insights[1].text.starts_with("Strong immune infiltration"));
    }

    #[test]
    fn test_marker_presence_ignores_index_case() {
        let m = matrix(LayerType::Expression, &[("fap", &[4.0, 4.0]), ("ACTA2", &[4.0, 4.0])]);
        let r = deconvolve(&m, &kb());
        assert_eq!(r.markers_detected["Fibroblasts"], 2);
        assert!(r.fraction("Fibroblasts") > 20.0);
        assert_eq!(r.insights.len(), 1);
        assert_eq!(r.insights[0].kind, InsightKind::Warning);
    }

    #[test]
    fn test_negative_scores_use_floor() {
        let m = matrix(LayerType::Expression, &[("FOXP3", &[-3.0, -3.0]), ("CTLA4", &[-1.0, -1.0])]);
        let r = deconvolve(&m, &kb());
        assert!(r.cell_fractions.values().all(|&v| v == 10.0));
        assert_eq!(r.immunosuppressive_score, 13.0);
        assert_eq!(r.immunotherapy_score, 57);
    }

    #[test]
    fn test_fractions_always_sum_to_hundred() {
        let kb = kb();
        let genes: Vec<String> = kb
            .cell_types()
            .iter()
            .flat_map(|s| s.marker_genes.iter().take(3).cloned())
            .collect();
        let rows: Vec<(String, Vec<f64>)> = genes
            .into_iter()
            .enumerate()
            .map(|(i, g)| (g, vec![(i % 7) as f64 * 1.37, (i % 5) as f64 * 0.91]))
            .collect();
        let r = deconvolve(&matrix_owned(LayerType::Expression, rows), &kb);
        assert!((total(&r) - 100.0).abs() < 1e-9);
        assert!(r.immunotherapy_score <= 100);
    }
}

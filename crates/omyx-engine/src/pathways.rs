//! Pathway enrichment against the altered-gene set.

use std::collections::HashSet;

use serde::Serialize;

use omyx_knowledge::ReferenceKnowledge;

use crate::layer_stats::LayerResults;
use crate::normalise::rounded;
use crate::policy::{PATHWAY_ACTIVATION_SCORE, PATHWAY_ALTERED_EXPRESSION_GENES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PathwayStatus {
    Activated,
    Altered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayEnrichmentResult {
    pub pathway: String,
    pub genes_affected: usize,
    pub genes_total: usize,
    /// Affected genes in pathway definition order.
    pub overlap_genes: Vec<String>,
    #[serde(serialize_with = "rounded::dp3")]
    pub score: f64,
    pub status: PathwayStatus,
    pub drugs: Vec<String>,
}

/// Genes altered in any layer that feeds enrichment.
fn altered_genes(results: &LayerResults) -> HashSet<&str> {
    let mut altered = HashSet::new();
    if let Some(expr) = results.expression() {
        altered.extend(
            expr.top_variable
                .iter()
                .take(PATHWAY_ALTERED_EXPRESSION_GENES)
                .map(|s| s.gene.as_str()),
        );
    }
    if let Some(mutation) = results.mutation() {
        altered.extend(mutation.frequently_mutated.iter().map(|s| s.gene.as_str()));
    }
    if let Some(cnv) = results.cnv() {
        altered.extend(cnv.amplified.iter().chain(&cnv.deleted).map(|s| s.gene.as_str()));
    }
    altered
}

/// Score every reference pathway with at least one altered gene.
pub fn enrich_pathways(results: &LayerResults, kb: &ReferenceKnowledge) -> Vec<PathwayEnrichmentResult> {
    let altered = altered_genes(results);

    let mut enriched: Vec<PathwayEnrichmentResult> = kb
        .pathways()
        .iter()
        .filter_map(|p| {
            let mut seen = HashSet::new();
            let distinct: Vec<&str> = p
                .genes
                .iter()
                .map(String::as_str)
                .filter(|g| seen.insert(*g))
                .collect();
            let overlap: Vec<String> = distinct
                .iter()
                .filter(|g| altered.contains(**g))
                .map(|g| g.to_string())
                .collect();
            if overlap.is_empty() {
                return None;
            }

            let score = overlap.len() as f64 / distinct.len() as f64;
            Some(PathwayEnrichmentResult {
                pathway: p.name.clone(),
                genes_affected: overlap.len(),
                genes_total: distinct.len(),
                overlap_genes: overlap,
                score,
                status: if score > PATHWAY_ACTIVATION_SCORE {
                    PathwayStatus::Activated
                } else {
                    PathwayStatus::Altered
                },
                drugs: p.drugs.clone(),
            })
        })
        .collect();

    enriched.sort_by(|a, b| b.score.total_cmp(&a.score));
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer_stats::compute_layer;
    use omyx_common::LayerType;
    use omyx_test_utils::matrix;
    use pretty_assertions::assert_eq;

    fn enrich(matrices: &[omyx_common::LayerMatrix]) -> Vec<PathwayEnrichmentResult> {
        let kb = ReferenceKnowledge::builtin();
        let results: LayerResults = matrices.iter().map(|m| compute_layer(m, &kb)).collect();
        enrich_pathways(&results, &kb)
    }

    #[test]
    fn test_no_alterations_no_pathways() {
        assert!(enrich(&[matrix(LayerType::Methylation, &[("ESR1", &[0.9, 0.9])])]).is_empty());
    }

    #[test]
    fn test_scores_and_status() {
        let result = enrich(&[
            matrix(LayerType::Mutation, &[("KRAS", &[1.0, 1.0]), ("BRAF", &[1.0, 0.0])]),
            matrix(LayerType::Cnv, &[("ERBB2", &[1.0, 1.0]), ("TP53", &[0.0, 0.0])]),
        ]);

        let names: Vec<&str> = result.iter().map(|r| r.pathway.as_str()).collect();
        assert_eq!(names, vec!["MAPK", "HER2/ERBB"]);

        let mapk = &result[0];
        assert_eq!(mapk.genes_affected, 2);
        assert_eq!(mapk.genes_total, 4);
        assert_eq!(mapk.overlap_genes, vec!["KRAS".to_string(), "BRAF".to_string()]);
        assert_eq!(mapk.status, PathwayStatus::Activated);

        let her2 = &result[1];
        assert_eq!(her2.score, 0.25);
        assert_eq!(her2.status, PathwayStatus::Altered);
        assert_eq!(her2.drugs, vec!["Trastuzumab", "Pertuzumab", "T-DM1"]);
    }

    #[test]
    fn test_activation_threshold_is_strict() {
        let yaml = omyx_test_utils::FIXTURE_KNOWLEDGE_YAML.replace(
            "genes: [GROW1, GROW2, GROW3]",
            "genes: [GROW1, GROW2, GROW3, GROW4, GROW5, GROW6, GROW7, GROW8, GROW9, GROW10]",
        );
        let kb = ReferenceKnowledge::from_yaml_str(&yaml).unwrap();
        let altered = matrix(
            LayerType::Mutation,
            &[("GROW1", &[1.0, 1.0]), ("GROW2", &[1.0, 1.0]), ("GROW3", &[1.0, 1.0])],
        );
        let results: LayerResults = [compute_layer(&altered, &kb)].into_iter().collect();

        let result = enrich_pathways(&results, &kb);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].genes_total, 10);
        // 3 / 10 sits on the threshold and is not activated
        assert_eq!(result[0].score, 0.3);
        assert_eq!(result[0].status, PathwayStatus::Altered);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let result = enrich(&[matrix(LayerType::Cnv, &[("ERBB2", &[1.0, 1.0])])]);
        let json = serde_json::to_value(&result[0]).unwrap();
        assert_eq!(json["status"], "ALTERED");
        assert_eq!(json["score"], 0.25);
    }
}

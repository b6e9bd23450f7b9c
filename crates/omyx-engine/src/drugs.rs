//! Therapy recommendations from actionable alterations.

use std::collections::HashSet;

use serde::Serialize;

use omyx_knowledge::{DrugDatabaseEntry, ReferenceKnowledge};

use crate::layer_stats::LayerResults;
use crate::policy::{DRUG_RECOMMENDATION_LIMIT, HIGH_EXPRESSION};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugRecommendation {
    pub gene: String,
    pub alteration: String,
    pub drugs: Vec<String>,
    pub indication: String,
    pub fda_approved: bool,
    pub evidence_tier: String,
}

impl DrugRecommendation {
    fn new(entry: &DrugDatabaseEntry, alteration: String) -> Self {
        Self {
            gene: entry.gene.clone(),
            alteration,
            drugs: entry.drugs.clone(),
            indication: entry.indication.clone(),
            fda_approved: entry.fda_approved,
            evidence_tier: entry.evidence_tier.clone(),
        }
    }
}

/// Rank drug-database genes supported by the run's evidence.
///
/// Layers are scanned in a fixed order (expressed biomarkers, frequent
/// mutations, amplifications) and the first alteration seen for a gene is
/// the one reported. FDA-approved entries sort first, then by evidence tier.
pub fn recommend_drugs(results: &LayerResults, kb: &ReferenceKnowledge) -> Vec<DrugRecommendation> {
    let mut candidates: Vec<(&str, String)> = Vec::new();

    if let Some(expr) = results.expression() {
        candidates.extend(
            expr.biomarkers_found
                .iter()
                .filter(|s| s.mean > HIGH_EXPRESSION)
                .map(|s| (s.gene.as_str(), "High expression".to_string())),
        );
    }
    if let Some(mutation) = results.mutation() {
        candidates.extend(
            mutation
                .frequently_mutated
                .iter()
                .map(|s| (s.gene.as_str(), format!("Mutated ({:.1}%)", s.percent))),
        );
    }
    if let Some(cnv) = results.cnv() {
        candidates.extend(cnv.amplified.iter().map(|s| (s.gene.as_str(), "Amplified".to_string())));
    }

    let mut seen = HashSet::new();
    let mut recommendations: Vec<DrugRecommendation> = candidates
        .into_iter()
        .filter_map(|(gene, alteration)| {
            let entry = kb.drug_entry(gene)?;
            seen.insert(gene).then(|| DrugRecommendation::new(entry, alteration))
        })
        .collect();

    recommendations.sort_by(|a, b| {
        (!a.fda_approved, &a.evidence_tier).cmp(&(!b.fda_approved, &b.evidence_tier))
    });
    recommendations.truncate(DRUG_RECOMMENDATION_LIMIT);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer_stats::compute_layer;
    use omyx_common::{LayerMatrix, LayerType};
    use omyx_test_utils::{matrix, matrix_owned};
    use pretty_assertions::assert_eq;

    fn recommend(matrices: &[LayerMatrix]) -> Vec<DrugRecommendation> {
        let kb = ReferenceKnowledge::builtin();
        let results: LayerResults = matrices.iter().map(|m| compute_layer(m, &kb)).collect();
        recommend_drugs(&results, &kb)
    }

    #[test]
    fn test_first_alteration_wins() {
        let recs = recommend(&[
            matrix(LayerType::Expression, &[("ERBB2", &[6.0, 8.0])]),
            matrix(LayerType::Mutation, &[("ERBB2", &[1.0, 1.0])]),
            matrix(LayerType::Cnv, &[("ERBB2", &[1.0, 1.0])]),
        ]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].alteration, "High expression");
        assert_eq!(recs[0].evidence_tier, "1A");
    }

    #[test]
    fn test_low_expression_and_unknown_genes_ignored() {
        let recs = recommend(&[
            matrix(LayerType::Expression, &[("ERBB2", &[1.0, 2.0]), ("NOVEL1", &[9.0, 9.5])]),
            matrix(LayerType::Cnv, &[("MYC", &[1.0, 1.0])]),
        ]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_approved_entries_sort_first() {
        let recs = recommend(&[matrix(
            LayerType::Mutation,
            &[("TP53", &[1.0, 1.0, 1.0]), ("KRAS", &[1.0, 1.0, 0.0])],
        )]);
        let genes: Vec<&str> = recs.iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["KRAS", "TP53"]);
        assert_eq!(recs[0].alteration, "Mutated (66.7%)");
        assert!(!recs[1].fda_approved);
    }

    #[test]
    fn test_at_most_eight_unique_genes() {
        let kb = ReferenceKnowledge::builtin();
        let rows: Vec<(String, Vec<f64>)> = kb
            .drug_database()
            .iter()
            .map(|d| (d.gene.clone(), vec![1.0, 1.0]))
            .collect();
        let recs = recommend(&[matrix_owned(LayerType::Cnv, rows)]);
        assert_eq!(recs.len(), DRUG_RECOMMENDATION_LIMIT);
        let unique: HashSet<&str> = recs.iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(unique.len(), recs.len());
        assert!(recs.iter().all(|r| kb.drug_entry(&r.gene).is_some()));
    }
}

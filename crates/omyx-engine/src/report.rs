//! The assembled analysis report and its summary view.

use serde::Serialize;

use omyx_common::LayerType;

use crate::deconvolution::DeconvolutionResult;
use crate::drugs::DrugRecommendation;
use crate::integrate::IntegratedFinding;
use crate::layer_stats::LayerResults;
use crate::pathways::PathwayEnrichmentResult;
use crate::subtype::SubtypePrediction;
use crate::survival::RiskScore;

/// Headline counts of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_layers: usize,
    pub multi_omics_hits: usize,
    pub actionable_targets: usize,
    pub pathways_enriched: usize,
    pub predicted_subtype: String,
    /// Immunotherapy score, or 0 without an expression layer.
    pub immune_score: u32,
    pub confidence: u32,
}

/// Everything one analysis run produces.
///
/// Holds no timestamps or generated ids, so identical inputs serialize to
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Cancer type label as requested.
    pub cancer_type: String,
    pub layers_analyzed: Vec<LayerType>,
    pub summary: ReportSummary,
    pub layer_results: LayerResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deconvolution: Option<DeconvolutionResult>,
    pub integrated: Vec<IntegratedFinding>,
    pub pathways: Vec<PathwayEnrichmentResult>,
    pub subtype: SubtypePrediction,
    pub survival: RiskScore,
    pub drug_recommendations: Vec<DrugRecommendation>,
}

/// Stage outputs gathered before assembly.
#[derive(Debug)]
pub(crate) struct StageOutputs {
    pub integrated: Vec<IntegratedFinding>,
    pub pathways: Vec<PathwayEnrichmentResult>,
    pub subtype: SubtypePrediction,
    pub survival: RiskScore,
    pub drug_recommendations: Vec<DrugRecommendation>,
}

impl AnalysisReport {
    pub(crate) fn assemble(
        cancer_type: &str,
        layer_results: LayerResults,
        deconvolution: Option<DeconvolutionResult>,
        stages: StageOutputs,
    ) -> Self {
        let summary = ReportSummary {
            total_layers: layer_results.len(),
            multi_omics_hits: stages.integrated.len(),
            actionable_targets: stages.integrated.iter().filter(|f| f.actionable).count(),
            pathways_enriched: stages.pathways.len(),
            predicted_subtype: stages.subtype.predicted_subtype.clone(),
            immune_score: deconvolution.as_ref().map_or(0, |d| d.immunotherapy_score),
            confidence: stages.subtype.confidence,
        };

        Self {
            cancer_type: cancer_type.to_string(),
            layers_analyzed: layer_results.iter().map(|(t, _)| *t).collect(),
            summary,
            layer_results,
            deconvolution,
            integrated: stages.integrated,
            pathways: stages.pathways,
            subtype: stages.subtype,
            survival: stages.survival,
            drug_recommendations: stages.drug_recommendations,
        }
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn to_json(&self, pretty: bool) -> omyx_common::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

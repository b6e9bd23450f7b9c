//! Analysis entry point.
//!
//! A run has two parallel stages over immutable data: per-layer statistics
//! (with deconvolution alongside when expression is present), then the five
//! downstream scorers over the finished layer results.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use omyx_common::{LayerMatrix, LayerType, OmyxError, Result};
use omyx_knowledge::ReferenceKnowledge;

use crate::deconvolution::deconvolve;
use crate::drugs::recommend_drugs;
use crate::integrate::integrate;
use crate::layer_stats::{compute_layer, LayerResults};
use crate::pathways::enrich_pathways;
use crate::report::{AnalysisReport, StageOutputs};
use crate::source::LayerSource;
use crate::subtype::classify_subtype;
use crate::survival::score_risk;

// ── Input ───────────────────────────────────────────────────────────────────

/// Matrices and cancer type label for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub cancer_type: String,
    layers: BTreeMap<LayerType, LayerMatrix>,
}

impl AnalysisInput {
    pub fn new(cancer_type: impl Into<String>) -> Self {
        Self {
            cancer_type: cancer_type.into(),
            layers: BTreeMap::new(),
        }
    }

    /// Load every matrix a source provides.
    pub fn from_source(cancer_type: impl Into<String>, source: &dyn LayerSource) -> Result<Self> {
        let mut input = Self::new(cancer_type);
        for matrix in source.load_layers()? {
            input.insert_layer(matrix);
        }
        Ok(input)
    }

    /// Add a matrix under its own layer type. A matrix of the same type
    /// already present is replaced and returned.
    pub fn insert_layer(&mut self, matrix: LayerMatrix) -> Option<LayerMatrix> {
        let layer = matrix.layer_type();
        let previous = self.layers.insert(layer, matrix);
        if previous.is_some() {
            warn!(%layer, "Replacing previously supplied layer");
        }
        previous
    }

    pub fn with_layer(mut self, matrix: LayerMatrix) -> Self {
        self.insert_layer(matrix);
        self
    }

    pub fn layer(&self, layer: LayerType) -> Option<&LayerMatrix> {
        self.layers.get(&layer)
    }

    pub fn layers(&self) -> &BTreeMap<LayerType, LayerMatrix> {
        &self.layers
    }
}

// ── Engine ──────────────────────────────────────────────────────────────────

/// Runs analyses against one reference knowledge set.
///
/// Stateless between runs; concurrent `analyze` calls are independent.
pub struct ScoringEngine<'kb> {
    kb: &'kb ReferenceKnowledge,
    pool: Option<rayon::ThreadPool>,
}

impl<'kb> ScoringEngine<'kb> {
    /// Engine on the global rayon pool (one worker per core).
    pub fn new(kb: &'kb ReferenceKnowledge) -> Self {
        Self { kb, pool: None }
    }

    /// Engine on a dedicated pool of `workers` threads; 0 means the global pool.
    pub fn with_workers(kb: &'kb ReferenceKnowledge, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Ok(Self::new(kb));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("omyx-worker-{i}"))
            .build()
            .map_err(|e| OmyxError::Config(format!("failed to build worker pool: {e}")))?;
        Ok(Self { kb, pool: Some(pool) })
    }

    pub fn knowledge(&self) -> &ReferenceKnowledge {
        self.kb
    }

    /// Run the full pipeline. Fails only when no layer was supplied.
    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport> {
        if input.layers.is_empty() {
            warn!("Analysis requested without any layer");
            return Err(OmyxError::NoLayers);
        }

        let start = Instant::now();
        info!(
            cancer_type = %input.cancer_type,
            layers = input.layers.len(),
            "Starting multi-omics analysis"
        );

        let report = match &self.pool {
            Some(pool) => pool.install(|| self.run(input)),
            None => self.run(input),
        };

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            hits = report.summary.multi_omics_hits,
            subtype = %report.summary.predicted_subtype,
            "Analysis complete"
        );
        Ok(report)
    }

    fn run(&self, input: &AnalysisInput) -> AnalysisReport {
        let kb = self.kb;

        // Stage 1: layers and deconvolution are independent of each other.
        let (layer_results, deconvolution) = rayon::join(
            || {
                input
                    .layers
                    .par_iter()
                    .map(|(_, matrix)| compute_layer(matrix, kb))
                    .collect::<Vec<_>>()
                    .into_iter()
                    .collect::<LayerResults>()
            },
            || input.layers.get(&LayerType::Expression).map(|m| deconvolve(m, kb)),
        );
        debug!(layers = layer_results.len(), deconvolved = deconvolution.is_some(), "Layer stage done");

        // Stage 2: every scorer reads the same immutable layer results.
        let lr = &layer_results;
        let ((integrated, pathways), (subtype, (survival, drug_recommendations))) = rayon::join(
            || rayon::join(|| integrate(lr, kb), || enrich_pathways(lr, kb)),
            || {
                rayon::join(
                    || classify_subtype(lr, &input.cancer_type, kb),
                    || rayon::join(|| score_risk(lr, kb), || recommend_drugs(lr, kb)),
                )
            },
        );

        AnalysisReport::assemble(
            &input.cancer_type,
            layer_results,
            deconvolution,
            StageOutputs {
                integrated,
                pathways,
                subtype,
                survival,
                drug_recommendations,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omyx_test_utils::matrix;

    #[test]
    fn test_empty_input_is_rejected() {
        let kb = ReferenceKnowledge::builtin();
        let err = ScoringEngine::new(&kb).analyze(&AnalysisInput::new("breast")).unwrap_err();
        assert!(matches!(err, OmyxError::NoLayers));
        assert_eq!(err.to_string(), "No layers");
    }

    #[test]
    fn test_insert_layer_replaces_same_type() {
        let mut input = AnalysisInput::new("breast");
        assert!(input.insert_layer(matrix(LayerType::Cnv, &[("A", &[1.0])])).is_none());
        let previous = input.insert_layer(matrix(LayerType::Cnv, &[("B", &[1.0])]));
        assert_eq!(previous.unwrap().genes(), ["A".to_string()]);
        assert_eq!(input.layers().len(), 1);
        assert_eq!(input.layer(LayerType::Cnv).unwrap().genes(), ["B".to_string()]);
    }

    #[test]
    fn test_dedicated_pool_matches_global_pool() {
        let kb = ReferenceKnowledge::builtin();
        let input = AnalysisInput::new("breast")
            .with_layer(matrix(LayerType::Expression, &[("ESR1", &[8.0, 10.0]), ("CD8A", &[3.0, 4.0])]))
            .with_layer(matrix(LayerType::Mutation, &[("PIK3CA", &[1.0, 0.0])]));

        let global = ScoringEngine::new(&kb).analyze(&input).unwrap();
        let dedicated = ScoringEngine::with_workers(&kb, 2).unwrap().analyze(&input).unwrap();
        assert_eq!(global, dedicated);
        assert_eq!(global.layers_analyzed, vec![LayerType::Expression, LayerType::Mutation]);
        assert!(global.deconvolution.is_some());
    }

    #[test]
    fn test_without_expression_has_no_deconvolution() {
        let kb = ReferenceKnowledge::builtin();
        let input = AnalysisInput::new("breast").with_layer(matrix(LayerType::Cnv, &[("ERBB2", &[1.0, 1.0])]));
        let report = ScoringEngine::new(&kb).analyze(&input).unwrap();
        assert!(report.deconvolution.is_none());
        assert_eq!(report.summary().immune_score, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("deconvolution").is_none());
    }
}

//! omyx-engine: deterministic multi-omics scoring.
//!
//! Converts per-layer matrices plus [`ReferenceKnowledge`] into one
//! explainable [`AnalysisReport`]: layer statistics, cross-layer integration,
//! pathway enrichment, cell-type deconvolution, subtype classification,
//! prognostic risk and therapy ranking.
//!
//! [`ReferenceKnowledge`]: omyx_knowledge::ReferenceKnowledge

pub mod policy;
pub mod normalise;
pub mod layer_stats;
pub mod deconvolution;
pub mod integrate;
pub mod pathways;
pub mod subtype;
pub mod survival;
pub mod drugs;
pub mod report;
pub mod source;
pub mod pipeline;

pub use deconvolution::{deconvolve, DeconvolutionResult, Insight, InsightKind};
pub use drugs::{recommend_drugs, DrugRecommendation};
pub use integrate::{integrate, IntegratedFinding};
pub use layer_stats::{compute_layer, LayerResult, LayerResults};
pub use pathways::{enrich_pathways, PathwayEnrichmentResult, PathwayStatus};
pub use pipeline::{AnalysisInput, ScoringEngine};
pub use report::{AnalysisReport, ReportSummary};
pub use source::{InMemoryLayerSource, JsonFileLayerSource, LayerSource};
pub use subtype::{classify_subtype, SubtypePrediction};
pub use survival::{score_risk, RiskGroup, RiskScore};

//! Fixed scoring policy.
//!
//! Every threshold, cap and weight used by the engine. These are policy
//! constants, not per-call options: reports are only comparable across runs
//! when they are identical. None of them has a recorded calibration source.

// ── Layer statistics ────────────────────────────────────────────────────────

pub const TOP_VARIABLE_LIMIT: usize = 50;
pub const TOP_MUTATED_LIMIT: usize = 50;
/// A gene is "frequently mutated" above this fraction of samples.
pub const FREQUENT_MUTATION_FREQUENCY: f64 = 0.02;
pub const FREQUENT_MUTATION_LIMIT: usize = 30;
pub const HYPERMETHYLATION_BETA: f64 = 0.7;
pub const HYPOMETHYLATION_BETA: f64 = 0.3;
pub const METHYLATION_STATUS_LIMIT: usize = 30;
pub const AMPLIFICATION_LOG2: f64 = 0.3;
pub const DELETION_LOG2: f64 = -0.3;
pub const CNV_STATUS_LIMIT: usize = 30;

// ── Cross-layer integration ─────────────────────────────────────────────────

pub const INTEGRATION_EXPRESSION_CANDIDATES: usize = 100;
pub const EXPRESSION_EVIDENCE_WEIGHT: u32 = 1;
pub const MUTATION_EVIDENCE_WEIGHT: u32 = 2;
pub const METHYLATION_EVIDENCE_WEIGHT: u32 = 1;
pub const CNV_EVIDENCE_WEIGHT: u32 = 1;
pub const BIOMARKER_BONUS: u32 = 2;
pub const MIN_INTEGRATED_LAYERS: usize = 2;
pub const INTEGRATED_FINDINGS_LIMIT: usize = 20;

// ── Pathway enrichment ──────────────────────────────────────────────────────

pub const PATHWAY_ALTERED_EXPRESSION_GENES: usize = 50;
/// Overlap fraction above which a pathway is reported as ACTIVATED.
pub const PATHWAY_ACTIVATION_SCORE: f64 = 0.3;

// ── Expression levels (subtype, risk, drug ranking) ─────────────────────────

pub const HIGH_EXPRESSION: f64 = 5.0;
pub const LOW_EXPRESSION: f64 = 3.0;

// ── Deconvolution ───────────────────────────────────────────────────────────

pub const MIN_PRESENT_MARKERS: usize = 2;
pub const CELL_SCORE_FLOOR: f64 = 0.01;
pub const MACROPHAGE_SUPPRESSION_FACTOR: f64 = 0.3;
pub const IMMUNOTHERAPY_BASELINE: f64 = 30.0;

// ── Subtype classification ──────────────────────────────────────────────────

pub const SUBTYPE_EXPRESSION_CANDIDATES: usize = 100;
pub const SUBTYPE_MUTATION_FREQUENCY: f64 = 0.05;
pub const SUBTYPE_TOP_MUTATED: usize = 50;
pub const SUBTYPE_EXPRESSION_MATCH: u32 = 2;
pub const SUBTYPE_WEAK_MATCH: u32 = 1;
pub const SUBTYPE_MUTATION_MATCH: u32 = 3;
pub const SUBTYPE_CNV_MATCH: u32 = 2;
pub const SUBTYPE_EVIDENCE_LIMIT: usize = 6;
pub const SUBTYPE_CONFIDENCE_CAP: u32 = 95;
pub const SUBTYPE_CONFIDENCE_FLOOR: u32 = 40;
pub const SUBTYPE_NO_EVIDENCE_CONFIDENCE: u32 = 30;

// ── Prognostic risk ─────────────────────────────────────────────────────────

pub const RISK_BASELINE: f64 = 50.0;
pub const SIGNATURE_RISK_STEP: f64 = 8.0;
pub const SIGNATURE_PROTECTIVE_STEP: f64 = 5.0;
pub const MIN_SIGNATURE_GENES: usize = 2;
pub const TP53_MUTATION_RISK: f64 = 12.0;
pub const RISK_SCORE_MIN: f64 = 10.0;
pub const RISK_SCORE_MAX: f64 = 95.0;
pub const RISK_FACTOR_LIMIT: usize = 4;
pub const PROTECTIVE_FACTOR_LIMIT: usize = 3;

// ── Drug recommendations ────────────────────────────────────────────────────

pub const DRUG_RECOMMENDATION_LIMIT: usize = 8;

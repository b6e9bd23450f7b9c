//! Record types of the reference knowledge tables.

use serde::{Deserialize, Serialize};

// ── Pathways, biomarkers, drugs ─────────────────────────────────────────────

/// A curated signalling pathway and the therapies that act on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayDefinition {
    pub name: String,
    pub genes: Vec<String>,
    #[serde(default)]
    pub drugs: Vec<String>,
}

/// A gene with a known cancer-relevant role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerEntry {
    pub gene: String,
    pub role: String,
    #[serde(default)]
    pub drugs: Vec<String>,
}

/// An actionable drug–target entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugDatabaseEntry {
    pub gene: String,
    pub drugs: Vec<String>,
    pub indication: String,
    pub fda_approved: bool,
    /// Evidence tier label ("1A", "3", ...); compared as a string.
    pub evidence_tier: String,
}

// ── Cancer subtypes ─────────────────────────────────────────────────────────

/// Expected state of one marker gene within a subtype profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerState {
    High,
    Low,
    Variable,
    Mutated,
    Rearranged,
    Normal,
    Amplified,
    Deleted,
}

impl MarkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerState::High       => "high",
            MarkerState::Low        => "low",
            MarkerState::Variable   => "variable",
            MarkerState::Mutated    => "mutated",
            MarkerState::Rearranged => "rearranged",
            MarkerState::Normal     => "normal",
            MarkerState::Amplified  => "amplified",
            MarkerState::Deleted    => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerExpectation {
    pub gene: String,
    pub expected: MarkerState,
}

/// One named subtype within a cancer type.
///
/// `markers` keeps definition order; evidence strings are emitted in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancerSubtypeProfile {
    /// Key of the owning cancer type; filled in from the parent on load.
    #[serde(default)]
    pub cancer_type: String,
    pub subtype_name: String,
    pub markers: Vec<MarkerExpectation>,
    pub description: String,
    pub treatment: String,
}

/// All subtype profiles of one cancer type, in definition order.
///
/// Definition order is the classifier's tie-break: the first subtype to
/// reach the best score wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancerTypeProfile {
    /// Lookup key matched case-sensitively against the request label (e.g. "breast").
    pub key: String,
    pub display_name: String,
    pub subtypes: Vec<CancerSubtypeProfile>,
}

// ── Signatures ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellTypeSignature {
    pub cell_type: String,
    pub marker_genes: Vec<String>,
}

/// Which expression level of a signature is associated with poor outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskDirection {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrognosticSignature {
    pub name: String,
    pub genes: Vec<String>,
    pub risk_direction: RiskDirection,
    pub weight: f64,
}

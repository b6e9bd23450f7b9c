//! omyx-knowledge: Static reference knowledge for the scoring engine.
//!
//! Pathway gene sets, the biomarker registry, the drug database, cancer
//! subtype marker profiles, cell-type marker signatures and prognostic
//! signatures. A [`ReferenceKnowledge`] value is built once at startup
//! (from the built-in tables or a YAML/JSON file) and then shared by
//! reference with every engine component.

pub mod types;
pub mod builtin;
pub mod store;

pub use types::{
    BiomarkerEntry, CancerSubtypeProfile, CancerTypeProfile, CellTypeSignature,
    DrugDatabaseEntry, MarkerExpectation, MarkerState, PathwayDefinition,
    PrognosticSignature, RiskDirection,
};
pub use store::{KnowledgeTables, ReferenceKnowledge};

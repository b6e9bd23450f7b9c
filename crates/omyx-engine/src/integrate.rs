//! Cross-layer evidence integration.
//!
//! Builds a gene-keyed ledger from each layer's candidate lists, then keeps
//! genes supported by several layers or listed in the biomarker registry.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use omyx_common::LayerType;
use omyx_knowledge::ReferenceKnowledge;

use crate::layer_stats::LayerResults;
use crate::policy::*;

/// One gene's combined evidence across layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegratedFinding {
    pub gene: String,
    /// Contributing layers in canonical order.
    pub layers: BTreeSet<LayerType>,
    pub findings: Vec<String>,
    pub evidence_score: u32,
    pub is_biomarker: bool,
    pub role: String,
    pub drugs: Vec<String>,
    pub actionable: bool,
}

#[derive(Debug, Default)]
struct LedgerEntry {
    layers: BTreeSet<LayerType>,
    findings: Vec<String>,
    score: u32,
}

/// Gene ledger preserving first-encounter order.
#[derive(Debug, Default)]
struct Ledger {
    order: Vec<String>,
    entries: HashMap<String, LedgerEntry>,
}

impl Ledger {
    fn record(&mut self, gene: &str, layer: LayerType, finding: String, weight: u32) {
        if !self.entries.contains_key(gene) {
            self.order.push(gene.to_string());
        }
        let entry = self.entries.entry(gene.to_string()).or_default();
        entry.layers.insert(layer);
        entry.findings.push(finding);
        entry.score += weight;
    }
}

/// Merge per-layer candidates into ranked findings (at most 20).
pub fn integrate(results: &LayerResults, kb: &ReferenceKnowledge) -> Vec<IntegratedFinding> {
    let mut ledger = Ledger::default();

    if let Some(expr) = results.expression() {
        for s in expr.top_variable.iter().take(INTEGRATION_EXPRESSION_CANDIDATES) {
            ledger.record(&s.gene, LayerType::Expression, "High variance".to_string(), EXPRESSION_EVIDENCE_WEIGHT);
        }
    }

    if let Some(mutation) = results.mutation() {
        for s in &mutation.frequently_mutated {
            ledger.record(
                &s.gene,
                LayerType::Mutation,
                format!("Mutated {:.1}%", s.percent),
                MUTATION_EVIDENCE_WEIGHT,
            );
        }
    }

    if let Some(meth) = results.methylation() {
        for s in meth.hypermethylated.iter().chain(&meth.hypomethylated) {
            ledger.record(&s.gene, LayerType::Methylation, s.status.as_str().to_string(), METHYLATION_EVIDENCE_WEIGHT);
        }
    }

    if let Some(cnv) = results.cnv() {
        for s in cnv.amplified.iter().chain(&cnv.deleted) {
            ledger.record(&s.gene, LayerType::Cnv, s.status.as_str().to_string(), CNV_EVIDENCE_WEIGHT);
        }
    }

    let Ledger { order, mut entries } = ledger;
    let mut findings: Vec<IntegratedFinding> = order
        .into_iter()
        .filter_map(|gene| {
            let entry = entries.remove(&gene)?;
            let biomarker = kb.biomarker(&gene);
            if entry.layers.len() < MIN_INTEGRATED_LAYERS && biomarker.is_none() {
                return None;
            }
            let bonus = if biomarker.is_some() { BIOMARKER_BONUS } else { 0 };
            let drugs = biomarker.map(|b| b.drugs.clone()).unwrap_or_default();
            Some(IntegratedFinding {
                layers: entry.layers,
                findings: entry.findings,
                evidence_score: entry.score + bonus,
                is_biomarker: biomarker.is_some(),
                role: biomarker.map(|b| b.role.clone()).unwrap_or_default(),
                actionable: !drugs.is_empty(),
                drugs,
                gene,
            })
        })
        .collect();

    // Stable: ties keep encounter order.
    findings.sort_by(|a, b| b.evidence_score.cmp(&a.evidence_score));
    findings.truncate(INTEGRATED_FINDINGS_LIMIT);
    findings
}

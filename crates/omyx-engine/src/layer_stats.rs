//! Per-layer statistics.
//!
//! Summarises one [`LayerMatrix`] into ranked gene records. Every layer type
//! has its own record shape and its own selection lists; what they share is
//! the row handling: duplicate gene rows keep their first occurrence. A row
//! with no finite cell is dropped, except in the mutation layer where it is
//! kept with zero observed samples.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use omyx_common::{LayerMatrix, LayerType};
use omyx_knowledge::ReferenceKnowledge;

use crate::normalise::{finite_mean, finite_mean_variance, rounded};
use crate::policy::*;

// ── Records ─────────────────────────────────────────────────────────────────

/// Expression or protein abundance summary for one gene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStat {
    pub gene: String,
    #[serde(serialize_with = "rounded::dp3")]
    pub mean: f64,
    /// Sample variance (n − 1) over finite cells.
    #[serde(serialize_with = "rounded::dp3")]
    pub variance: f64,
    pub is_biomarker: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationStat {
    pub gene: String,
    /// Non-missing cells with a non-zero call.
    pub mutation_count: usize,
    /// Non-missing cells.
    pub total_samples: usize,
    #[serde(serialize_with = "rounded::dp4")]
    pub frequency: f64,
    #[serde(serialize_with = "rounded::dp1")]
    pub percent: f64,
    pub is_biomarker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethylationStatus {
    Hypermethylated,
    Hypomethylated,
    Intermediate,
}

impl MethylationStatus {
    pub fn classify(mean_beta: f64) -> Self {
        if mean_beta > HYPERMETHYLATION_BETA {
            MethylationStatus::Hypermethylated
        } else if mean_beta < HYPOMETHYLATION_BETA {
            MethylationStatus::Hypomethylated
        } else {
            MethylationStatus::Intermediate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MethylationStatus::Hypermethylated => "hypermethylated",
            MethylationStatus::Hypomethylated  => "hypomethylated",
            MethylationStatus::Intermediate    => "intermediate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethylationStat {
    pub gene: String,
    #[serde(serialize_with = "rounded::dp4")]
    pub mean_beta: f64,
    pub status: MethylationStatus,
    pub is_biomarker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CnvStatus {
    Amplified,
    Deleted,
    Neutral,
}

impl CnvStatus {
    pub fn classify(mean_log2: f64) -> Self {
        if mean_log2 > AMPLIFICATION_LOG2 {
            CnvStatus::Amplified
        } else if mean_log2 < DELETION_LOG2 {
            CnvStatus::Deleted
        } else {
            CnvStatus::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CnvStatus::Amplified => "amplified",
            CnvStatus::Deleted   => "deleted",
            CnvStatus::Neutral   => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CnvStat {
    pub gene: String,
    #[serde(serialize_with = "rounded::dp4")]
    pub mean_log2: f64,
    pub status: CnvStatus,
    pub is_biomarker: bool,
}

// ── Layer results ───────────────────────────────────────────────────────────

/// Expression (or protein) layer: variance ranking plus registry hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpressionLayer {
    pub total_genes: usize,
    /// Highest-variance genes, variance non-increasing.
    pub top_variable: Vec<ExpressionStat>,
    /// Every biomarker-registry gene with a usable row, in variance order.
    pub biomarkers_found: Vec<ExpressionStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MutationLayer {
    pub total_genes: usize,
    pub top_mutated: Vec<MutationStat>,
    pub frequently_mutated: Vec<MutationStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethylationLayer {
    pub total_genes: usize,
    pub hypermethylated: Vec<MethylationStat>,
    pub hypomethylated: Vec<MethylationStat>,
    pub biomarkers: Vec<MethylationStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CnvLayer {
    pub total_genes: usize,
    pub amplified: Vec<CnvStat>,
    pub deleted: Vec<CnvStat>,
    pub biomarkers: Vec<CnvStat>,
}

/// Summary of one layer. Serialized with a `type` tag naming the layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerResult {
    Expression(ExpressionLayer),
    Mutation(MutationLayer),
    Methylation(MethylationLayer),
    Cnv(CnvLayer),
    Protein(ExpressionLayer),
}

impl LayerResult {
    pub fn layer_type(&self) -> LayerType {
        match self {
            LayerResult::Expression(_)  => LayerType::Expression,
            LayerResult::Mutation(_)    => LayerType::Mutation,
            LayerResult::Methylation(_) => LayerType::Methylation,
            LayerResult::Cnv(_)         => LayerType::Cnv,
            LayerResult::Protein(_)     => LayerType::Protein,
        }
    }

    pub fn total_genes(&self) -> usize {
        match self {
            LayerResult::Expression(l) | LayerResult::Protein(l) => l.total_genes,
            LayerResult::Mutation(l)    => l.total_genes,
            LayerResult::Methylation(l) => l.total_genes,
            LayerResult::Cnv(l)         => l.total_genes,
        }
    }
}

/// All layer results of one run, keyed in canonical layer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LayerResults(BTreeMap<LayerType, LayerResult>);

impl LayerResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result under its own layer type, replacing any previous one.
    pub fn insert(&mut self, result: LayerResult) {
        self.0.insert(result.layer_type(), result);
    }

    pub fn get(&self, layer: LayerType) -> Option<&LayerResult> {
        self.0.get(&layer)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LayerType, &LayerResult)> {
        self.0.iter()
    }

    pub fn expression(&self) -> Option<&ExpressionLayer> {
        match self.0.get(&LayerType::Expression) {
            Some(LayerResult::Expression(l)) => Some(l),
            _ => None,
        }
    }

    pub fn mutation(&self) -> Option<&MutationLayer> {
        match self.0.get(&LayerType::Mutation) {
            Some(LayerResult::Mutation(l)) => Some(l),
            _ => None,
        }
    }

    pub fn methylation(&self) -> Option<&MethylationLayer> {
        match self.0.get(&LayerType::Methylation) {
            Some(LayerResult::Methylation(l)) => Some(l),
            _ => None,
        }
    }

    pub fn cnv(&self) -> Option<&CnvLayer> {
        match self.0.get(&LayerType::Cnv) {
            Some(LayerResult::Cnv(l)) => Some(l),
            _ => None,
        }
    }
}

impl FromIterator<LayerResult> for LayerResults {
    fn from_iter<I: IntoIterator<Item = LayerResult>>(iter: I) -> Self {
        let mut results = LayerResults::new();
        for r in iter {
            results.insert(r);
        }
        results
    }
}

// ── Computation ─────────────────────────────────────────────────────────────

/// Summarise one matrix according to its layer type.
pub fn compute_layer(matrix: &LayerMatrix, kb: &ReferenceKnowledge) -> LayerResult {
    let result = match matrix.layer_type() {
        LayerType::Expression  => LayerResult::Expression(expression_layer(matrix, kb)),
        LayerType::Protein     => LayerResult::Protein(expression_layer(matrix, kb)),
        LayerType::Mutation    => LayerResult::Mutation(mutation_layer(matrix, kb)),
        LayerType::Methylation => LayerResult::Methylation(methylation_layer(matrix, kb)),
        LayerType::Cnv         => LayerResult::Cnv(cnv_layer(matrix, kb)),
    };

    debug!(
        layer = %matrix.layer_type(),
        rows = matrix.shape().0,
        samples = matrix.shape().1,
        usable = result.total_genes(),
        "Layer statistics computed"
    );
    result
}

/// Rows in matrix order, skipping repeated gene identifiers.
fn unique_rows(matrix: &LayerMatrix) -> impl Iterator<Item = (&str, &[f64])> + '_ {
    let mut seen = HashSet::new();
    matrix.rows().filter(move |(gene, _)| seen.insert(*gene))
}

fn expression_layer(matrix: &LayerMatrix, kb: &ReferenceKnowledge) -> ExpressionLayer {
    let mut stats: Vec<ExpressionStat> = unique_rows(matrix)
        .filter_map(|(gene, row)| {
            let (mean, variance) = finite_mean_variance(row)?;
            Some(ExpressionStat {
                gene: gene.to_string(),
                mean,
                variance,
                is_biomarker: kb.is_biomarker(gene),
            })
        })
        .collect();

    // Stable: equal variances keep matrix order.
    stats.sort_by(|a, b| b.variance.total_cmp(&a.variance));

    ExpressionLayer {
        total_genes: stats.len(),
        biomarkers_found: stats.iter().filter(|s| s.is_biomarker).cloned().collect(),
        top_variable: stats.into_iter().take(TOP_VARIABLE_LIMIT).collect(),
    }
}

fn mutation_layer(matrix: &LayerMatrix, kb: &ReferenceKnowledge) -> MutationLayer {
    // Every row is kept; a row with no observed call has frequency 0.
    let mut stats: Vec<MutationStat> = unique_rows(matrix)
        .map(|(gene, row)| {
            let observed = || row.iter().filter(|v| v.is_finite());
            let mutation_count = observed().filter(|&&v| v != 0.0).count();
            let total_samples = observed().count();
            let frequency = if total_samples > 0 {
                mutation_count as f64 / total_samples as f64
            } else {
                0.0
            };
            MutationStat {
                gene: gene.to_string(),
                mutation_count,
                total_samples,
                frequency,
                percent: frequency * 100.0,
                is_biomarker: kb.is_biomarker(gene),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));

    MutationLayer {
        total_genes: stats.len(),
        frequently_mutated: stats
            .iter()
            .filter(|s| s.frequency > FREQUENT_MUTATION_FREQUENCY)
            .take(FREQUENT_MUTATION_LIMIT)
            .cloned()
            .collect(),
        top_mutated: stats.into_iter().take(TOP_MUTATED_LIMIT).collect(),
    }
}

fn methylation_layer(matrix: &LayerMatrix, kb: &ReferenceKnowledge) -> MethylationLayer {
    let stats: Vec<MethylationStat> = unique_rows(matrix)
        .filter_map(|(gene, row)| {
            let (mean_beta, _) = finite_mean(row)?;
            Some(MethylationStat {
                gene: gene.to_string(),
                mean_beta,
                status: MethylationStatus::classify(mean_beta),
                is_biomarker: kb.is_biomarker(gene),
            })
        })
        .collect();

    let with_status = |status: MethylationStatus| -> Vec<MethylationStat> {
        stats
            .iter()
            .filter(|s| s.status == status)
            .take(METHYLATION_STATUS_LIMIT)
            .cloned()
            .collect()
    };

    MethylationLayer {
        total_genes: stats.len(),
        hypermethylated: with_status(MethylationStatus::Hypermethylated),
        hypomethylated: with_status(MethylationStatus::Hypomethylated),
        biomarkers: stats.iter().filter(|s| s.is_biomarker).cloned().collect(),
    }
}

fn cnv_layer(matrix: &LayerMatrix, kb: &ReferenceKnowledge) -> CnvLayer {
    let mut stats: Vec<CnvStat> = unique_rows(matrix)
        .filter_map(|(gene, row)| {
            let (mean_log2, _) = finite_mean(row)?;
            Some(CnvStat {
                gene: gene.to_string(),
                mean_log2,
                status: CnvStatus::classify(mean_log2),
                is_biomarker: kb.is_biomarker(gene),
            })
        })
        .collect();

    stats.sort_by(|a, b| b.mean_log2.total_cmp(&a.mean_log2));

    let with_status = |status: CnvStatus| -> Vec<CnvStat> {
        stats
            .iter()
            .filter(|s| s.status == status)
            .take(CNV_STATUS_LIMIT)
            .cloned()
            .collect()
    };

    CnvLayer {
        total_genes: stats.len(),
        amplified: with_status(CnvStatus::Amplified),
        deleted: with_status(CnvStatus::Deleted),
        biomarkers: stats.iter().filter(|s| s.is_biomarker).cloned().collect(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

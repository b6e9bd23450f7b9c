//! Core input types shared by the knowledge store, the engine and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{OmyxError, Result};

// ---------------------------------------------------------------------------
// Layer type
// ---------------------------------------------------------------------------

/// One omics assay type.
///
/// The derived ordering is the canonical layer order used for every map in
/// the report, so serialized output is stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    Expression,
    Mutation,
    Methylation,
    Cnv,
    Protein,
}

impl LayerType {
    pub const ALL: [LayerType; 5] = [
        LayerType::Expression,
        LayerType::Mutation,
        LayerType::Methylation,
        LayerType::Cnv,
        LayerType::Protein,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerType::Expression  => "expression",
            LayerType::Mutation    => "mutation",
            LayerType::Methylation => "methylation",
            LayerType::Cnv         => "cnv",
            LayerType::Protein     => "protein",
        }
    }

    /// Parse a layer label, ignoring ASCII case and surrounding whitespace.
    pub fn parse(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "expression"  => Ok(LayerType::Expression),
            "mutation"    => Ok(LayerType::Mutation),
            "methylation" => Ok(LayerType::Methylation),
            "cnv"         => Ok(LayerType::Cnv),
            "protein"     => Ok(LayerType::Protein),
            _             => Err(OmyxError::UnknownLayerType(label.to_string())),
        }
    }

    /// Guess the layer type from an upload file name.
    /// Falls back to expression when no keyword matches.
    pub fn detect_from_filename(filename: &str) -> Self {
        let f = filename.to_lowercase();
        let has_any = |keys: &[&str]| keys.iter().any(|k| f.contains(k));

        if has_any(&["rnaseq", "rna", "expression", "rsem", "rpkm", "fpkm", "tpm"]) {
            return LayerType::Expression;
        }
        if has_any(&["mutation", "mutsig", "maf", "snv"]) || f.ends_with(".vcf") || f.ends_with(".cbt") {
            return LayerType::Mutation;
        }
        if has_any(&["methyl", "meth450", "meth27"]) {
            return LayerType::Methylation;
        }
        if has_any(&["cnv", "scnv", "gistic", "copy"]) {
            return LayerType::Cnv;
        }
        if has_any(&["rppa", "protein"]) {
            return LayerType::Protein;
        }
        LayerType::Expression
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerType {
    type Err = OmyxError;

    fn from_str(s: &str) -> Result<Self> {
        LayerType::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Layer matrix
// ---------------------------------------------------------------------------

/// A gene-by-sample numeric grid for one layer.
///
/// Values are stored row-major (one row per gene). Missing or non-numeric
/// cells are `NaN`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerMatrixRecord", into = "LayerMatrixRecord")]
pub struct LayerMatrix {
    layer_type: LayerType,
    genes: Vec<String>,
    samples: Vec<String>,
    values: Vec<f64>,
}

impl LayerMatrix {
    /// Build a matrix from one `Vec` of values per gene.
    pub fn new(
        layer_type: LayerType,
        genes: Vec<String>,
        samples: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if rows.len() != genes.len() {
            return Err(OmyxError::InvalidMatrix(format!(
                "{layer_type} matrix has {} rows but {} gene identifiers",
                rows.len(),
                genes.len()
            )));
        }

        let n_samples = samples.len();
        let mut values = Vec::with_capacity(genes.len() * n_samples);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_samples {
                return Err(OmyxError::InvalidMatrix(format!(
                    "{layer_type} row {i} ({}) has {} values, expected {n_samples}",
                    genes[i],
                    row.len()
                )));
            }
            values.extend(row);
        }

        Ok(Self { layer_type, genes, samples, values })
    }

    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// (n_genes, n_samples).
    pub fn shape(&self) -> (usize, usize) {
        (self.genes.len(), self.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Values of one gene row across all samples.
    pub fn row(&self, gene_idx: usize) -> Option<&[f64]> {
        if gene_idx >= self.genes.len() {
            return None;
        }
        let n = self.samples.len();
        let start = gene_idx * n;
        Some(&self.values[start..start + n])
    }

    /// Iterate `(gene, row)` pairs in matrix order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        let n = self.samples.len();
        self.genes
            .iter()
            .enumerate()
            .map(move |(i, g)| (g.as_str(), &self.values[i * n..i * n + n]))
    }
}

/// Serialized form of a [`LayerMatrix`]; `null` cells stand for missing values.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayerMatrixRecord {
    layer_type: LayerType,
    genes: Vec<String>,
    samples: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl TryFrom<LayerMatrixRecord> for LayerMatrix {
    type Error = OmyxError;

    fn try_from(rec: LayerMatrixRecord) -> Result<Self> {
        let rows = rec
            .values
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect();
        LayerMatrix::new(rec.layer_type, rec.genes, rec.samples, rows)
    }
}

impl From<LayerMatrix> for LayerMatrixRecord {
    fn from(m: LayerMatrix) -> Self {
        let n = m.samples.len();
        let values = (0..m.genes.len())
            .map(|i| {
                m.values[i * n..i * n + n]
                    .iter()
                    .map(|v| v.is_finite().then_some(*v))
                    .collect()
            })
            .collect();
        LayerMatrixRecord {
            layer_type: m.layer_type,
            genes: m.genes,
            samples: m.samples,
            values,
        }
    }
}

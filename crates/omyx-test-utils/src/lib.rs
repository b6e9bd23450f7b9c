//! Shared testing utilities for the omyx workspace.
//!
//! Matrix builders with generated sample names, and a small fixture
//! knowledge set for tests that should not depend on the built-in tables.

use omyx_common::{LayerMatrix, LayerType};
use omyx_knowledge::ReferenceKnowledge;

pub use pretty_assertions;

/// Build a matrix from `(gene, row)` pairs. Sample names are `S1..Sn`,
/// sized from the first row.
pub fn matrix(layer: LayerType, rows: &[(&str, &[f64])]) -> LayerMatrix {
    matrix_owned(
        layer,
        rows.iter().map(|(g, r)| (g.to_string(), r.to_vec())).collect(),
    )
}

/// Owned variant of [`matrix`] for generated rows.
pub fn matrix_owned(layer: LayerType, rows: Vec<(String, Vec<f64>)>) -> LayerMatrix {
    let n_samples = rows.first().map_or(0, |(_, r)| r.len());
    let (genes, values): (Vec<String>, Vec<Vec<f64>>) = rows.into_iter().unzip();
    LayerMatrix::new(layer, genes, sample_names(n_samples), values)
        .unwrap_or_else(|e| panic!("fixture matrix is ragged: {e}"))
}

/// Every cell of every gene row set to `value`.
pub fn uniform_matrix(layer: LayerType, genes: &[&str], n_samples: usize, value: f64) -> LayerMatrix {
    matrix_owned(
        layer,
        genes.iter().map(|g| (g.to_string(), vec![value; n_samples])).collect(),
    )
}

pub fn sample_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("S{i}")).collect()
}

/// Mutation calls with `mutated` ones out of `total` samples per gene.
pub fn mutation_matrix(calls: &[(&str, usize, usize)]) -> LayerMatrix {
    let rows = calls
        .iter()
        .map(|&(gene, mutated, total)| {
            let row = (0..total).map(|i| if i < mutated { 1.0 } else { 0.0 }).collect();
            (gene.to_string(), row)
        })
        .collect();
    matrix_owned(LayerType::Mutation, rows)
}

pub const FIXTURE_KNOWLEDGE_YAML: &str = r#"
default_cancer_type: toy
pathways:
  - name: Toy Growth
    genes: [GROW1, GROW2, GROW3]
    drugs: [Growstat]
  - name: Toy Repair
    genes: [FIX1, FIX2]
biomarkers:
  - gene: GROW1
    role: Oncogene
    drugs: [Growstat]
  - gene: FIX1
    role: DNA repair
drug_database:
  - gene: GROW1
    drugs: [Growstat]
    indication: GROW1-high tumours
    fda_approved: true
    evidence_tier: "1A"
  - gene: FIX1
    drugs: [Fixparib]
    indication: FIX1-mutant tumours
    fda_approved: false
    evidence_tier: "2"
cancer_types:
  - key: toy
    display_name: Toy Cancer
    subtypes:
      - subtype_name: Growth-driven
        markers:
          - { gene: GROW1, expected: high }
          - { gene: FIX1, expected: normal }
        description: proliferative
        treatment: Growstat
      - subtype_name: Repair-deficient
        markers:
          - { gene: FIX1, expected: mutated }
        description: repair deficient
        treatment: Fixparib
cell_types:
  - cell_type: CD8_T_Cells
    marker_genes: [TC1, TC2]
  - cell_type: Fibroblasts
    marker_genes: [FB1, FB2]
prognostic_signatures:
  - name: growth
    genes: [GROW1, GROW2]
    risk_direction: high
    weight: 1.0
"#;

/// Small self-contained knowledge set.
pub fn fixture_knowledge() -> ReferenceKnowledge {
    ReferenceKnowledge::from_yaml_str(FIXTURE_KNOWLEDGE_YAML)
        .unwrap_or_else(|e| panic!("fixture knowledge is invalid: {e}"))
}

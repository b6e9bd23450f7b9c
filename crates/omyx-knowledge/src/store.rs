//! The reference knowledge store.
//!
//! [`KnowledgeTables`] is the serialisable form (what YAML/JSON files hold);
//! [`ReferenceKnowledge`] wraps validated tables with gene-keyed indexes.
//! All lookups are exact, case-sensitive matches on gene symbols.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use omyx_common::{OmyxError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builtin;
use crate::types::{
    BiomarkerEntry, CancerTypeProfile, CellTypeSignature, DrugDatabaseEntry,
    PathwayDefinition, PrognosticSignature,
};

/// Raw reference tables, in the order the engine iterates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeTables {
    #[serde(default = "default_cancer_type")]
    pub default_cancer_type: String,
    #[serde(default)]
    pub pathways: Vec<PathwayDefinition>,
    #[serde(default)]
    pub biomarkers: Vec<BiomarkerEntry>,
    #[serde(default)]
    pub drug_database: Vec<DrugDatabaseEntry>,
    #[serde(default)]
    pub cancer_types: Vec<CancerTypeProfile>,
    #[serde(default)]
    pub cell_types: Vec<CellTypeSignature>,
    #[serde(default)]
    pub prognostic_signatures: Vec<PrognosticSignature>,
}

fn default_cancer_type() -> String { builtin::DEFAULT_CANCER_TYPE.to_string() }

/// Validated, indexed reference knowledge. Immutable after construction.
#[derive(Debug, Clone)]
pub struct ReferenceKnowledge {
    tables: KnowledgeTables,
    biomarker_index: HashMap<String, usize>,
    drug_index: HashMap<String, usize>,
    cancer_type_index: HashMap<String, usize>,
}

impl ReferenceKnowledge {
    /// Validate tables and build the lookup indexes.
    pub fn new(mut tables: KnowledgeTables) -> Result<Self> {
        // Subtypes carry the key of their owning cancer type.
        for ct in &mut tables.cancer_types {
            for st in &mut ct.subtypes {
                st.cancer_type = ct.key.clone();
            }
        }

        validate(&tables)?;

        let biomarker_index = index_by(&tables.biomarkers, |b| b.gene.as_str());
        let drug_index = index_by(&tables.drug_database, |d| d.gene.as_str());
        let cancer_type_index = index_by(&tables.cancer_types, |c| c.key.as_str());

        debug!(
            pathways = tables.pathways.len(),
            biomarkers = tables.biomarkers.len(),
            drugs = tables.drug_database.len(),
            cancer_types = tables.cancer_types.len(),
            cell_types = tables.cell_types.len(),
            signatures = tables.prognostic_signatures.len(),
            "reference knowledge indexed"
        );

        Ok(Self { tables, biomarker_index, drug_index, cancer_type_index })
    }

    /// The curated tables shipped with the engine.
    pub fn builtin() -> Self {
        // The built-in tables are covered by `test_builtin_is_valid`.
        Self::new(builtin::tables()).unwrap_or_else(|e| panic!("built-in knowledge is invalid: {e}"))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let tables: KnowledgeTables = serde_yaml::from_str(s)?;
        Self::new(tables)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let tables: KnowledgeTables = serde_json::from_str(s)?;
        Self::new(tables)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(OmyxError::Knowledge(format!(
                "unsupported knowledge file extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn tables(&self) -> &KnowledgeTables {
        &self.tables
    }

    pub fn pathways(&self) -> &[PathwayDefinition] {
        &self.tables.pathways
    }

    pub fn biomarkers(&self) -> &[BiomarkerEntry] {
        &self.tables.biomarkers
    }

    pub fn drug_database(&self) -> &[DrugDatabaseEntry] {
        &self.tables.drug_database
    }

    pub fn cancer_types(&self) -> &[CancerTypeProfile] {
        &self.tables.cancer_types
    }

    pub fn cell_types(&self) -> &[CellTypeSignature] {
        &self.tables.cell_types
    }

    pub fn prognostic_signatures(&self) -> &[PrognosticSignature] {
        &self.tables.prognostic_signatures
    }

    pub fn default_cancer_type(&self) -> &str {
        &self.tables.default_cancer_type
    }

    pub fn biomarker(&self, gene: &str) -> Option<&BiomarkerEntry> {
        self.biomarker_index.get(gene).map(|&i| &self.tables.biomarkers[i])
    }

    pub fn is_biomarker(&self, gene: &str) -> bool {
        self.biomarker_index.contains_key(gene)
    }

    pub fn drug_entry(&self, gene: &str) -> Option<&DrugDatabaseEntry> {
        self.drug_index.get(gene).map(|&i| &self.tables.drug_database[i])
    }

    pub fn cancer_type(&self, key: &str) -> Option<&CancerTypeProfile> {
        self.cancer_type_index.get(key).map(|&i| &self.tables.cancer_types[i])
    }

    /// Resolve a request label to a subtype profile set.
    ///
    /// Unrecognised labels fall back to the default cancer type. Returns the
    /// profile and whether the label itself was recognised.
    pub fn resolve_cancer_type(&self, label: &str) -> (&CancerTypeProfile, bool) {
        match self.cancer_type(label) {
            Some(ct) => (ct, true),
            None => {
                let fallback = self
                    .cancer_type(&self.tables.default_cancer_type)
                    .unwrap_or_else(|| &self.tables.cancer_types[0]);
                (fallback, false)
            }
        }
    }
}

impl Default for ReferenceKnowledge {
    fn default() -> Self {
        Self::builtin()
    }
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        index.entry(key(item).to_string()).or_insert(i);
    }
    index
}

fn ensure_unique<'a>(what: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for k in keys {
        if !seen.insert(k) {
            return Err(OmyxError::Knowledge(format!("duplicate {what} '{k}'")));
        }
    }
    Ok(())
}

fn validate(t: &KnowledgeTables) -> Result<()> {
    ensure_unique("biomarker gene", t.biomarkers.iter().map(|b| b.gene.as_str()))?;
    ensure_unique("drug database gene", t.drug_database.iter().map(|d| d.gene.as_str()))?;
    ensure_unique("cancer type", t.cancer_types.iter().map(|c| c.key.as_str()))?;
    ensure_unique("pathway", t.pathways.iter().map(|p| p.name.as_str()))?;
    ensure_unique("cell type", t.cell_types.iter().map(|c| c.cell_type.as_str()))?;

    if t.cancer_types.is_empty() {
        return Err(OmyxError::Knowledge("at least one cancer type is required".into()));
    }
    if !t.cancer_types.iter().any(|c| c.key == t.default_cancer_type) {
        return Err(OmyxError::Knowledge(format!(
            "default cancer type '{}' has no subtype profiles",
            t.default_cancer_type
        )));
    }
    for ct in &t.cancer_types {
        ensure_unique(
            &format!("subtype in '{}'", ct.key),
            ct.subtypes.iter().map(|s| s.subtype_name.as_str()),
        )?;
        for st in &ct.subtypes {
            ensure_unique(
                &format!("marker in '{}/{}'", ct.key, st.subtype_name),
                st.markers.iter().map(|m| m.gene.as_str()),
            )?;
        }
        if let Some(st) = ct.subtypes.iter().find(|s| s.markers.is_empty()) {
            return Err(OmyxError::Knowledge(format!(
                "subtype '{}' of '{}' has no markers",
                st.subtype_name, ct.key
            )));
        }
    }
    if let Some(p) = t.pathways.iter().find(|p| p.genes.is_empty()) {
        return Err(OmyxError::Knowledge(format!("pathway '{}' has no genes", p.name)));
    }
    if let Some(s) = t
        .prognostic_signatures
        .iter()
        .find(|s| !(s.weight.is_finite() && s.weight > 0.0))
    {
        return Err(OmyxError::Knowledge(format!(
            "signature '{}' has invalid weight {}",
            s.name, s.weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarkerState, RiskDirection};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_is_valid() {
        let kb = ReferenceKnowledge::new(builtin::tables()).unwrap();
        assert_eq!(kb.pathways().len(), 8);
        assert_eq!(kb.biomarkers().len(), 49);
        assert_eq!(kb.drug_database().len(), 21);
        assert_eq!(kb.cancer_types().len(), 10);
        assert_eq!(kb.cell_types().len(), 10);
        assert_eq!(kb.prognostic_signatures().len(), 4);
    }

    #[test]
    fn test_lookups_are_case_sensitive() {
        let kb = ReferenceKnowledge::builtin();
        assert!(kb.is_biomarker("TP53"));
        assert!(!kb.is_biomarker("tp53"));
        assert_eq!(kb.biomarker("ERBB2").unwrap().role, "Oncogene (HER2)");
        assert!(kb.drug_entry("PD-L1").is_some());
        assert!(kb.drug_entry("CD274").is_none());
        assert!(!kb.drug_entry("TP53").unwrap().fda_approved);
    }

    #[test]
    fn test_resolve_cancer_type_falls_back_to_breast() {
        let kb = ReferenceKnowledge::builtin();

        let (ct, recognised) = kb.resolve_cancer_type("glioma");
        assert!(recognised);
        assert_eq!(ct.display_name, "Glioma (Brain Cancer)");

        let (ct, recognised) = kb.resolve_cancer_type("Glioma");
        assert!(!recognised);
        assert_eq!(ct.key, "breast");
    }

    #[test]
    fn test_subtypes_know_their_cancer_type() {
        let kb = ReferenceKnowledge::builtin();
        let lung = kb.cancer_type("lung").unwrap();
        assert!(lung.subtypes.iter().all(|s| s.cancer_type == "lung"));
        assert_eq!(lung.subtypes[1].markers[0].expected, MarkerState::Rearranged);
    }

    #[test]
    fn test_yaml_fixture_roundtrip() {
        let yaml = r#"
default_cancer_type: toy
pathways:
  - name: Toy Pathway
    genes: [AAA, BBB]
biomarkers:
  - gene: AAA
    role: Oncogene
    drugs: [Toyinib]
cancer_types:
  - key: toy
    display_name: Toy Cancer
    subtypes:
      - subtype_name: Alpha
        markers:
          - { gene: AAA, expected: high }
        description: first
        treatment: rest
prognostic_signatures:
  - name: toy_sig
    genes: [AAA, BBB]
    risk_direction: low
    weight: 1.0
"#;
        let kb = ReferenceKnowledge::from_yaml_str(yaml).unwrap();
        assert_eq!(kb.default_cancer_type(), "toy");
        assert!(kb.is_biomarker("AAA"));
        assert!(kb.drug_database().is_empty());
        assert_eq!(kb.prognostic_signatures()[0].risk_direction, RiskDirection::Low);
        assert_eq!(kb.cancer_type("toy").unwrap().subtypes[0].cancer_type, "toy");
    }

    #[test]
    fn test_rejects_duplicate_biomarkers() {
        let mut tables = builtin::tables();
        let dup = tables.biomarkers[0].clone();
        tables.biomarkers.push(dup);
        let err = ReferenceKnowledge::new(tables).unwrap_err();
        assert!(err.to_string().contains("duplicate biomarker gene 'ERBB2'"));
    }

    #[test]
    fn test_rejects_duplicate_subtype_markers() {
        let mut tables = builtin::tables();
        let markers = &mut tables.cancer_types[0].subtypes[0].markers;
        let dup = markers[0].clone();
        markers.push(dup);
        let err = ReferenceKnowledge::new(tables).unwrap_err();
        assert!(matches!(err, OmyxError::Knowledge(_)));
        assert!(err.to_string().contains("duplicate marker in 'breast/Luminal A' 'ESR1'"));
    }

    #[test]
    fn test_rejects_missing_default_cancer_type() {
        let mut tables = builtin::tables();
        tables.default_cancer_type = "unicorn".to_string();
        assert!(matches!(ReferenceKnowledge::new(tables), Err(OmyxError::Knowledge(_))));
    }

    #[test]
    fn test_rejects_empty_pathway() {
        let mut tables = builtin::tables();
        tables.pathways[0].genes.clear();
        assert!(matches!(ReferenceKnowledge::new(tables), Err(OmyxError::Knowledge(_))));
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, serde_json::to_string(&builtin::tables()).unwrap()).unwrap();
        let kb = ReferenceKnowledge::load(&path).unwrap();
        assert_eq!(kb.tables(), ReferenceKnowledge::builtin().tables());

        let bad = dir.path().join("kb.txt");
        std::fs::write(&bad, "{}").unwrap();
        assert!(matches!(ReferenceKnowledge::load(&bad), Err(OmyxError::Knowledge(_))));
    }
}

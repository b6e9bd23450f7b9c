//! Built-in reference tables.
//!
//! Curated from public oncology resources (OncoKB-style tiers, TCGA subtype
//! papers, literature cell-type markers). Table order is significant: it is
//! the iteration and tie-break order used throughout the engine.

use crate::store::KnowledgeTables;
use crate::types::{
    BiomarkerEntry, CancerSubtypeProfile, CancerTypeProfile, CellTypeSignature,
    DrugDatabaseEntry, MarkerExpectation, MarkerState as M, PathwayDefinition,
    PrognosticSignature, RiskDirection,
};

pub const DEFAULT_CANCER_TYPE: &str = "breast";

// ── Pathways ────────────────────────────────────────────────────────────────

const PATHWAYS: &[(&str, &[&str], &[&str])] = &[
    ("PI3K-AKT", &["PIK3CA", "AKT1", "MTOR", "PTEN", "PIK3R1"], &["Alpelisib", "Everolimus"]),
    ("HER2/ERBB", &["ERBB2", "ERBB3", "EGFR", "GRB7"], &["Trastuzumab", "Pertuzumab", "T-DM1"]),
    ("Cell Cycle", &["CCND1", "CDK4", "CDK6", "RB1", "CDKN2A"], &["Palbociclib", "Ribociclib"]),
    ("p53 Pathway", &["TP53", "MDM2", "MDM4", "ATM", "CHEK2"], &[]),
    ("Estrogen Receptor", &["ESR1", "PGR", "FOXA1", "GATA3"], &["Tamoxifen", "Fulvestrant"]),
    ("DNA Repair", &["BRCA1", "BRCA2", "ATM", "PALB2", "RAD51"], &["Olaparib", "Talazoparib"]),
    ("Angiogenesis", &["VEGFA", "VEGFB", "HIF1A", "KDR"], &["Bevacizumab"]),
    ("MAPK", &["KRAS", "NRAS", "BRAF", "MAP2K1"], &["Trametinib", "Vemurafenib"]),
];

// ── Biomarker registry ──────────────────────────────────────────────────────

const BIOMARKERS: &[(&str, &str, &[&str])] = &[
    ("ERBB2", "Oncogene (HER2)", &["Trastuzumab", "Pertuzumab"]),
    ("ESR1", "Hormone receptor", &["Tamoxifen", "Fulvestrant"]),
    ("TP53", "Tumor suppressor", &[]),
    ("PIK3CA", "Oncogene", &["Alpelisib"]),
    ("BRCA1", "DNA repair", &["Olaparib", "Talazoparib"]),
    ("BRCA2", "DNA repair", &["Olaparib", "Talazoparib"]),
    ("PTEN", "Tumor suppressor", &[]),
    ("MKI67", "Proliferation marker", &[]),
    ("CDK4", "Cell cycle", &["Palbociclib"]),
    ("CDK6", "Cell cycle", &["Palbociclib"]),
    ("CCND1", "Cell cycle", &["Palbociclib"]),
    ("VEGFA", "Angiogenesis", &["Bevacizumab"]),
    ("EGFR", "Oncogene", &["Erlotinib", "Gefitinib"]),
    ("KRAS", "Oncogene", &["Sotorasib"]),
    ("BRAF", "Oncogene", &["Vemurafenib"]),
    ("GRB7", "HER2 co-amplified", &[]),
    ("FOXA1", "Transcription factor", &[]),
    ("GATA3", "Transcription factor", &[]),
    ("PGR", "Hormone receptor", &["Tamoxifen"]),
    ("ATM", "DNA damage response", &[]),
    ("PALB2", "DNA repair", &["Olaparib"]),
    ("AKT1", "Oncogene", &["Capivasertib"]),
    ("MTOR", "Cell growth", &["Everolimus"]),
    ("ALK", "Oncogene (fusion)", &["Alectinib", "Crizotinib", "Lorlatinib"]),
    ("ROS1", "Oncogene (fusion)", &["Crizotinib", "Entrectinib"]),
    ("RET", "Oncogene", &["Selpercatinib", "Pralsetinib"]),
    ("MET", "Oncogene", &["Capmatinib", "Tepotinib"]),
    ("NTRK1", "Oncogene (fusion)", &["Larotrectinib", "Entrectinib"]),
    ("CD274", "PD-L1", &["Pembrolizumab", "Nivolumab", "Atezolizumab"]),
    ("IDH1", "Metabolic enzyme", &["Ivosidenib", "Vorasidenib"]),
    ("IDH2", "Metabolic enzyme", &["Enasidenib"]),
    ("FGFR2", "Oncogene", &["Pemigatinib", "Erdafitinib"]),
    ("FGFR3", "Oncogene", &["Erdafitinib"]),
    ("AR", "Androgen receptor", &["Enzalutamide", "Abiraterone", "Darolutamide"]),
    ("NRAS", "Oncogene", &[]),
    ("GNAQ", "Oncogene (uveal)", &[]),
    ("GNA11", "Oncogene (uveal)", &[]),
    ("BAP1", "Tumor suppressor", &[]),
    ("ARID1A", "Tumor suppressor", &[]),
    ("MLH1", "DNA mismatch repair", &["Pembrolizumab"]),
    ("MSH2", "DNA mismatch repair", &["Pembrolizumab"]),
    ("SMAD4", "Tumor suppressor", &[]),
    ("CTNNB1", "WNT pathway", &[]),
    ("APC", "Tumor suppressor", &[]),
    ("RB1", "Tumor suppressor", &[]),
    ("CDH1", "E-cadherin", &[]),
    ("STK11", "Tumor suppressor", &[]),
    ("TERT", "Telomerase", &[]),
    ("ATRX", "Chromatin remodeling", &[]),
];

// ── Drug database (FDA-approved targeted therapies) ─────────────────────────

const DRUGS: &[(&str, &[&str], &str, bool, &str)] = &[
    ("ERBB2", &["Trastuzumab", "Pertuzumab", "T-DM1"], "HER2+ cancers", true, "1A"),
    ("EGFR", &["Osimertinib", "Erlotinib", "Gefitinib"], "EGFR-mutant NSCLC", true, "1A"),
    ("BRAF", &["Dabrafenib+Trametinib", "Encorafenib+Binimetinib"], "BRAF V600 mutant", true, "1A"),
    ("ALK", &["Alectinib", "Lorlatinib", "Brigatinib"], "ALK+ NSCLC", true, "1A"),
    ("BRCA1", &["Olaparib", "Rucaparib", "Niraparib"], "BRCA-mutant cancers", true, "1A"),
    ("BRCA2", &["Olaparib", "Rucaparib", "Niraparib"], "BRCA-mutant cancers", true, "1A"),
    ("PIK3CA", &["Alpelisib"], "PIK3CA-mutant HR+ breast", true, "1A"),
    ("KRAS", &["Sotorasib", "Adagrasib"], "KRAS G12C", true, "1A"),
    ("NTRK1", &["Larotrectinib", "Entrectinib"], "NTRK fusion+", true, "1A"),
    ("RET", &["Selpercatinib", "Pralsetinib"], "RET fusion+", true, "1A"),
    ("MET", &["Capmatinib", "Tepotinib"], "MET exon 14 skip", true, "1A"),
    ("ROS1", &["Crizotinib", "Entrectinib"], "ROS1+ NSCLC", true, "1A"),
    ("ESR1", &["Tamoxifen", "Fulvestrant", "Elacestrant"], "ER+ breast", true, "1A"),
    ("AR", &["Enzalutamide", "Abiraterone", "Darolutamide"], "AR+ prostate", true, "1A"),
    ("CDK4", &["Palbociclib", "Ribociclib", "Abemaciclib"], "HR+ breast", true, "1A"),
    ("CDK6", &["Palbociclib", "Ribociclib", "Abemaciclib"], "HR+ breast", true, "1A"),
    ("PD-L1", &["Pembrolizumab", "Nivolumab", "Atezolizumab"], "PD-L1+ tumors", true, "1A"),
    ("TP53", &["Clinical trials (APR-246)"], "TP53-mutant", false, "3"),
    ("AKT1", &["Capivasertib"], "AKT1-mutant", true, "1A"),
    ("FGFR2", &["Pemigatinib", "Futibatinib"], "FGFR2 fusion", true, "1A"),
    ("FGFR3", &["Erdafitinib"], "FGFR3-mutant bladder", true, "1A"),
];

// ── Cancer subtype profiles ─────────────────────────────────────────────────

struct SubtypeDef {
    name: &'static str,
    markers: &'static [(&'static str, M)],
    description: &'static str,
    treatment: &'static str,
}

const fn subtype(
    name: &'static str,
    markers: &'static [(&'static str, M)],
    description: &'static str,
    treatment: &'static str,
) -> SubtypeDef {
    SubtypeDef { name, markers, description, treatment }
}

const CANCER_TYPES: &[(&str, &str, &[SubtypeDef])] = &[
    ("breast", "Breast Cancer", &[
        subtype("Luminal A",
            &[("ESR1", M::High), ("PGR", M::High), ("ERBB2", M::Low), ("MKI67", M::Low)],
            "Hormone receptor positive, slow-growing, best prognosis",
            "Endocrine therapy (Tamoxifen, Aromatase inhibitors)"),
        subtype("Luminal B",
            &[("ESR1", M::High), ("PGR", M::Variable), ("ERBB2", M::Variable), ("MKI67", M::High)],
            "Hormone receptor positive but more aggressive, may need chemo",
            "Endocrine therapy + chemotherapy"),
        subtype("HER2-enriched",
            &[("ESR1", M::Low), ("PGR", M::Low), ("ERBB2", M::High), ("MKI67", M::High)],
            "HER2-driven, aggressive but responds well to targeted therapy",
            "Trastuzumab, Pertuzumab, T-DM1"),
        subtype("Basal-like",
            &[("ESR1", M::Low), ("PGR", M::Low), ("ERBB2", M::Low), ("MKI67", M::High)],
            "Triple-negative, most aggressive, limited targeted options",
            "Chemotherapy, PARP inhibitors if BRCA mutated"),
    ]),
    ("lung", "Lung Cancer (NSCLC)", &[
        subtype("EGFR-mutant",
            &[("EGFR", M::Mutated), ("ALK", M::Normal), ("KRAS", M::Normal)],
            "EGFR-driven, common in non-smokers and Asian populations",
            "Osimertinib, Erlotinib, Gefitinib"),
        subtype("ALK-rearranged",
            &[("ALK", M::Rearranged), ("EGFR", M::Normal), ("KRAS", M::Normal)],
            "ALK fusion positive, excellent response to ALK inhibitors",
            "Alectinib, Crizotinib, Lorlatinib"),
        subtype("KRAS-mutant",
            &[("KRAS", M::Mutated), ("EGFR", M::Normal), ("STK11", M::Variable)],
            "KRAS-driven, historically undruggable but new options emerging",
            "Sotorasib (G12C), Adagrasib"),
        subtype("PD-L1 high",
            &[("CD274", M::High), ("EGFR", M::Normal), ("ALK", M::Normal)],
            "High PD-L1 expression, responds to immunotherapy",
            "Pembrolizumab, Nivolumab, Atezolizumab"),
        subtype("SCLC",
            &[("RB1", M::Low), ("TP53", M::Mutated), ("ASCL1", M::High)],
            "Small cell lung cancer, aggressive neuroendocrine tumor",
            "Platinum-etoposide + immunotherapy"),
    ]),
    ("colorectal", "Colorectal Cancer", &[
        subtype("CMS1 (MSI-H)",
            &[("MLH1", M::Low), ("MSH2", M::Variable), ("BRAF", M::Mutated)],
            "Microsatellite unstable, high immune infiltration, good prognosis",
            "Pembrolizumab, Nivolumab (immunotherapy)"),
        subtype("CMS2 (Canonical)",
            &[("APC", M::Mutated), ("TP53", M::Mutated), ("KRAS", M::Normal)],
            "WNT/MYC activated, chromosomally unstable, most common",
            "FOLFOX, FOLFIRI, Cetuximab if RAS wild-type"),
        subtype("CMS3 (Metabolic)",
            &[("KRAS", M::Mutated), ("PIK3CA", M::Variable)],
            "Metabolic dysregulation, mixed features",
            "FOLFOX, FOLFIRI"),
        subtype("CMS4 (Mesenchymal)",
            &[("TGFB1", M::High), ("NOTCH1", M::Variable)],
            "Stromal infiltration, EMT activated, worst prognosis",
            "FOLFOXIRI, clinical trials"),
    ]),
    ("prostate", "Prostate Cancer", &[
        subtype("Luminal A",
            &[("AR", M::High), ("FOXA1", M::High), ("SPINK1", M::Low)],
            "Androgen-driven, well-differentiated, good prognosis",
            "Active surveillance or ADT"),
        subtype("Luminal B",
            &[("AR", M::High), ("FOXA1", M::High), ("MKI67", M::High)],
            "Androgen-driven but more proliferative",
            "ADT + Abiraterone or Enzalutamide"),
        subtype("ERG-fusion",
            &[("ERG", M::High), ("TMPRSS2", M::Rearranged)],
            "TMPRSS2-ERG fusion, most common genomic alteration",
            "ADT, PARP inhibitors if HRD"),
        subtype("BRCA-mutant",
            &[("BRCA2", M::Mutated), ("BRCA1", M::Variable), ("ATM", M::Variable)],
            "DNA repair deficient, sensitive to PARP inhibitors",
            "Olaparib, Rucaparib"),
        subtype("Neuroendocrine",
            &[("AR", M::Low), ("SYP", M::High), ("CHGA", M::High), ("RB1", M::Low)],
            "AR-independent, aggressive, poor prognosis",
            "Platinum-based chemotherapy"),
    ]),
    ("ovarian", "Ovarian Cancer", &[
        subtype("High-grade Serous",
            &[("TP53", M::Mutated), ("BRCA1", M::Variable), ("BRCA2", M::Variable)],
            "Most common type, often BRCA-associated",
            "Platinum + PARP inhibitors"),
        subtype("Endometrioid",
            &[("CTNNB1", M::Mutated), ("PIK3CA", M::Variable), ("ARID1A", M::Variable)],
            "Often associated with endometriosis",
            "Platinum-based chemotherapy"),
        subtype("Clear Cell",
            &[("ARID1A", M::Mutated), ("PIK3CA", M::Mutated), ("HNF1B", M::High)],
            "Chemoresistant, associated with endometriosis",
            "Platinum, immunotherapy trials"),
        subtype("Mucinous",
            &[("KRAS", M::Mutated), ("ERBB2", M::Variable)],
            "Rare, behaves like GI tumors",
            "GI-type chemotherapy regimens"),
    ]),
    ("melanoma", "Melanoma", &[
        subtype("BRAF-mutant",
            &[("BRAF", M::Mutated), ("NRAS", M::Normal)],
            "BRAF V600E/K mutation, ~50% of melanomas",
            "Dabrafenib + Trametinib, Vemurafenib + Cobimetinib"),
        subtype("NRAS-mutant",
            &[("NRAS", M::Mutated), ("BRAF", M::Normal)],
            "NRAS-driven, limited targeted options",
            "Immunotherapy (Pembrolizumab, Nivolumab)"),
        subtype("Triple Wild-type",
            &[("BRAF", M::Normal), ("NRAS", M::Normal), ("KIT", M::Normal)],
            "No common driver mutations",
            "Immunotherapy"),
        subtype("KIT-mutant",
            &[("KIT", M::Mutated), ("BRAF", M::Normal)],
            "Common in acral and mucosal melanoma",
            "Imatinib, Nilotinib"),
        subtype("Uveal",
            &[("GNAQ", M::Mutated), ("GNA11", M::Mutated), ("BAP1", M::Variable)],
            "Eye melanoma, distinct biology",
            "Tebentafusp, clinical trials"),
    ]),
    ("glioma", "Glioma (Brain Cancer)", &[
        subtype("IDH-mutant Astrocytoma",
            &[("IDH1", M::Mutated), ("ATRX", M::Mutated), ("TP53", M::Mutated)],
            "Better prognosis, younger patients",
            "Temozolomide, Vorasidenib (IDH inhibitor)"),
        subtype("IDH-mutant Oligodendroglioma",
            &[("IDH1", M::Mutated), ("TERT", M::Mutated)],
            "1p/19q co-deleted, best prognosis among gliomas",
            "PCV chemotherapy, Temozolomide"),
        subtype("IDH-wildtype Glioblastoma",
            &[("IDH1", M::Normal), ("EGFR", M::Amplified), ("TERT", M::Mutated), ("PTEN", M::Deleted)],
            "Most aggressive, poor prognosis",
            "Temozolomide + radiation, Bevacizumab"),
        subtype("H3K27M-mutant",
            &[("H3F3A", M::Mutated)],
            "Diffuse midline glioma, pediatric/young adult",
            "ONC201, clinical trials"),
    ]),
    ("pancreatic", "Pancreatic Cancer", &[
        subtype("Classical",
            &[("GATA6", M::High), ("KRAS", M::Mutated), ("SMAD4", M::Variable)],
            "Better differentiated, slightly better prognosis",
            "FOLFIRINOX, Gemcitabine + nab-Paclitaxel"),
        subtype("Basal-like",
            &[("GATA6", M::Low), ("KRT5", M::High), ("TP63", M::High)],
            "Squamous features, worst prognosis",
            "FOLFIRINOX, clinical trials"),
        subtype("BRCA-mutant",
            &[("BRCA1", M::Mutated), ("BRCA2", M::Mutated)],
            "DNA repair deficient, ~5-7% of cases",
            "Platinum-based therapy, Olaparib maintenance"),
    ]),
    ("liver", "Hepatocellular Carcinoma (HCC)", &[
        subtype("Proliferative",
            &[("AFP", M::High), ("MKI67", M::High), ("TP53", M::Mutated)],
            "Aggressive, AFP-elevated, poor prognosis",
            "Atezolizumab + Bevacizumab, Sorafenib"),
        subtype("Non-proliferative",
            &[("CTNNB1", M::Mutated), ("AFP", M::Normal)],
            "WNT-activated, less aggressive",
            "Atezolizumab + Bevacizumab, Lenvatinib"),
        subtype("Immune-active",
            &[("CD274", M::High), ("IFNG", M::High)],
            "High immune infiltration, responds to immunotherapy",
            "Pembrolizumab, Nivolumab"),
    ]),
    ("gastric", "Gastric Cancer", &[
        subtype("EBV-positive",
            &[("PIK3CA", M::Mutated), ("CD274", M::High)],
            "Epstein-Barr virus associated, high PD-L1",
            "Immunotherapy + chemotherapy"),
        subtype("MSI-high",
            &[("MLH1", M::Low)],
            "Microsatellite unstable, good immunotherapy response",
            "Pembrolizumab"),
        subtype("HER2-positive",
            &[("ERBB2", M::Amplified)],
            "HER2 amplified, ~15-20% of cases",
            "Trastuzumab + chemotherapy"),
        subtype("Diffuse",
            &[("CDH1", M::Mutated), ("RHOA", M::Variable)],
            "Loss of E-cadherin, poor prognosis",
            "FLOT chemotherapy"),
    ]),
];

// ── Cell-type marker signatures ─────────────────────────────────────────────

const CELL_TYPES: &[(&str, &[&str])] = &[
    ("Tumor_Epithelial", &["EPCAM", "KRT8", "KRT18", "KRT19", "MUC1", "CDH1", "CLDN4", "CLDN7"]),
    ("CD8_T_Cells", &["CD8A", "CD8B", "GZMA", "GZMB", "PRF1", "IFNG", "CXCR3", "CCL5"]),
    ("CD4_T_Cells", &["CD4", "IL7R", "CCR7", "LEF1", "TCF7", "SELL", "CD40LG"]),
    ("Tregs", &["FOXP3", "IL2RA", "CTLA4", "IKZF2", "CCR8", "TNFRSF18"]),
    ("B_Cells", &["CD19", "CD79A", "CD79B", "MS4A1", "PAX5", "BANK1", "BLK"]),
    ("NK_Cells", &["NCAM1", "NKG7", "KLRD1", "KLRF1", "GNLY", "FCGR3A", "NCR1"]),
    ("Macrophages", &["CD68", "CD163", "CSF1R", "MARCO", "MSR1", "MRC1", "CD14"]),
    ("Dendritic_Cells", &["ITGAX", "CD1C", "CLEC9A", "FLT3", "BATF3", "IRF8"]),
    ("Fibroblasts", &["FAP", "PDGFRA", "PDGFRB", "COL1A1", "COL1A2", "ACTA2", "THY1"]),
    ("Endothelial", &["PECAM1", "VWF", "CDH5", "ENG", "KDR", "FLT1", "MCAM"]),
];

// ── Prognostic signatures ───────────────────────────────────────────────────

const PROGNOSTIC: &[(&str, &[&str], RiskDirection, f64)] = &[
    ("proliferation", &["MKI67", "PCNA", "TOP2A", "MCM2", "CCNB1", "AURKA"], RiskDirection::High, 2.0),
    ("immune", &["CD8A", "CD8B", "GZMA", "GZMB", "PRF1", "IFNG"], RiskDirection::Low, 1.5),
    ("stemness", &["SOX2", "NANOG", "ALDH1A1", "CD44", "PROM1"], RiskDirection::High, 1.8),
    ("invasion", &["MMP2", "MMP9", "TWIST1", "SNAI1", "VIM"], RiskDirection::High, 1.5),
];

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

/// Materialise the built-in tables.
pub fn tables() -> KnowledgeTables {
    KnowledgeTables {
        default_cancer_type: DEFAULT_CANCER_TYPE.to_string(),
        pathways: PATHWAYS
            .iter()
            .map(|(name, genes, drugs)| PathwayDefinition {
                name: name.to_string(),
                genes: strings(genes),
                drugs: strings(drugs),
            })
            .collect(),
        biomarkers: BIOMARKERS
            .iter()
            .map(|(gene, role, drugs)| BiomarkerEntry {
                gene: gene.to_string(),
                role: role.to_string(),
                drugs: strings(drugs),
            })
            .collect(),
        drug_database: DRUGS
            .iter()
            .map(|(gene, drugs, indication, fda, tier)| DrugDatabaseEntry {
                gene: gene.to_string(),
                drugs: strings(drugs),
                indication: indication.to_string(),
                fda_approved: *fda,
                evidence_tier: tier.to_string(),
            })
            .collect(),
        cancer_types: CANCER_TYPES
            .iter()
            .map(|(key, display, subtypes)| CancerTypeProfile {
                key: key.to_string(),
                display_name: display.to_string(),
                subtypes: subtypes
                    .iter()
                    .map(|s| CancerSubtypeProfile {
                        cancer_type: key.to_string(),
                        subtype_name: s.name.to_string(),
                        markers: s
                            .markers
                            .iter()
                            .map(|(gene, expected)| MarkerExpectation {
                                gene: gene.to_string(),
                                expected: *expected,
                            })
                            .collect(),
                        description: s.description.to_string(),
                        treatment: s.treatment.to_string(),
                    })
                    .collect(),
            })
            .collect(),
        cell_types: CELL_TYPES
            .iter()
            .map(|(cell_type, markers)| CellTypeSignature {
                cell_type: cell_type.to_string(),
                marker_genes: strings(markers),
            })
            .collect(),
        prognostic_signatures: PROGNOSTIC
            .iter()
            .map(|(name, genes, direction, weight)| PrognosticSignature {
                name: name.to_string(),
                genes: strings(genes),
                risk_direction: *direction,
                weight: *weight,
            })
            .collect(),
    }
}

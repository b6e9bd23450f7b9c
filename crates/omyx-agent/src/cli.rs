//! Command-line surface of the `omyx` binary.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use omyx_common::LayerType;

#[derive(Debug, Parser)]
#[command(name = "omyx", version, about = "Deterministic multi-omics scoring engine")]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to $OMYX_CONFIG, then omyx.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score one cohort and write the report as JSON.
    Analyze(AnalyzeArgs),
    /// Validate reference knowledge and print its table sizes.
    Knowledge(KnowledgeArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Cancer type label; the configured default when omitted.
    #[arg(long)]
    pub cancer_type: Option<String>,

    /// Layer matrix as TYPE=PATH or PATH (repeatable).
    #[arg(long = "layer", required = true)]
    pub layers: Vec<LayerArg>,

    /// Reference knowledge file (YAML or JSON).
    #[arg(long)]
    pub knowledge: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Emit only the summary counts.
    #[arg(long, default_value_t = false)]
    pub summary_only: bool,

    /// Worker threads (0 = one per core).
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Debug, Args)]
pub struct KnowledgeArgs {
    #[arg(long)]
    pub knowledge: Option<PathBuf>,
}

/// One `--layer` value.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerArg {
    pub layer_type: Option<LayerType>,
    pub path: PathBuf,
}

impl FromStr for LayerArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A '=' only splits when the prefix is a layer label, so paths
        // containing '=' still work.
        if let Some((label, path)) = s.split_once('=') {
            if let Ok(layer_type) = LayerType::parse(label) {
                if path.is_empty() {
                    return Err(format!("missing path after '{label}='"));
                }
                return Ok(Self {
                    layer_type: Some(layer_type),
                    path: PathBuf::from(path),
                });
            }
        }
        if s.is_empty() {
            return Err("empty layer path".to_string());
        }
        Ok(Self {
            layer_type: None,
            path: PathBuf::from(s),
        })
    }
}

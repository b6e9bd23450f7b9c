//! omyx: deterministic multi-omics scoring.
//! Entry point for the command-line binary.

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use omyx_config::EngineConfig;
use omyx_engine::{AnalysisInput, JsonFileLayerSource, ScoringEngine};
use omyx_knowledge::ReferenceKnowledge;

use crate::cli::{AnalyzeArgs, Cli, Commands, KnowledgeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("omyx=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::load().context("failed to load configuration")?,
    };

    match cli.command {
        Commands::Analyze(args) => analyze(args, config).await,
        Commands::Knowledge(args) => knowledge(args, &config),
    }
}

fn load_knowledge(path: Option<&Path>) -> anyhow::Result<ReferenceKnowledge> {
    match path {
        Some(path) => {
            let kb = ReferenceKnowledge::load(path)
                .with_context(|| format!("failed to load reference knowledge {}", path.display()))?;
            info!(path = %path.display(), "Reference knowledge loaded");
            Ok(kb)
        }
        None => Ok(ReferenceKnowledge::builtin()),
    }
}

async fn analyze(args: AnalyzeArgs, config: EngineConfig) -> anyhow::Result<()> {
    let knowledge_path = args.knowledge.or(config.engine.knowledge_path);
    let kb = load_knowledge(knowledge_path.as_deref())?;

    let cancer_type = args
        .cancer_type
        .unwrap_or_else(|| config.analysis.default_cancer_type.clone());
    let workers = args.threads.unwrap_or(config.engine.worker_threads);
    let summary_only = args.summary_only || config.output.summary_only;
    let pretty = config.output.pretty;
    let output = args.output.or(config.output.path);

    let source = args
        .layers
        .iter()
        .fold(JsonFileLayerSource::new(), |source, layer| {
            source.with_file(&layer.path, layer.layer_type)
        });
    info!(cancer_type = %cancer_type, files = source.len(), workers, "Running analysis");

    // The engine is CPU-bound; keep it off the async workers.
    let run = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let input = AnalysisInput::from_source(cancer_type, &source)
            .context("failed to read layer matrices")?;
        let engine = ScoringEngine::with_workers(&kb, workers)?;
        let report = engine.analyze(&input)?;

        let json = if summary_only {
            if pretty {
                serde_json::to_string_pretty(report.summary())?
            } else {
                serde_json::to_string(report.summary())?
            }
        } else {
            report.to_json(pretty)?
        };
        Ok(json)
    });

    let json = match config.analysis.timeout() {
        Some(deadline) => match tokio::time::timeout(deadline, run).await {
            Ok(joined) => joined.context("analysis task panicked")??,
            Err(_) => {
                warn!(timeout_secs = deadline.as_secs(), "Analysis exceeded its deadline; result discarded");
                bail!("analysis timed out after {}s", deadline.as_secs());
            }
        },
        None => run.await.context("analysis task panicked")??,
    };

    write_output(output.as_deref(), &json)
}

fn write_output(path: Option<&Path>, json: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write report {}", path.display()))?;
            info!(path = %path.display(), bytes = json.len(), "Report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn knowledge(args: KnowledgeArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let path: Option<PathBuf> = args.knowledge.or_else(|| config.engine.knowledge_path.clone());
    let kb = load_knowledge(path.as_deref())?;

    let subtypes: usize = kb.cancer_types().iter().map(|c| c.subtypes.len()).sum();
    println!("pathways:              {}", kb.pathways().len());
    println!("biomarkers:            {}", kb.biomarkers().len());
    println!("drug database:         {}", kb.drug_database().len());
    println!("cancer types:          {} ({} subtypes)", kb.cancer_types().len(), subtypes);
    println!("cell types:            {}", kb.cell_types().len());
    println!("prognostic signatures: {}", kb.prognostic_signatures().len());
    println!("default cancer type:   {}", kb.default_cancer_type());
    Ok(())
}

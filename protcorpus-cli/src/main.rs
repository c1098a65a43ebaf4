use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(
    name = "protcorpus",
    about = "Build protein-mention literature corpora from PubMed, PMC, PubTator, and UniProtKB",
    long_about = "Retrieves abstracts, full texts, gene annotations, and protein aliases \
                  for a search topic into per-query output directories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for NCBI E-utilities (increases rate limit)
    #[arg(long, env = "NCBI_API_KEY", global = true)]
    api_key: Option<String>,

    /// Email for NCBI requests (recommended)
    #[arg(long, env = "NCBI_EMAIL", global = true)]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, env = "NCBI_TOOL", default_value = "protcorpus", global = true)]
    tool: String,

    /// Root directory for query output (default: ./queries)
    #[arg(long, global = true)]
    query_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PubMed and retrieve abstracts, full texts, and annotations
    Search(commands::search::Search),
    /// Retrieve UniProtKB entries or aliases for an accession list
    Proteins(commands::proteins::Proteins),
    /// Extract alias lines from a stored UniProtKB XML file
    #[command(name = "xml-to-aliases")]
    XmlToAliases(commands::aliases::XmlToAliases),
    /// Export a PMID to body-text JSON map from a query directory
    #[command(name = "extract-fulltext-json")]
    ExtractFulltextJson(commands::fulltext::ExtractFulltextJson),
    /// Merge alias lines whose accessions share a UniRef cluster
    #[command(name = "combine-uniref")]
    CombineUniref(commands::uniref::CombineUniref),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with indicatif layer for progress bars
    let filter = if cli.verbose { "debug" } else { "info" };

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let settings = commands::Settings {
        api_key: cli.api_key.clone(),
        email: cli.email.clone(),
        tool: cli.tool.clone(),
        query_root: cli.query_root.clone(),
    };

    match &cli.command {
        Commands::Search(cmd) => cmd.execute(&settings).await,
        Commands::Proteins(cmd) => cmd.execute(&settings).await,
        Commands::XmlToAliases(cmd) => cmd.execute(),
        Commands::ExtractFulltextJson(cmd) => cmd.execute(),
        Commands::CombineUniref(cmd) => cmd.execute(),
    }
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use protcorpus::pipeline::{run_protein_query, ProteinMode};

use super::{build_config, read_lines, Settings};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    /// Merged entry XML plus a per-entry summary
    Entries,
    /// Merged entry XML plus the alias file
    Aliases,
}

#[derive(Args, Debug)]
pub struct Proteins {
    /// UniProtKB accession; repeat for multiple proteins
    #[arg(short, long, conflicts_with = "accession_file")]
    pub accession: Vec<String>,

    /// File with one accession per line
    #[arg(long)]
    pub accession_file: Option<PathBuf>,

    /// What to write besides the merged entry XML
    #[arg(long, value_enum, default_value = "aliases")]
    pub mode: Mode,
}

impl Proteins {
    pub async fn execute(&self, settings: &Settings) -> Result<()> {
        let accessions = match &self.accession_file {
            Some(path) => read_lines(path)?,
            None => self.accession.clone(),
        };
        if accessions.is_empty() {
            bail!("no accessions provided; use --accession or --accession-file");
        }

        tracing::info!(count = accessions.len(), "Starting protein query");

        let mode = match self.mode {
            Mode::Entries => ProteinMode::Entries,
            Mode::Aliases => ProteinMode::Aliases,
        };
        let config = build_config(settings);
        let report = run_protein_query(&config, &accessions, mode).await?;

        let mut stdout = std::io::stdout();
        writeln!(stdout, "Output directory: {}", report.query_dir.display())?;
        writeln!(stdout, "Entries decoded:  {}", report.entry_count)?;
        if matches!(mode, ProteinMode::Aliases) {
            writeln!(stdout, "Alias lines:      {}", report.alias_count)?;
        }
        if !report.complete {
            writeln!(stdout, "Warning: the entry download was truncated by a failed batch")?;
            std::process::exit(1);
        }
        Ok(())
    }
}

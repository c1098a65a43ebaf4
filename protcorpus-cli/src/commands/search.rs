use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use protcorpus::pipeline::{AutoConfirm, Pipeline, PipelineOptions, Stage};
use protcorpus::query::Query;

use super::{build_config, read_lines, Settings, StdinConfirm};

#[derive(Args, Debug)]
pub struct Search {
    /// Search term; repeat to combine terms with OR
    #[arg(short, long, conflicts_with = "query_file")]
    pub query: Vec<String>,

    /// File with one search term per line, combined with OR
    #[arg(long)]
    pub query_file: Option<PathBuf>,

    /// Run all stages without confirmation prompts
    #[arg(long)]
    pub auto: bool,

    /// Also write the PubMed-style conversion of the full-text set
    #[arg(long)]
    pub convert: bool,

    /// Also write the PMID to body-text JSON export
    #[arg(long)]
    pub fulltext_json: bool,
}

impl Search {
    pub async fn execute(&self, settings: &Settings) -> Result<()> {
        let terms = match &self.query_file {
            Some(path) => read_lines(path)?,
            None => self.query.clone(),
        };
        if terms.is_empty() {
            bail!("no query provided; use --query or --query-file");
        }
        let query = Query::from_terms(&terms)?;

        tracing::info!(term = %query.term(), "Starting literature query");

        let options = PipelineOptions {
            convert_fulltexts: self.convert,
            export_fulltext_json: self.fulltext_json,
        };
        let pipeline = Pipeline::new(build_config(settings), options);

        let report = if self.auto {
            pipeline.run(&query, &mut AutoConfirm).await?
        } else {
            let mut confirmer = StdinConfirm;
            pipeline.run(&query, &mut confirmer).await?
        };

        let mut stdout = std::io::stdout();
        writeln!(stdout, "Output directory: {}", report.query_dir.display())?;
        writeln!(stdout, "PMIDs retrieved:  {}", report.pmid_count)?;
        writeln!(stdout, "Records written:  {}", report.record_count)?;
        if let Some(stats) = &report.fulltext_stats {
            writeln!(
                stdout,
                "Full texts:       {} of {} articles carry body text",
                stats.with_body, stats.articles
            )?;
        }
        if !report.search_complete {
            writeln!(stdout, "Warning: the PMID collection was truncated by a failed page")?;
        }

        if report.stage != Stage::Complete {
            writeln!(stdout, "Stopped while {}", report.stage)?;
            std::process::exit(1);
        }
        Ok(())
    }
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use protcorpus::process::extract_full_text_json;
use protcorpus::query::QueryDir;

#[derive(Args, Debug)]
pub struct ExtractFulltextJson {
    /// Query directory holding a merged pmc_fulltexts.xml
    pub query_dir: PathBuf,
}

impl ExtractFulltextJson {
    pub fn execute(&self) -> Result<()> {
        let dir = QueryDir::open(&self.query_dir)?;
        let path = extract_full_text_json(&dir)?;

        let mut stdout = std::io::stdout();
        writeln!(stdout, "Output file:      {}", path.display())?;
        Ok(())
    }
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use protcorpus::process::combine_aliases_by_uniref;

#[derive(Args, Debug)]
pub struct CombineUniref {
    /// Alias file with one pipe-delimited line per protein
    pub aliases: PathBuf,

    /// Tab-delimited UniRef mapping: header line, then accession and
    /// cluster ID columns
    pub mapping: PathBuf,

    /// Combined alias file to write (default: combined_aliases.txt next
    /// to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CombineUniref {
    pub fn execute(&self) -> Result<()> {
        let output = self.output.clone().unwrap_or_else(|| {
            self.aliases
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."))
                .join("combined_aliases.txt")
        });

        let written = combine_aliases_by_uniref(&self.aliases, &self.mapping, &output)?;

        let mut stdout = std::io::stdout();
        writeln!(stdout, "Clusters written: {}", written)?;
        writeln!(stdout, "Output file:      {}", output.display())?;
        Ok(())
    }
}

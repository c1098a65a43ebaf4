use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use protcorpus::process::convert_entry_xml_file;

#[derive(Args, Debug)]
pub struct XmlToAliases {
    /// UniProtKB entry XML file to read
    pub input: PathBuf,

    /// Alias file to write (default: aliases.txt next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl XmlToAliases {
    pub fn execute(&self) -> Result<()> {
        let output = self.output.clone().unwrap_or_else(|| {
            self.input
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."))
                .join("aliases.txt")
        });

        let written = convert_entry_xml_file(&self.input, &output)?;

        let mut stdout = std::io::stdout();
        writeln!(stdout, "Aliases written:  {}", written)?;
        writeln!(stdout, "Output file:      {}", output.display())?;
        Ok(())
    }
}

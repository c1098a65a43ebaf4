pub mod aliases;
pub mod fulltext;
pub mod proteins;
pub mod search;
pub mod uniref;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use protcorpus::pipeline::Confirmer;
use protcorpus::ClientConfig;

/// Global options shared by the networked commands
pub struct Settings {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub tool: String,
    pub query_root: Option<PathBuf>,
}

pub fn build_config(settings: &Settings) -> ClientConfig {
    let mut config = ClientConfig::new().with_tool(&settings.tool);

    if let Some(key) = &settings.api_key {
        config = config.with_api_key(key);
    }
    if let Some(email) = &settings.email {
        config = config.with_email(email);
    }
    if let Some(root) = &settings.query_root {
        config = config.with_query_root(root);
    }

    config
}

/// Prompts on stdout and reads a Y/N answer from stdin; anything but an
/// explicit yes declines
pub struct StdinConfirm;

impl Confirmer for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let mut stdout = io::stdout();
        if write!(stdout, "{} [y/N] ", prompt).and_then(|_| stdout.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
    }
}

/// Read non-empty lines from a text file
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

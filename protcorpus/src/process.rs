//! Offline processing of previously retrieved artifacts
//!
//! These operations run against files already on disk and never touch the
//! network: the PMID-to-body-text JSON export, alias extraction from a
//! stored UniProtKB XML file, and merging alias lines whose accessions
//! belong to the same UniRef cluster.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use crate::error::{CorpusError, Result};
use crate::pmc::scan_articles;
use crate::query::QueryDir;
use crate::uniprot::{parse_entry_set, AliasSet};

/// Export a PMID → body-text JSON map from a query's merged article set
///
/// Only articles carrying a `<body>` and a PMID are exported; articles
/// without a PMID in their front matter are logged and skipped. Returns
/// the path of the written JSON file.
#[instrument(skip(dir), fields(dir = %dir.path().display()))]
pub fn extract_full_text_json(dir: &QueryDir) -> Result<PathBuf> {
    let xml = fs::read_to_string(dir.fulltexts_path())?;
    let digests = scan_articles(&xml)?;

    let mut map = Map::new();
    let mut skipped = 0usize;
    for digest in &digests {
        if !digest.has_body {
            continue;
        }
        match &digest.pmid {
            Some(pmid) => {
                map.insert(pmid.clone(), Value::String(digest.body_text.clone()));
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped = skipped, "Articles with body text but no PMID skipped");
    }

    let path = dir.fulltext_json_path();
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, &Value::Object(map))?;
    info!(
        exported = digests.iter().filter(|d| d.has_body).count() - skipped,
        path = %path.display(),
        "Full-text JSON export written"
    );
    Ok(path)
}

/// Extract alias lines from UniProtKB entry XML
///
/// Entries whose alias set comes out empty are dropped.
pub fn aliases_from_entry_xml(xml: &str) -> Result<Vec<String>> {
    let set = parse_entry_set(xml)?;
    Ok(set
        .entries
        .iter()
        .map(AliasSet::from_entry)
        .filter(|aliases| !aliases.is_empty())
        .map(|aliases| aliases.to_line())
        .collect())
}

/// Convert a stored UniProtKB XML file to an alias file, one line per
/// protein, without downloading anything. Returns the number of alias
/// lines written.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn convert_entry_xml_file(input: &Path, output: &Path) -> Result<usize> {
    let xml = fs::read_to_string(input)?;
    let lines = aliases_from_entry_xml(&xml)?;
    write_lines(output, &lines)?;
    info!(proteins = lines.len(), output = %output.display(), "Alias file written");
    Ok(lines.len())
}

/// Merge alias lines whose accessions map to the same UniRef cluster
///
/// The mapping file is tab-delimited with a header line: accession in the
/// first column, cluster ID in the second. Alias lines are grouped by the
/// cluster of their leading accession; lines with no mapping stay as
/// their own group. Within a group, aliases are concatenated in line
/// order and deduplicated first-seen. Returns the number of merged lines
/// written.
#[instrument(skip_all, fields(aliases = %alias_file.display(), mapping = %mapping_file.display()))]
pub fn combine_aliases_by_uniref(
    alias_file: &Path,
    mapping_file: &Path,
    output: &Path,
) -> Result<usize> {
    let mapping = read_uniref_mapping(mapping_file)?;

    let alias_text = fs::read_to_string(alias_file)?;
    // Group key to merged alias list, insertion-ordered
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in alias_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let accession = line.split('|').next().unwrap_or(line);
        let key = mapping
            .get(&accession.to_uppercase())
            .cloned()
            .unwrap_or_else(|| accession.to_string());

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        for alias in line.split('|') {
            if !alias.is_empty() && !groups[slot].1.iter().any(|a| a == alias) {
                groups[slot].1.push(alias.to_string());
            }
        }
    }

    let lines: Vec<String> = groups
        .into_iter()
        .map(|(_, aliases)| aliases.join("|"))
        .collect();
    write_lines(output, &lines)?;
    info!(clusters = lines.len(), output = %output.display(), "Combined alias file written");
    Ok(lines.len())
}

/// Read an accession → UniRef cluster mapping from a tab-delimited file
fn read_uniref_mapping(path: &Path) -> Result<HashMap<String, String>> {
    let text = fs::read_to_string(path)?;
    let mut mapping = HashMap::new();

    for line in text.lines().skip(1) {
        let mut columns = line.split('\t');
        let (Some(accession), Some(cluster)) = (columns.next(), columns.next()) else {
            continue;
        };
        let accession = accession.trim();
        let cluster = cluster.trim();
        if accession.is_empty() || cluster.is_empty() {
            return Err(CorpusError::InvalidQuery(format!(
                "malformed UniRef mapping line: {:?}",
                line
            )));
        }
        mapping.insert(accession.to_uppercase(), cluster.to_string());
    }

    Ok(mapping)
}

pub(crate) fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

//! Query terms and per-query output directories
//!
//! Every retrieval run owns one directory under the configured query root.
//! The directory name is derived from a truncated, character-sanitized
//! slice of the search term plus a random disambiguator, so repeated runs
//! of the same term never collide. Once created, a query directory is never
//! deleted or renamed by this crate; stage outputs are append-only files
//! inside it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::{CorpusError, Result};

/// Characters replaced with `-` in directory names
const DIR_NAME_REPLACED: &[char] = &[':', '[', ']', '(', ')', '\\', '/'];

/// Longest slice of the search term carried into the directory name
const DIR_NAME_TERM_LEN: usize = 40;

/// A literature search query
///
/// Built from a single term or from a list of terms combined with `OR`.
/// Owns its generated directory name and creation timestamp and is
/// immutable once the directory has been created.
#[derive(Debug, Clone)]
pub struct Query {
    term: String,
    dir_name: String,
    created: OffsetDateTime,
}

impl Query {
    /// Create a query from a single search term
    pub fn new(term: impl Into<String>) -> Result<Self> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(CorpusError::InvalidQuery(
                "no query provided".to_string(),
            ));
        }
        let dir_name = generate_dir_name(&term);
        Ok(Self {
            term,
            dir_name,
            created: OffsetDateTime::now_utc(),
        })
    }

    /// Create a query from a list of terms combined with `OR`
    ///
    /// # Example
    ///
    /// ```
    /// use protcorpus::query::Query;
    ///
    /// let query = Query::from_terms(&["BRCA1".to_string(), "BRCA2".to_string()]).unwrap();
    /// assert_eq!(query.term(), "BRCA1 OR BRCA2");
    /// ```
    pub fn from_terms(terms: &[String]) -> Result<Self> {
        if terms.is_empty() {
            return Err(CorpusError::InvalidQuery(
                "no query provided".to_string(),
            ));
        }
        Self::new(terms.join(" OR "))
    }

    /// The search term sent to PubMed
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The generated directory name for this query
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Creation timestamp, formatted for the query log
    pub fn created_string(&self) -> String {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        self.created
            .format(&format)
            .unwrap_or_else(|_| self.created.unix_timestamp().to_string())
    }
}

/// Derive a filesystem-safe directory name from a search term
fn generate_dir_name(term: &str) -> String {
    let truncated: String = term.chars().take(DIR_NAME_TERM_LEN).collect();
    let disambiguator: u32 = rand::thread_rng().gen_range(0..10_000_000);

    let name = format!("{}_{}", truncated, disambiguator).replace(' ', "_");
    let name: String = name
        .chars()
        .map(|c| if DIR_NAME_REPLACED.contains(&c) { '-' } else { c })
        .collect();
    name.trim_start_matches('-').to_string()
}

/// The output directory for one query, with its stage artifact paths
#[derive(Debug, Clone)]
pub struct QueryDir {
    path: PathBuf,
    dir_name: String,
}

impl QueryDir {
    /// Create the directory for a literature query under `root`
    ///
    /// The query root is created if it does not yet exist; the query
    /// directory itself must not exist beforehand.
    pub fn create(root: &Path, query: &Query) -> Result<Self> {
        fs::create_dir_all(root)?;
        let path = root.join(query.dir_name());
        fs::create_dir(&path)?;
        Ok(Self {
            path,
            dir_name: query.dir_name().to_string(),
        })
    }

    /// Create a timestamped directory for a protein-only query under `root`
    pub fn create_for_proteins(root: &Path) -> Result<Self> {
        let format = format_description!("[year]-[month]-[day]_[hour]_[minute]_[second]");
        let stamp = OffsetDateTime::now_utc()
            .format(&format)
            .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string());
        let dir_name = format!("ProteinQuery_{}", stamp);

        fs::create_dir_all(root)?;
        let path = root.join(&dir_name);
        fs::create_dir(&path)?;
        Ok(Self { path, dir_name })
    }

    /// Open an existing query directory without creating anything
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(CorpusError::InvalidQuery(format!(
                "query directory does not exist: {}",
                path.display()
            )));
        }
        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { path, dir_name })
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PMID list, one ID per line
    pub fn pmid_list_path(&self) -> PathBuf {
        self.path.join(format!("pmid_list_{}.txt", self.dir_name))
    }

    /// Flattened MEDLINE records, one per line
    pub fn entries_path(&self) -> PathBuf {
        self.path.join("entries.txt")
    }

    /// Merged PMC full-text article set
    pub fn fulltexts_path(&self) -> PathBuf {
        self.path.join("pmc_fulltexts.xml")
    }

    /// PMC article set converted to PubMed-style XML
    pub fn converted_path(&self) -> PathBuf {
        self.path.join("pmc_fulltexts_as_pubmed.xml")
    }

    /// Merged BioC gene annotation collection
    pub fn annotations_path(&self) -> PathBuf {
        self.path.join("gene_annotations.xml")
    }

    /// Per-PMID full-text JSON export
    pub fn fulltext_json_path(&self) -> PathBuf {
        self.path.join("fulltexts.json")
    }

    /// Protein alias lines, one pipe-delimited line per protein
    pub fn aliases_path(&self) -> PathBuf {
        self.path.join("aliases.txt")
    }

    /// Full protein entry dump
    pub fn protein_entries_path(&self) -> PathBuf {
        self.path.join("prot_entries.txt")
    }

    /// Merged UniProtKB entry XML
    pub fn protein_xml_path(&self) -> PathBuf {
        self.path.join("prot_entries.xml")
    }

    /// Query log path
    pub fn log_path(&self) -> PathBuf {
        self.path.join("query_log.txt")
    }

    /// Record the query term and timestamp in the query log
    pub fn write_log(&self, query: &Query) -> Result<PathBuf> {
        let path = self.log_path();
        let mut file = fs::File::create(&path)?;
        writeln!(file, "Query: {}", query.term())?;
        writeln!(file, "Date and time: {}", query.created_string())?;
        Ok(path)
    }
}

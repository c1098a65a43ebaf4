//! Query orchestration across the retrieval stages
//!
//! A literature run moves through a fixed stage order: search, PMID
//! collection, abstract download, full-text download, annotation download.
//! Remote-heavy transitions are gated by a confirmation callback so an
//! interactive caller can stop after seeing the result count; declining a
//! gate ends the run cleanly with the artifacts produced so far. A stage
//! failure after confirmation never rolls back prior artifacts.
//!
//! Protein-only runs are a single stage: batch UniProtKB retrieval into a
//! timestamped directory, with the output shape chosen by [`ProteinMode`].

use std::fmt;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::config::ClientConfig;
use crate::entrez::EntrezClient;
use crate::error::Result;
use crate::medline::Flattener;
use crate::pmc::{self, FullTextStats};
use crate::process::{self, write_lines};
use crate::pubtator::PubTatorClient;
use crate::query::{Query, QueryDir};
use crate::uniprot::{parse_entry_set, AliasSet, UniProtClient};
use crate::xml_merge::XmlMerger;

/// The stages of a literature retrieval run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Created,
    Searching,
    Collecting,
    DownloadingAbstracts,
    DownloadingFullText,
    DownloadingAnnotations,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Created => "created",
            Stage::Searching => "searching",
            Stage::Collecting => "collecting PMIDs",
            Stage::DownloadingAbstracts => "downloading abstracts",
            Stage::DownloadingFullText => "downloading full texts",
            Stage::DownloadingAnnotations => "downloading annotations",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Gate asked before each remote-heavy stage
pub trait Confirmer {
    /// Return `false` to stop the run before the named stage
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Confirmer that approves every stage, for non-interactive runs
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Optional behavior for a literature run
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineOptions {
    /// Also write the PubMed-style conversion of the merged article set
    pub convert_fulltexts: bool,
    /// Also write the PMID → body-text JSON export
    pub export_fulltext_json: bool,
}

/// What a literature run produced, and where it stopped
#[derive(Debug)]
pub struct PipelineReport {
    /// The query directory holding all artifacts
    pub query_dir: PathBuf,
    /// Last stage reached; `Complete` when nothing was declined
    pub stage: Stage,
    /// PMIDs collected from the search
    pub pmid_count: usize,
    /// Whether every PMID page was retrieved without error
    pub search_complete: bool,
    /// Flattened MEDLINE records written to the entry dump
    pub record_count: usize,
    /// Articles found in PMC, and how many carry body text
    pub fulltext_stats: Option<FullTextStats>,
    /// Annotation batches merged into the BioC collection
    pub annotation_batches: usize,
}

impl PipelineReport {
    fn new(query_dir: PathBuf) -> Self {
        Self {
            query_dir,
            stage: Stage::Created,
            pmid_count: 0,
            search_complete: true,
            record_count: 0,
            fulltext_stats: None,
            annotation_batches: 0,
        }
    }
}

/// Runs literature queries end to end
pub struct Pipeline {
    entrez: EntrezClient,
    pubtator: PubTatorClient,
    config: ClientConfig,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(config: ClientConfig, options: PipelineOptions) -> Self {
        Self {
            entrez: EntrezClient::new(config.clone()),
            pubtator: PubTatorClient::new(&config),
            config,
            options,
        }
    }

    /// Run a literature query through all stages
    ///
    /// Creates the query directory first; every later stage appends its
    /// artifact there. Declining a confirmation gate returns the report
    /// with `stage` set to the last stage that ran.
    #[instrument(skip(self, confirmer), fields(term = %query.term()))]
    pub async fn run(&self, query: &Query, confirmer: &mut dyn Confirmer) -> Result<PipelineReport> {
        let dir = QueryDir::create(&self.config.query_root, query)?;
        dir.write_log(query)?;
        let mut report = PipelineReport::new(dir.path().to_path_buf());

        report.stage = Stage::Searching;
        let search = self.entrez.collect_pmids(query.term()).await?;
        report.stage = Stage::Collecting;
        report.pmid_count = search.pmids.items.len();
        report.search_complete = search.pmids.is_complete();
        write_lines(&dir.pmid_list_path(), &search.pmids.items)?;
        info!(
            pmids = report.pmid_count,
            path = %dir.pmid_list_path().display(),
            "PMID list written"
        );

        if report.pmid_count == 0 {
            info!("Search returned no results, nothing further to retrieve");
            report.stage = Stage::Complete;
            return Ok(report);
        }

        if !confirmer.confirm(&format!(
            "Retrieved {} PMIDs. Download abstracts and metadata?",
            report.pmid_count
        )) {
            return Ok(report);
        }

        report.stage = Stage::DownloadingAbstracts;
        let pmc_ids = self.download_abstracts(&dir, &search, &mut report).await?;

        report.stage = Stage::DownloadingFullText;
        if pmc_ids.is_empty() {
            info!("No records carry a PMC identifier, skipping full-text download");
        } else {
            self.download_fulltexts(&dir, &pmc_ids, &mut report).await?;
        }

        if !confirmer.confirm(&format!(
            "Download gene annotations for {} PMIDs?",
            report.pmid_count
        )) {
            return Ok(report);
        }

        report.stage = Stage::DownloadingAnnotations;
        self.download_annotations(&dir, &search.pmids.items, &mut report)
            .await?;

        report.stage = Stage::Complete;
        info!(dir = %report.query_dir.display(), "Query run complete");
        Ok(report)
    }

    /// Fetch MEDLINE records, write the flattened entry dump, and return
    /// the PMC identifiers found among the records
    async fn download_abstracts(
        &self,
        dir: &QueryDir,
        search: &crate::entrez::PmidSearch,
        report: &mut PipelineReport,
    ) -> Result<Vec<String>> {
        let records = self
            .entrez
            .fetch_medline(&search.session, search.pmids.items.len())
            .await;
        if let Some(err) = &records.failure {
            warn!(error = %err, "Abstract download truncated, keeping partial records");
        }

        let mut flattener = Flattener::new();
        let lines: Vec<String> = records
            .items
            .iter()
            .map(|record| flattener.flatten(record).to_string())
            .collect();
        write_lines(&dir.entries_path(), &lines)?;
        report.record_count = lines.len();
        info!(
            records = report.record_count,
            path = %dir.entries_path().display(),
            "Entry dump written"
        );

        Ok(records
            .items
            .iter()
            .filter_map(|record| record.pmc_id())
            .map(str::to_string)
            .collect())
    }

    /// Fetch PMC full texts via a posted history session, merge the page
    /// fragments, and survey the merged set
    async fn download_fulltexts(
        &self,
        dir: &QueryDir,
        pmc_ids: &[String],
        report: &mut PipelineReport,
    ) -> Result<()> {
        let session = self.entrez.epost("pmc", pmc_ids).await?;
        let fragments = self
            .entrez
            .fetch_pmc_fragments(&session, pmc_ids.len())
            .await;
        if let Some(err) = &fragments.failure {
            warn!(error = %err, "Full-text download truncated, merging retrieved pages");
        }
        if fragments.items.is_empty() {
            warn!("No full-text pages retrieved, skipping merge");
            return Ok(());
        }

        // A structurally broken page is logged, not fatal; later stages
        // do not depend on the merged set
        let merged = match XmlMerger::pmc_articleset().merge(&fragments.items) {
            Ok(merged) => merged,
            Err(err) => {
                warn!(error = %err, "Article set failed to merge, skipping full-text artifacts");
                return Ok(());
            }
        };
        std::fs::write(dir.fulltexts_path(), &merged)?;
        info!(path = %dir.fulltexts_path().display(), "Merged article set written");

        match pmc::survey_articles(&merged) {
            Ok(stats) => {
                info!(
                    articles = stats.articles,
                    with_body = stats.with_body,
                    "Full-text presence check"
                );
                report.fulltext_stats = Some(stats);
            }
            Err(err) => {
                warn!(error = %err, "Article set failed the structural check, skipping survey");
                return Ok(());
            }
        }

        if self.options.convert_fulltexts {
            let converted = pmc::convert_to_pubmed_style(&merged)?;
            std::fs::write(dir.converted_path(), converted)?;
            info!(path = %dir.converted_path().display(), "Converted article set written");
        }
        if self.options.export_fulltext_json {
            process::extract_full_text_json(dir)?;
        }
        Ok(())
    }

    /// Fetch gene annotations in batches and merge them into one BioC
    /// collection
    async fn download_annotations(
        &self,
        dir: &QueryDir,
        pmids: &[String],
        report: &mut PipelineReport,
    ) -> Result<()> {
        let fragments = self.pubtator.fetch_gene_annotations(pmids).await;
        if let Some(err) = &fragments.failure {
            warn!(error = %err, "Annotation download truncated, merging retrieved batches");
        }
        if fragments.items.is_empty() {
            warn!("No annotation batches retrieved, skipping merge");
            return Ok(());
        }

        let merged = match XmlMerger::bioc_collection().merge(&fragments.items) {
            Ok(merged) => merged,
            Err(err) => {
                warn!(error = %err, "Annotation collection failed to merge, skipping the artifact");
                return Ok(());
            }
        };
        std::fs::write(dir.annotations_path(), merged)?;
        report.annotation_batches = fragments.pages_fetched;
        info!(
            batches = report.annotation_batches,
            path = %dir.annotations_path().display(),
            "Merged annotation collection written"
        );
        Ok(())
    }
}

/// Output shape of a protein-only run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProteinMode {
    /// Merged entry XML plus a per-entry summary dump
    Entries,
    /// Merged entry XML plus the alias file
    Aliases,
}

/// What a protein-only run produced
#[derive(Debug)]
pub struct ProteinReport {
    /// The timestamped protein query directory
    pub query_dir: PathBuf,
    /// Entries decoded from the merged XML
    pub entry_count: usize,
    /// Alias lines written, in alias mode
    pub alias_count: usize,
    /// Whether every batch was retrieved without error
    pub complete: bool,
}

/// Retrieve UniProtKB entries for an accession list into a fresh
/// `ProteinQuery_<timestamp>` directory
///
/// Always writes the merged entry XML. `Aliases` mode adds the alias
/// file; `Entries` mode adds a tab-delimited per-entry summary.
#[instrument(skip(config, accessions), fields(accession_count = accessions.len(), mode = ?mode))]
pub async fn run_protein_query(
    config: &ClientConfig,
    accessions: &[String],
    mode: ProteinMode,
) -> Result<ProteinReport> {
    let dir = QueryDir::create_for_proteins(&config.query_root)?;
    let client = UniProtClient::new(config);

    let fragments = client.fetch_entries(accessions).await;
    if let Some(err) = &fragments.failure {
        warn!(error = %err, "Entry download truncated, merging retrieved batches");
    }
    let complete = fragments.is_complete();
    if fragments.items.is_empty() {
        if let Some(err) = fragments.failure {
            return Err(err);
        }
        return Ok(ProteinReport {
            query_dir: dir.path().to_path_buf(),
            entry_count: 0,
            alias_count: 0,
            complete,
        });
    }

    let merged = XmlMerger::uniprot_entryset().merge(&fragments.items)?;
    std::fs::write(dir.protein_xml_path(), &merged)?;
    info!(path = %dir.protein_xml_path().display(), "Merged entry XML written");

    let set = parse_entry_set(&merged)?;
    let entry_count = set.entries.len();
    let mut alias_count = 0;

    match mode {
        ProteinMode::Aliases => {
            let lines: Vec<String> = set
                .entries
                .iter()
                .map(AliasSet::from_entry)
                .filter(|aliases| !aliases.is_empty())
                .map(|aliases| aliases.to_line())
                .collect();
            alias_count = lines.len();
            write_lines(&dir.aliases_path(), &lines)?;
            info!(
                proteins = alias_count,
                path = %dir.aliases_path().display(),
                "Alias file written"
            );
        }
        ProteinMode::Entries => {
            let lines: Vec<String> = set
                .entries
                .iter()
                .map(|entry| {
                    format!(
                        "{}\t{}",
                        entry.accessions.join("|"),
                        entry.names.join("|")
                    )
                })
                .collect();
            write_lines(&dir.protein_entries_path(), &lines)?;
            info!(
                entries = lines.len(),
                path = %dir.protein_entries_path().display(),
                "Entry summary written"
            );
        }
    }

    Ok(ProteinReport {
        query_dir: dir.path().to_path_buf(),
        entry_count,
        alias_count,
        complete,
    })
}

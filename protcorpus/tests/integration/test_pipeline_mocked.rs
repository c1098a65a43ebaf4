//! End-to-end literature pipeline test against mocked services
//!
//! Drives a full query run (search, abstracts, full texts, annotations)
//! against one wiremock server standing in for the E-utilities and
//! PubTator Central, then checks every artifact in the query directory.

use std::fs;

use protcorpus::config::ClientConfig;
use protcorpus::pipeline::{AutoConfirm, Confirmer, Pipeline, PipelineOptions, Stage};
use protcorpus::query::Query;
use serde_json::json;
use tempfile::TempDir;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MEDLINE_BODY: &str = "\
PMID- 111
TI  - BRCA1 in DNA repair pathways and
      genome stability.
AU  - Smith J
AU  - Jones K
IS  - 1234-5678 (Print)
PMC - PMC333

PMID- 222
TI  - Abstract-only record.
AU  - Doe A
";

const PMC_FRAGMENT: &str = r#"<?xml version="1.0"?>
<pmc-articleset>
  <article>
    <front><article-meta>
      <article-id pub-id-type="pmid">111</article-id>
      <title-group><article-title>BRCA1 in DNA repair</article-title></title-group>
      <abstract><p>Repair pathways.</p></abstract>
    </article-meta></front>
    <body><sec><p>Full body text.</p></sec></body>
  </article>
</pmc-articleset>"#;

const BIOC_FRAGMENT: &str = r#"<?xml version="1.0"?>
<collection>
  <source>PubTator</source>
  <date>20240101</date>
  <key>BioC.key</key>
  <document><id>111</id></document>
  <document><id>222</id></document>
</collection>"#;

async fn mount_services(server: &MockServer) {
    mount_services_with_pmc(server, PMC_FRAGMENT).await;
}

async fn mount_services_with_pmc(server: &MockServer, pmc_body: &str) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "esearchresult": {
                    "count": "2",
                    "idlist": ["111", "222"],
                    "webenv": "MCID_pipeline",
                    "querykey": "1"
                }
            })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MEDLINE_BODY))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/epost.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "epostresult": {
                    "webenv": "MCID_pmc",
                    "querykey": "1"
                }
            })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pmc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pmc_body))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/biocxml"))
        .and(query_param("concepts", "gene"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BIOC_FRAGMENT))
        .mount(server)
        .await;
}

fn mock_config(server: &MockServer, root: &TempDir) -> ClientConfig {
    ClientConfig::new()
        .with_eutils_base_url(server.uri())
        .with_pubtator_base_url(server.uri())
        .with_query_root(root.path())
        .with_rate_limit(100.0)
}

#[tokio::test]
#[traced_test]
async fn test_full_run_writes_all_artifacts() {
    let mock_server = MockServer::start().await;
    mount_services(&mock_server).await;
    let root = TempDir::new().unwrap();

    let options = PipelineOptions {
        convert_fulltexts: true,
        export_fulltext_json: true,
    };
    let pipeline = Pipeline::new(mock_config(&mock_server, &root), options);
    let query = Query::new("BRCA1").unwrap();

    let report = pipeline
        .run(&query, &mut AutoConfirm)
        .await
        .expect("pipeline should complete");

    assert_eq!(report.stage, Stage::Complete);
    assert_eq!(report.pmid_count, 2);
    assert!(report.search_complete);
    assert_eq!(report.record_count, 2);

    let stats = report.fulltext_stats.expect("article set was surveyed");
    assert_eq!(stats.articles, 1);
    assert_eq!(stats.with_body, 1);
    assert_eq!(report.annotation_batches, 1);

    let dir = report.query_dir;
    let pmid_list = fs::read_to_string(
        dir.join(format!(
            "pmid_list_{}.txt",
            dir.file_name().unwrap().to_string_lossy()
        )),
    )
    .unwrap();
    assert_eq!(pmid_list.lines().collect::<Vec<_>>(), vec!["111", "222"]);

    let entries = fs::read_to_string(dir.join("entries.txt")).unwrap();
    assert_eq!(entries.lines().count(), 2);
    assert!(entries.starts_with("id=0\tPMID=111"));
    assert!(entries.contains("AU=Smith J|Jones K"));
    // Reserved field codes never reach the entry dump
    assert!(!entries.contains("IS="));

    let fulltexts = fs::read_to_string(dir.join("pmc_fulltexts.xml")).unwrap();
    assert_eq!(fulltexts.matches("<pmc-articleset>").count(), 1);
    assert!(!fulltexts.contains("<?xml"));

    let converted = fs::read_to_string(dir.join("pmc_fulltexts_as_pubmed.xml")).unwrap();
    assert!(converted.contains("<PMID>111</PMID>"));
    assert!(converted.contains("<ArticleTitle>BRCA1 in DNA repair</ArticleTitle>"));

    let fulltext_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("fulltexts.json")).unwrap()).unwrap();
    assert_eq!(fulltext_json["111"], "Full body text.");

    let annotations = fs::read_to_string(dir.join("gene_annotations.xml")).unwrap();
    assert_eq!(annotations.matches("<collection>").count(), 1);
    assert!(annotations.contains("<id>111</id>"));
    assert!(!annotations.contains("<source>"));

    let log = fs::read_to_string(dir.join("query_log.txt")).unwrap();
    assert!(log.contains("Query: BRCA1"));
}

/// A confirmer that declines after a set number of approvals.
struct DeclineAfter(usize);

impl Confirmer for DeclineAfter {
    fn confirm(&mut self, _prompt: &str) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        true
    }
}

#[tokio::test]
#[traced_test]
async fn test_declined_first_gate_stops_after_pmid_list() {
    let mock_server = MockServer::start().await;
    mount_services(&mock_server).await;
    let root = TempDir::new().unwrap();

    let pipeline = Pipeline::new(
        mock_config(&mock_server, &root),
        PipelineOptions::default(),
    );
    let query = Query::new("BRCA1").unwrap();

    let report = pipeline
        .run(&query, &mut DeclineAfter(0))
        .await
        .expect("a declined gate is not an error");

    assert_eq!(report.stage, Stage::Collecting);
    assert_eq!(report.pmid_count, 2);
    assert_eq!(report.record_count, 0);
    assert!(!report.query_dir.join("entries.txt").exists());
    assert!(!report.query_dir.join("gene_annotations.xml").exists());
}

#[tokio::test]
#[traced_test]
async fn test_declined_annotation_gate_keeps_earlier_artifacts() {
    let mock_server = MockServer::start().await;
    mount_services(&mock_server).await;
    let root = TempDir::new().unwrap();

    let pipeline = Pipeline::new(
        mock_config(&mock_server, &root),
        PipelineOptions::default(),
    );
    let query = Query::new("BRCA1").unwrap();

    let report = pipeline
        .run(&query, &mut DeclineAfter(1))
        .await
        .expect("a declined gate is not an error");

    assert_eq!(report.stage, Stage::DownloadingFullText);
    assert_eq!(report.record_count, 2);
    assert!(report.query_dir.join("entries.txt").exists());
    assert!(report.query_dir.join("pmc_fulltexts.xml").exists());
    assert!(!report.query_dir.join("gene_annotations.xml").exists());
}

/// A structurally broken full-text page must not stop the run: the
/// full-text artifacts are skipped and the annotation stage still
/// produces its collection.
#[tokio::test]
#[traced_test]
async fn test_malformed_fulltext_page_skips_stage_but_run_completes() {
    let mock_server = MockServer::start().await;
    // Truncated article set: unclosed elements before end of document
    mount_services_with_pmc(&mock_server, "<pmc-articleset><article>").await;
    let root = TempDir::new().unwrap();

    let pipeline = Pipeline::new(
        mock_config(&mock_server, &root),
        PipelineOptions::default(),
    );
    let query = Query::new("BRCA1").unwrap();

    let report = pipeline
        .run(&query, &mut AutoConfirm)
        .await
        .expect("a malformed full-text page is not fatal");

    assert_eq!(report.stage, Stage::Complete);
    assert_eq!(report.record_count, 2);
    assert!(report.fulltext_stats.is_none());
    assert!(!report.query_dir.join("pmc_fulltexts.xml").exists());

    assert_eq!(report.annotation_batches, 1);
    let annotations =
        fs::read_to_string(report.query_dir.join("gene_annotations.xml")).unwrap();
    assert!(annotations.contains("<id>111</id>"));
}

#[tokio::test]
#[traced_test]
async fn test_empty_search_finishes_without_prompts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "esearchresult": {
                    "count": "0",
                    "idlist": [],
                    "webenv": "MCID_empty",
                    "querykey": "1"
                }
            })),
        )
        .mount(&mock_server)
        .await;
    let root = TempDir::new().unwrap();

    /// Fails the test if any gate is reached.
    struct NoPrompts;
    impl Confirmer for NoPrompts {
        fn confirm(&mut self, prompt: &str) -> bool {
            panic!("no confirmation expected for an empty result: {}", prompt);
        }
    }

    let pipeline = Pipeline::new(
        mock_config(&mock_server, &root),
        PipelineOptions::default(),
    );
    let query = Query::new("zxqv nonexistent").unwrap();

    let report = pipeline.run(&query, &mut NoPrompts).await.unwrap();
    assert_eq!(report.stage, Stage::Complete);
    assert_eq!(report.pmid_count, 0);
}

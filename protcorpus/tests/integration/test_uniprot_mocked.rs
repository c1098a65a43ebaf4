//! Integration tests for UniProtKB entry retrieval using mocked HTTP
//! responses

use std::fs;

use protcorpus::config::ClientConfig;
use protcorpus::error::CorpusError;
use protcorpus::pipeline::{run_protein_query, ProteinMode};
use protcorpus::uniprot::{parse_entry_set, UniProtClient};
use protcorpus::xml_merge::XmlMerger;
use tempfile::TempDir;
use tracing_test::traced_test;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENTRY_FRAGMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uniprot xmlns="http://uniprot.org/uniprot">
  <entry dataset="Swiss-Prot">
    <accession>P38398</accession>
    <name>BRCA1_HUMAN</name>
    <protein>
      <recommendedName><fullName>Breast cancer type 1 susceptibility protein</fullName></recommendedName>
    </protein>
    <gene><name type="primary">BRCA1</name></gene>
  </entry>
  <copyright>Copyrighted by the UniProt Consortium</copyright>
</uniprot>"#;

const SECOND_FRAGMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uniprot xmlns="http://uniprot.org/uniprot">
  <entry>
    <accession>A0A000</accession>
    <name>A0A000_9ACTN</name>
    <protein>
      <submittedName><fullName>Uncharacterized protein</fullName></submittedName>
    </protein>
  </entry>
  <copyright>Copyrighted by the UniProt Consortium</copyright>
</uniprot>"#;

fn create_mock_client(mock_server: &MockServer, batch_size: usize) -> UniProtClient {
    let config = ClientConfig::new()
        .with_uniprot_base_url(mock_server.uri())
        .with_uniprot_batch_size(batch_size)
        .with_rate_limit(100.0);

    UniProtClient::new(&config)
}

#[tokio::test]
#[traced_test]
async fn test_single_batch_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("format=xml"))
        .and(body_string_contains("query=P38398"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTRY_FRAGMENT))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server, 1000);
    let paged = client.fetch_entries(&["P38398".to_string()]).await;

    assert!(paged.is_complete());
    assert_eq!(paged.pages_fetched, 1);
    assert_eq!(paged.items.len(), 1);

    let set = parse_entry_set(&paged.items[0]).unwrap();
    assert_eq!(set.entries[0].accessions, vec!["P38398"]);
}

/// Three accessions with a batch cap of two means two form POSTs, with
/// the accession list space-joined inside each request body.
#[tokio::test]
#[traced_test]
async fn test_accessions_split_into_batches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("query=P38398+A0A000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTRY_FRAGMENT))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("query=Q99999"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SECOND_FRAGMENT))
        .expect(1)
        .mount(&mock_server)
        .await;

    let accessions = vec![
        "P38398".to_string(),
        "A0A000".to_string(),
        "Q99999".to_string(),
    ];
    let client = create_mock_client(&mock_server, 2);
    let paged = client.fetch_entries(&accessions).await;

    assert!(paged.is_complete());
    assert_eq!(paged.pages_fetched, 2);
    assert_eq!(paged.items.len(), 2);
    assert_eq!(paged.total, 2);

    mock_server.verify().await;
}

/// A batch size of zero written straight into the config field is
/// floored to one instead of panicking the partitioner.
#[tokio::test]
#[traced_test]
async fn test_zero_batch_size_floored_to_one() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("query=P38398"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTRY_FRAGMENT))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = ClientConfig::new()
        .with_uniprot_base_url(mock_server.uri())
        .with_rate_limit(100.0);
    config.uniprot_batch_size = 0;

    let client = UniProtClient::new(&config);
    let paged = client.fetch_entries(&["P38398".to_string()]).await;

    assert!(paged.is_complete());
    assert_eq!(paged.pages_fetched, 1);
    assert_eq!(paged.total, 1);
}

/// A failed batch stops the retrieval with the fragments collected so far.
#[tokio::test]
#[traced_test]
async fn test_partial_results_kept_on_batch_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTRY_FRAGMENT))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let accessions = vec!["P38398".to_string(), "A0A000".to_string()];
    let client = create_mock_client(&mock_server, 1);
    let paged = client.fetch_entries(&accessions).await;

    assert!(!paged.is_complete());
    assert_eq!(paged.items.len(), 1);
    assert!(matches!(
        paged.failure,
        Some(CorpusError::ApiError { status: 503, .. })
    ));
}

/// End-to-end protein run: batches merged under one `uniprot` root with
/// the copyright boilerplate dropped, aliases rendered one per line.
#[tokio::test]
#[traced_test]
async fn test_protein_query_writes_aliases() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("query=P38398"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTRY_FRAGMENT))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("query=A0A000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SECOND_FRAGMENT))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let config = ClientConfig::new()
        .with_uniprot_base_url(mock_server.uri())
        .with_uniprot_batch_size(1)
        .with_query_root(root.path())
        .with_rate_limit(100.0);

    let accessions = vec!["P38398".to_string(), "A0A000".to_string()];
    let report = run_protein_query(&config, &accessions, ProteinMode::Aliases)
        .await
        .expect("protein query should succeed");

    assert!(report.complete);
    assert_eq!(report.entry_count, 2);
    assert_eq!(report.alias_count, 2);
    assert!(report
        .query_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("ProteinQuery_"));

    let merged = fs::read_to_string(report.query_dir.join("prot_entries.xml")).unwrap();
    assert_eq!(merged.matches("<uniprot").count(), 1);
    assert!(!merged.contains("<copyright>"));
    assert!(!merged.contains("<?xml"));

    let aliases = fs::read_to_string(report.query_dir.join("aliases.txt")).unwrap();
    let lines: Vec<&str> = aliases.lines().collect();
    assert_eq!(
        lines[0],
        "p38398|brca1_human|breast_cancer_type_1_susceptibility_protein|brca1"
    );
    // The placeholder protein name never reaches the alias file
    assert_eq!(lines[1], "a0a000|a0a000_9actn");
}

#[test]
fn test_merge_drops_copyright_boilerplate() {
    let merged = XmlMerger::uniprot_entryset()
        .merge(&[ENTRY_FRAGMENT, SECOND_FRAGMENT])
        .unwrap();

    assert_eq!(merged.matches("<uniprot").count(), 1);
    assert_eq!(merged.matches("<entry").count(), 2);
    assert!(!merged.contains("copyright"));
}

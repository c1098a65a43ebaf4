//! Integration tests for paginated PMID collection using mocked HTTP
//! responses
//!
//! These tests pin down the request arithmetic: a search reporting N
//! results with page size P must issue exactly ceil(N / P) ESearch
//! requests, with no trailing empty request when N is a multiple of P.

use protcorpus::config::ClientConfig;
use protcorpus::entrez::EntrezClient;
use protcorpus::error::CorpusError;
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a client pointing at a mock server
fn create_mock_client(mock_server: &MockServer, page_size: usize) -> EntrezClient {
    let config = ClientConfig::new()
        .with_eutils_base_url(mock_server.uri())
        .with_page_size(page_size)
        .with_rate_limit(100.0); // High rate limit for tests

    EntrezClient::new(config)
}

/// One page of synthetic PMIDs starting at `start`
fn id_page(start: usize, len: usize) -> Vec<String> {
    (start..start + len).map(|id| id.to_string()).collect()
}

fn esearch_body(count: usize, idlist: Vec<String>) -> serde_json::Value {
    json!({
        "esearchresult": {
            "count": count.to_string(),
            "idlist": idlist,
            "webenv": "MCID_pagination",
            "querykey": "1"
        }
    })
}

async fn mount_page(server: &MockServer, retstart: usize, count: usize, idlist: Vec<String>) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("retstart", retstart.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(esearch_body(count, idlist))
                .insert_header("content-type", "application/json"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// 2500 results with page size 1000 must mean exactly three requests at
/// offsets 0, 1000, and 2000.
#[tokio::test]
#[traced_test]
async fn test_three_pages_for_2500_results() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 0, 2500, id_page(0, 1000)).await;
    mount_page(&mock_server, 1000, 2500, id_page(1000, 1000)).await;
    mount_page(&mock_server, 2000, 2500, id_page(2000, 500)).await;

    let client = create_mock_client(&mock_server, 1000);
    let search = client
        .collect_pmids("BRCA1")
        .await
        .expect("search should succeed");

    assert!(search.pmids.is_complete());
    assert_eq!(search.pmids.total, 2500);
    assert_eq!(search.pmids.pages_fetched, 3);
    assert_eq!(search.pmids.items.len(), 2500);
    assert_eq!(search.pmids.items.first().map(String::as_str), Some("0"));
    assert_eq!(search.pmids.items.last().map(String::as_str), Some("2499"));
    assert_eq!(search.session.webenv, "MCID_pagination");

    // expect(1) on each mounted page verifies no fourth request was made
    mock_server.verify().await;
}

/// An exact multiple of the page size must not trigger a trailing empty
/// request.
#[tokio::test]
#[traced_test]
async fn test_no_overfetch_on_exact_multiple() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 0, 2000, id_page(0, 1000)).await;
    mount_page(&mock_server, 1000, 2000, id_page(1000, 1000)).await;

    let client = create_mock_client(&mock_server, 1000);
    let search = client
        .collect_pmids("lung cancer")
        .await
        .expect("search should succeed");

    assert_eq!(search.pmids.pages_fetched, 2);
    assert_eq!(search.pmids.items.len(), 2000);

    mock_server.verify().await;
}

/// A single page below the page size needs only the initial request.
#[tokio::test]
#[traced_test]
async fn test_single_page_result() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 0, 3, id_page(100, 3)).await;

    let client = create_mock_client(&mock_server, 1000);
    let search = client
        .collect_pmids("rare disease")
        .await
        .expect("search should succeed");

    assert_eq!(search.pmids.pages_fetched, 1);
    assert_eq!(search.pmids.items, vec!["100", "101", "102"]);

    mock_server.verify().await;
}

/// A failed continuation page stops the collection with the PMIDs
/// accumulated before the failure and the cause recorded.
#[tokio::test]
#[traced_test]
async fn test_partial_results_kept_on_page_failure() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 0, 2500, id_page(0, 1000)).await;
    mount_page(&mock_server, 1000, 2500, id_page(1000, 1000)).await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("retstart", "2000"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server, 1000);
    let search = client
        .collect_pmids("BRCA1")
        .await
        .expect("initial search succeeded, so the call returns partial results");

    assert!(!search.pmids.is_complete());
    assert_eq!(search.pmids.items.len(), 2000);
    assert_eq!(search.pmids.pages_fetched, 2);
    assert!(matches!(
        search.pmids.failure,
        Some(CorpusError::ApiError { status: 502, .. })
    ));
}

/// An inline ESearch error terminates the run before any pagination.
#[tokio::test]
#[traced_test]
async fn test_inline_search_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "esearchresult": {
                    "ERROR": "Invalid db name specified"
                }
            })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server, 1000);
    let result = client.collect_pmids("anything").await;
    assert!(matches!(result, Err(CorpusError::ApiError { status: 200, .. })));
}

/// A response without history session values is unusable for follow-up
/// fetches and is rejected.
#[tokio::test]
#[traced_test]
async fn test_missing_history_session_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "esearchresult": {
                    "count": "5",
                    "idlist": ["1", "2", "3", "4", "5"]
                }
            })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server, 1000);
    let result = client.collect_pmids("anything").await;
    assert!(matches!(result, Err(CorpusError::SessionNotAvailable)));
}

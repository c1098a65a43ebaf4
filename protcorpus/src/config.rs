//! Client configuration for the remote knowledgebase services
//!
//! All endpoint URLs, page sizes, and identification parameters live here so
//! that the orchestrator receives explicit configuration scoped to one run
//! instead of reading process-wide constants. Base URLs are overridable per
//! service, which is also how the mocked integration tests point clients at
//! a local server.

use std::path::PathBuf;
use std::time::Duration;

use crate::rate_limit::RateLimiter;

const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_PUBTATOR_BASE_URL: &str =
    "https://www.ncbi.nlm.nih.gov/research/pubtator-api/publications/export";
const DEFAULT_UNIPROT_BASE_URL: &str = "https://www.uniprot.org/uploadlists/";

/// Maximum records per E-utilities request (esearch/efetch retmax)
pub const EUTILS_PAGE_SIZE: usize = 1000;

/// Maximum PMIDs per PubTator Central export request
pub const PUBTATOR_BATCH_SIZE: usize = 100;

/// Maximum accessions per UniProtKB mapping request
pub const UNIPROT_BATCH_SIZE: usize = 1000;

/// Configuration for corpus retrieval clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key (raises the E-utilities rate limit from 3 to 10 rps)
    pub api_key: Option<String>,
    /// Contact email appended to E-utilities requests
    pub email: Option<String>,
    /// Tool name appended to E-utilities requests
    pub tool: Option<String>,
    /// Requests per second; defaults depend on presence of an API key
    pub rate_limit: Option<f64>,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Root directory under which query directories are created
    pub query_root: PathBuf,
    /// Page size for paginated E-utilities requests
    pub page_size: usize,
    /// Batch size for PubTator Central exports
    pub pubtator_batch_size: usize,
    /// Batch size for UniProtKB lookups
    pub uniprot_batch_size: usize,
    eutils_base_url: Option<String>,
    pubtator_base_url: Option<String>,
    uniprot_base_url: Option<String>,
}

impl ClientConfig {
    /// Create a configuration with NCBI-compliant defaults
    pub fn new() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            rate_limit: None,
            timeout: Duration::from_secs(120),
            query_root: PathBuf::from("queries"),
            page_size: EUTILS_PAGE_SIZE,
            pubtator_batch_size: PUBTATOR_BATCH_SIZE,
            uniprot_batch_size: UNIPROT_BATCH_SIZE,
            eutils_base_url: None,
            pubtator_base_url: None,
            uniprot_base_url: None,
        }
    }

    /// Set the NCBI API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the contact email sent with E-utilities requests
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the tool name sent with E-utilities requests
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Override the request rate limit (requests per second)
    pub fn with_rate_limit(mut self, requests_per_second: f64) -> Self {
        self.rate_limit = Some(requests_per_second);
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the root directory for query output
    pub fn with_query_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.query_root = root.into();
        self
    }

    /// Override the E-utilities page size (mainly for tests)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Override the PubTator Central batch size (mainly for tests)
    pub fn with_pubtator_batch_size(mut self, batch_size: usize) -> Self {
        self.pubtator_batch_size = batch_size.max(1);
        self
    }

    /// Override the UniProtKB batch size (mainly for tests)
    pub fn with_uniprot_batch_size(mut self, batch_size: usize) -> Self {
        self.uniprot_batch_size = batch_size.max(1);
        self
    }

    /// Override the E-utilities base URL
    pub fn with_eutils_base_url(mut self, url: impl Into<String>) -> Self {
        self.eutils_base_url = Some(url.into());
        self
    }

    /// Override the PubTator Central base URL
    pub fn with_pubtator_base_url(mut self, url: impl Into<String>) -> Self {
        self.pubtator_base_url = Some(url.into());
        self
    }

    /// Override the UniProtKB base URL
    pub fn with_uniprot_base_url(mut self, url: impl Into<String>) -> Self {
        self.uniprot_base_url = Some(url.into());
        self
    }

    /// Effective E-utilities base URL
    pub fn effective_eutils_base_url(&self) -> &str {
        self.eutils_base_url
            .as_deref()
            .unwrap_or(DEFAULT_EUTILS_BASE_URL)
    }

    /// Effective PubTator Central base URL
    pub fn effective_pubtator_base_url(&self) -> &str {
        self.pubtator_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBTATOR_BASE_URL)
    }

    /// Effective UniProtKB base URL
    pub fn effective_uniprot_base_url(&self) -> &str {
        self.uniprot_base_url
            .as_deref()
            .unwrap_or(DEFAULT_UNIPROT_BASE_URL)
    }

    /// Effective rate limit: 10 rps with an API key, 3 without,
    /// unless explicitly overridden
    pub fn effective_rate_limit(&self) -> f64 {
        match self.rate_limit {
            Some(rate) => rate,
            None if self.api_key.is_some() => 10.0,
            None => 3.0,
        }
    }

    /// Create a rate limiter from this configuration
    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }

    /// API identification parameters appended to every E-utilities request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        if let Some(tool) = &self.tool {
            params.push(("tool".to_string(), tool.clone()));
        }
        params
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

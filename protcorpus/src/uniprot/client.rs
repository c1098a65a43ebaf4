//! UniProtKB bulk entry lookup
//!
//! The mapping service takes a space-separated accession list in a form
//! POST and returns one XML document per request. Requests are capped at
//! 1000 accessions; longer lists are partitioned and the per-batch
//! documents kept as fragments for merging and parsing.

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::batch::batches;
use crate::config::ClientConfig;
use crate::error::{CorpusError, Result};
use crate::fetch::Paged;
use crate::rate_limit::RateLimiter;

/// Client for the UniProtKB ID mapping/entry export service
#[derive(Clone)]
pub struct UniProtClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    batch_size: usize,
}

impl UniProtClient {
    /// Create a client from run configuration
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.effective_uniprot_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            batch_size: config.uniprot_batch_size.max(1),
        }
    }

    /// Fetch entry XML for one batch of accessions
    pub async fn fetch_entry_batch(&self, accessions: &[String]) -> Result<String> {
        let params = [
            ("from", "ACC+ID"),
            ("to", "ACC"),
            ("format", "xml"),
            ("query", &accessions.join(" ")),
        ];

        self.rate_limiter.acquire().await?;
        debug!(batch_size = accessions.len(), "Making UniProt lookup request");
        let response = self.client.post(&self.base_url).form(&params).send().await?;
        if !response.status().is_success() {
            warn!(
                "UniProt lookup failed with status: {}",
                response.status()
            );
            return Err(CorpusError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }
        Ok(response.text().await?.trim().to_string())
    }

    /// Fetch entry XML for all accessions, one fragment per batch
    ///
    /// A failed batch stops the retrieval with the fragments collected so
    /// far and the failure recorded.
    #[instrument(skip(self, accessions), fields(accession_count = accessions.len()))]
    pub async fn fetch_entries(&self, accessions: &[String]) -> Paged<String> {
        let batch_count = accessions.len().div_ceil(self.batch_size);
        let mut paged = Paged::for_batches(batch_count);

        for batch in batches(accessions, self.batch_size) {
            match self.fetch_entry_batch(batch).await {
                Ok(fragment) => {
                    paged.pages_fetched += 1;
                    paged.items.push(fragment);
                }
                Err(err) => {
                    warn!(
                        fetched_batches = paged.pages_fetched,
                        error = %err,
                        "UniProt batch failed, stopping with partial results"
                    );
                    paged.failure = Some(err);
                    return paged;
                }
            }
        }

        info!(batches = paged.pages_fetched, "UniProt entry retrieval complete");
        paged
    }
}

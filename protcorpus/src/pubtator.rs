//! PubTator Central gene annotation export
//!
//! PubTator Central has no pagination or history mechanism: it maps an
//! explicit PMID list to a BioC XML collection in one request, capped at
//! 100 PMIDs. Long lists are split with the batch partitioner and the
//! per-batch collections merged under a single `collection` root.
//! Annotations cover both title/abstract and full-text spans when the
//! article is in PMC.

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::batch::batches;
use crate::config::ClientConfig;
use crate::error::{CorpusError, Result};
use crate::fetch::Paged;
use crate::rate_limit::RateLimiter;

/// Client for the PubTator Central export API
#[derive(Clone)]
pub struct PubTatorClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    batch_size: usize,
}

impl PubTatorClient {
    /// Create a client from run configuration
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.effective_pubtator_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            batch_size: config.pubtator_batch_size.max(1),
        }
    }

    /// Export gene annotations for one batch of PMIDs as a BioC fragment
    pub async fn fetch_gene_batch(&self, pmids: &[String]) -> Result<String> {
        let joined = pmids.join(",");
        let url = format!(
            "{}/biocxml?concepts=gene&pmids={}",
            self.base_url, joined
        );

        self.rate_limiter.acquire().await?;
        debug!(batch_size = pmids.len(), "Making PubTator export request");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!(
                "PubTator export failed with status: {}",
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
        Ok(response.text().await?)
    }

    /// Export gene annotations for all PMIDs, one fragment per batch
    ///
    /// A failed batch stops the export with the fragments retrieved so far
    /// and the failure recorded; the caller decides whether the truncated
    /// collection is still worth merging.
    #[instrument(skip(self, pmids), fields(pmid_count = pmids.len()))]
    pub async fn fetch_gene_annotations(&self, pmids: &[String]) -> Paged<String> {
        let batch_count = pmids.len().div_ceil(self.batch_size);
        let mut paged = Paged::for_batches(batch_count);

        for batch in batches(pmids, self.batch_size) {
            match self.fetch_gene_batch(batch).await {
                Ok(fragment) => {
                    paged.pages_fetched += 1;
                    paged.items.push(fragment);
                }
                Err(err) => {
                    warn!(
                        fetched_batches = paged.pages_fetched,
                        error = %err,
                        "Annotation batch failed, stopping with partial results"
                    );
                    paged.failure = Some(err);
                    return paged;
                }
            }
        }

        info!(
            batches = paged.pages_fetched,
            "Gene annotation export complete"
        );
        paged
    }
}

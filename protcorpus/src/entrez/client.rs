//! E-utilities requests: ESearch with history, EPost, paged EFetch

use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{CorpusError, Result};
use crate::fetch::{page_offsets, paginate, Paged};
use crate::medline::{parse_medline, MedlineRecord};
use crate::rate_limit::RateLimiter;

use super::responses::{EPostResponse, ESearchResult};
use super::{HistorySession, PmidSearch};

/// Client for the NCBI E-utilities (ESearch, EPost, EFetch)
#[derive(Clone)]
pub struct EntrezClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl EntrezClient {
    /// Create a client from run configuration
    pub fn new(config: ClientConfig) -> Self {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_eutils_base_url().to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            rate_limiter,
            config,
        }
    }

    /// Search PubMed and collect the complete PMID result set
    ///
    /// Issues an initial ESearch with `usehistory=y` to obtain the total
    /// count and a history session, then advances the offset by the page
    /// size until the total is covered: exactly `ceil(total / page_size)`
    /// requests. A failed page stops the collection with the PMIDs
    /// accumulated so far and `pmids.failure` set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use protcorpus::config::ClientConfig;
    /// use protcorpus::entrez::EntrezClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = EntrezClient::new(ClientConfig::new());
    ///     let search = client.collect_pmids("BRCA1 OR BRCA2").await?;
    ///     println!("{} PMIDs retrieved", search.pmids.items.len());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(term = %term))]
    pub async fn collect_pmids(&self, term: &str) -> Result<PmidSearch> {
        if term.trim().is_empty() {
            return Err(CorpusError::InvalidQuery("no query provided".to_string()));
        }

        let page_size = self.config.page_size;
        let first = self.esearch(term, 0, page_size, None).await?;

        if let Some(error_msg) = &first.error {
            return Err(CorpusError::ApiError {
                status: 200,
                message: format!("NCBI ESearch error: {}", error_msg),
            });
        }

        let total: usize = first
            .count
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);

        let session = HistorySession {
            webenv: first.webenv.ok_or(CorpusError::SessionNotAvailable)?,
            query_key: first.query_key.ok_or(CorpusError::SessionNotAvailable)?,
        };

        info!(total = total, "Search reported total result count");

        let mut pmids = Paged::empty(total);
        pmids.pages_fetched = 1;
        pmids.items = first.idlist;

        for offset in page_offsets(total, page_size).skip(1) {
            match self.esearch(term, offset, page_size, Some(&session)).await {
                Ok(page) => {
                    pmids.pages_fetched += 1;
                    pmids.items.extend(page.idlist);
                }
                Err(err) => {
                    warn!(
                        offset = offset,
                        accumulated = pmids.items.len(),
                        error = %err,
                        "PMID page retrieval failed, stopping with partial results"
                    );
                    pmids.failure = Some(err);
                    break;
                }
            }
        }

        info!(
            retrieved = pmids.items.len(),
            pages = pmids.pages_fetched,
            complete = pmids.is_complete(),
            "PMID collection finished"
        );

        Ok(PmidSearch { pmids, session })
    }

    async fn esearch(
        &self,
        term: &str,
        retstart: usize,
        retmax: usize,
        session: Option<&HistorySession>,
    ) -> Result<super::responses::ESearchData> {
        let mut url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retstart={}&retmode=json&usehistory=y",
            self.base_url,
            urlencoding::encode(term),
            retmax,
            retstart
        );
        if let Some(session) = session {
            url.push_str(&format!(
                "&WebEnv={}",
                urlencoding::encode(&session.webenv)
            ));
        }

        debug!(retstart = retstart, "Making ESearch request");
        let response = self.make_request(&url).await?;
        let result: ESearchResult = response.json().await?;
        Ok(result.esearchresult)
    }

    /// Upload an identifier list to the history server via EPost
    ///
    /// `db` is the target database (`pubmed` or `pmc`); identifiers must be
    /// bare numeric strings. The returned session seeds paged EFetch calls.
    #[instrument(skip(self, ids), fields(db = db, id_count = ids.len()))]
    pub async fn epost(&self, db: &str, ids: &[String]) -> Result<HistorySession> {
        if ids.is_empty() {
            return Err(CorpusError::InvalidQuery(
                "identifier list cannot be empty for EPost".to_string(),
            ));
        }

        // Validate all identifiers before touching the network
        for id in ids {
            if id.trim().is_empty() || !id.trim().chars().all(|c| c.is_ascii_digit()) {
                return Err(CorpusError::InvalidPmid { pmid: id.clone() });
            }
        }

        let id_list = ids
            .iter()
            .map(|id| id.trim())
            .collect::<Vec<_>>()
            .join(",");

        let mut params = vec![
            ("db".to_string(), db.to_string()),
            ("id".to_string(), id_list),
            ("retmode".to_string(), "json".to_string()),
        ];
        params.extend(self.config.build_api_params());

        let url = format!("{}/epost.fcgi", self.base_url);
        self.rate_limiter.acquire().await?;
        debug!("Making EPost request");
        let response = self.client.post(&url).form(&params).send().await?;
        let response = check_status(response)?;

        let epost: EPostResponse = response.json().await?;
        if let Some(error_msg) = &epost.epostresult.error {
            return Err(CorpusError::ApiError {
                status: 200,
                message: format!("NCBI EPost error: {}", error_msg),
            });
        }

        let session = HistorySession {
            webenv: epost
                .epostresult
                .webenv
                .ok_or(CorpusError::SessionNotAvailable)?,
            query_key: epost
                .epostresult
                .query_key
                .ok_or(CorpusError::SessionNotAvailable)?,
        };

        info!(query_key = %session.query_key, "EPost completed");
        Ok(session)
    }

    /// Fetch one page of MEDLINE-format records from a history session
    pub async fn fetch_medline_page(
        &self,
        session: &HistorySession,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MedlineRecord>> {
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&query_key={}&WebEnv={}&retstart={}&retmax={}&retmode=text&rettype=medline",
            self.base_url,
            urlencoding::encode(&session.query_key),
            urlencoding::encode(&session.webenv),
            offset,
            limit
        );

        debug!(offset = offset, "Making MEDLINE EFetch request");
        let response = self.make_request(&url).await?;
        let text = response.text().await?;
        check_inline_error(&text)?;
        Ok(parse_medline(&text))
    }

    /// Fetch all MEDLINE records for a history session of `total` results
    #[instrument(skip(self, session), fields(total = total))]
    pub async fn fetch_medline(
        &self,
        session: &HistorySession,
        total: usize,
    ) -> Paged<MedlineRecord> {
        let page_size = self.config.page_size;
        paginate(total, page_size, |offset| {
            self.fetch_medline_page(session, offset, page_size)
        })
        .await
    }

    /// Fetch one page of PMC full-text XML from a history session
    ///
    /// Each page is a complete `pmc-articleset` document; the caller merges
    /// the fragments into one collection.
    pub async fn fetch_pmc_page(
        &self,
        session: &HistorySession,
        offset: usize,
        limit: usize,
    ) -> Result<String> {
        let url = format!(
            "{}/efetch.fcgi?db=pmc&query_key={}&WebEnv={}&retstart={}&retmax={}&retmode=xml&rettype=full",
            self.base_url,
            urlencoding::encode(&session.query_key),
            urlencoding::encode(&session.webenv),
            offset,
            limit
        );

        debug!(offset = offset, "Making PMC EFetch request");
        let response = self.make_request(&url).await?;
        let text = response.text().await?;
        check_inline_error(&text)?;
        Ok(text)
    }

    /// Fetch all PMC full-text fragments for a history session of `total`
    /// articles, one fragment per page
    #[instrument(skip(self, session), fields(total = total))]
    pub async fn fetch_pmc_fragments(
        &self,
        session: &HistorySession,
        total: usize,
    ) -> Paged<String> {
        let page_size = self.config.page_size;
        paginate(total, page_size, |offset| async move {
            let fragment = self.fetch_pmc_page(session, offset, page_size).await?;
            Ok(vec![fragment])
        })
        .await
    }

    async fn make_request(&self, url: &str) -> Result<Response> {
        let mut final_url = url.to_string();
        let api_params = self.config.build_api_params();
        if !api_params.is_empty() {
            let separator = if url.contains('?') { '&' } else { '?' };
            final_url.push(separator);
            let params: Vec<String> = api_params
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
                .collect();
            final_url.push_str(&params.join("&"));
        }

        self.rate_limiter.acquire().await?;
        debug!("Making API request to: {}", final_url);
        let response = self.client.get(&final_url).send().await?;
        check_status(response)
    }
}

/// Map non-success statuses to an API error; no transparent retry happens
/// at this layer
fn check_status(response: Response) -> Result<Response> {
    if !response.status().is_success() {
        warn!("API request failed with status: {}", response.status());
        return Err(CorpusError::ApiError {
            status: response.status().as_u16(),
            message: response
                .status()
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }
    Ok(response)
}

/// NCBI sometimes returns 200 OK with an inline error body
fn check_inline_error(text: &str) -> Result<()> {
    if let Some(message) = text
        .split("<ERROR>")
        .nth(1)
        .and_then(|rest| rest.split("</ERROR>").next())
    {
        return Err(CorpusError::ApiError {
            status: 200,
            message: format!("NCBI EFetch error: {}", message.trim()),
        });
    }
    Ok(())
}

//! NCBI E-utilities client for PubMed and PMC retrieval

mod client;
mod responses;

pub use client::EntrezClient;

use crate::fetch::Paged;

/// History server session binding a sequence of paginated requests to one
/// logical search
///
/// The WebEnv value and query key are opaque server-side handles. A session
/// is read-only after acquisition and is reused for every page of the same
/// query; sessions typically expire after an hour of inactivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySession {
    pub webenv: String,
    pub query_key: String,
}

/// Outcome of a paginated PubMed search
#[derive(Debug)]
pub struct PmidSearch {
    /// PMIDs accumulated across pages, with completion status
    pub pmids: Paged<String>,
    /// History session for follow-up fetches against the same result set
    pub session: HistorySession,
}

//! Paginated retrieval against range-limited remote APIs
//!
//! E-utilities report a total result count up front and serve windows of at
//! most `retmax` records bound to a history session. The driver here issues
//! requests at offsets `0, P, 2P, ...` and stops after exactly
//! `ceil(total / P)` pages. A loop that instead advances while
//! `offset < total + page_size - 1` issues one trailing empty request
//! whenever the total is a multiple of the page size; keeping offsets
//! strictly below the total rules that over-fetch out.
//!
//! A transient failure on one page stops the stage with whatever was
//! accumulated so far and the causing error. The caller decides whether a
//! truncated result set is acceptable; no transparent retry happens here.

use std::future::Future;

use tracing::{info, warn};

use crate::error::{CorpusError, Result};

/// Accumulated result of a paginated retrieval
///
/// `items` holds the records merged in server-return order. When a page
/// request failed, `failure` carries the cause and `items` holds the pages
/// retrieved before the failure.
#[derive(Debug)]
pub struct Paged<T> {
    /// Records accumulated across pages, in server-return order
    pub items: Vec<T>,
    /// Size the retrieval was planned against: the server-reported record
    /// total for paginated fetches, or the computed batch count for
    /// batched exports
    pub total: usize,
    /// Number of page requests actually issued
    pub pages_fetched: usize,
    /// Error that truncated the retrieval, if any
    pub failure: Option<CorpusError>,
}

impl<T> Paged<T> {
    /// Whether every page was retrieved without error
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub(crate) fn empty(total: usize) -> Self {
        Self {
            items: Vec::new(),
            total,
            pages_fetched: 0,
            failure: None,
        }
    }

    /// Accumulator for a batched export expected to yield `batch_count`
    /// fragments
    pub(crate) fn for_batches(batch_count: usize) -> Self {
        Self::empty(batch_count)
    }
}

/// Offsets of the page requests needed to cover `total` records
///
/// Yields `0, page_size, 2 * page_size, ...` strictly below `total`,
/// i.e. exactly `ceil(total / page_size)` offsets.
pub fn page_offsets(total: usize, page_size: usize) -> impl Iterator<Item = usize> {
    debug_assert!(page_size > 0, "page size must be positive");
    (0..total).step_by(page_size.max(1))
}

/// Retrieve all pages of a windowed resource
///
/// Calls `fetch_page(offset)` for each offset produced by [`page_offsets`]
/// and accumulates the returned records in order. On the first page error
/// the loop stops and the partial accumulation is returned with the error
/// recorded in [`Paged::failure`].
pub async fn paginate<T, F, Fut>(total: usize, page_size: usize, mut fetch_page: F) -> Paged<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut paged = Paged::empty(total);

    for offset in page_offsets(total, page_size) {
        match fetch_page(offset).await {
            Ok(records) => {
                paged.pages_fetched += 1;
                paged.items.extend(records);
            }
            Err(err) => {
                warn!(
                    offset = offset,
                    accumulated = paged.items.len(),
                    error = %err,
                    "Page retrieval failed, stopping with partial results"
                );
                paged.failure = Some(err);
                return paged;
            }
        }
    }

    info!(
        total = total,
        fetched = paged.items.len(),
        pages = paged.pages_fetched,
        "Paginated retrieval complete"
    );
    paged
}

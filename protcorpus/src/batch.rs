//! Batch partitioning for APIs with per-request identifier caps
//!
//! PubTator Central accepts at most 100 PMIDs per export request and the
//! UniProtKB mapping service at most 1000 accessions, so long identifier
//! lists are split into contiguous batches before submission.

/// Lazy iterator over contiguous batches of at most `batch_size` items
///
/// Covers the input exactly once, in original order, with no overlap.
/// An empty input yields no batches; an input shorter than `batch_size`
/// yields a single batch.
///
/// # Example
///
/// ```
/// use protcorpus::batch::batches;
///
/// let ids = ["1", "2", "3", "4", "5"];
/// let split: Vec<&[&str]> = batches(&ids, 2).collect();
/// assert_eq!(split, vec![&["1", "2"][..], &["3", "4"][..], &["5"][..]]);
/// ```
pub fn batches<T>(items: &[T], batch_size: usize) -> Batches<'_, T> {
    assert!(batch_size > 0, "batch size must be positive");
    Batches {
        remaining: items,
        batch_size,
    }
}

/// Iterator returned by [`batches`]
pub struct Batches<'a, T> {
    remaining: &'a [T],
    batch_size: usize,
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.batch_size.min(self.remaining.len());
        let (batch, rest) = self.remaining.split_at(take);
        self.remaining = rest;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining.len().div_ceil(self.batch_size);
        (len, Some(len))
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}

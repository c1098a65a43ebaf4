//! Token-bucket rate limiting for remote knowledgebase requests
//!
//! NCBI E-utilities allow 3 requests per second without an API key and 10
//! with one; violations can lead to IP blocking. All clients acquire a
//! token before each request. Retrieval is strictly sequential, so the
//! limiter mostly paces the page loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{CorpusError, Result};

/// Rate limiter shared by the clients of one run
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` requests per second
    pub fn new(rate: f64) -> Self {
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Acquire a token, sleeping until one is available
    pub async fn acquire(&self) -> Result<()> {
        let wait = {
            let mut bucket = self.bucket.lock().await;
            bucket.refill();
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                None
            } else {
                Some(Duration::from_secs_f64(1.0 / bucket.refill_rate))
            }
        };

        if let Some(duration) = wait {
            debug!(wait_ms = duration.as_millis(), "Waiting for rate limiter");
            sleep(duration).await;

            let mut bucket = self.bucket.lock().await;
            bucket.refill();
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
            } else {
                return Err(CorpusError::RateLimitExceeded);
            }
        }

        Ok(())
    }

    /// Configured rate in requests per second
    pub async fn rate(&self) -> f64 {
        self.bucket.lock().await.refill_rate
    }
}

impl TokenBucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

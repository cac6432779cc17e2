use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const MAX_CONCURRENCY: usize = 64;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest lifetime a SigV4 presigned URL may have
pub const MAX_LINK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Tuning shared by every service. Immutable once built.
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct EngineSettings {
    /// In-flight provider requests per batch
    #[builder(default = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Upper bound for any single provider call
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    request_timeout: Duration,
    #[builder(default = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    #[builder(default = MAX_LINK_TTL)]
    max_link_ttl: Duration,
}

impl EngineSettings {
    pub fn concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn page_size(&self) -> usize {
        self.page_size.clamp(1, DEFAULT_PAGE_SIZE)
    }

    pub fn max_link_ttl(&self) -> Duration {
        self.max_link_ttl.min(MAX_LINK_TTL)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

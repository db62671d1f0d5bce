use std::time::Duration;

use crate::ProviderId;

/// Request pacing and timeout budget for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub request_timeout: Duration,
}

impl ProviderPolicy {
    /// Financial Modeling Prep starter-plan limits.
    pub fn fmp_default() -> Self {
        Self {
            provider_id: ProviderId::Fmp,
            quota_window: Duration::from_secs(60),
            quota_limit: 300,
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_requests_per_minute(mut self, limit: u32) -> Self {
        self.quota_window = Duration::from_secs(60);
        self.quota_limit = limit.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn request_timeout_ms(&self) -> u64 {
        u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

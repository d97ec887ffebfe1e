use std::num::NonZeroU32;
use std::sync::Arc;

use admitdesk_config::RateLimitConfig;
use admitdesk_core::errors::AppError;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::metrics::track_rate_limited;

/// Token bucket per key (username or mobile number).
#[derive(Clone)]
pub struct KeyedLimiter {
    endpoint: &'static str,
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl KeyedLimiter {
    pub fn new(endpoint: &'static str, per_minute: NonZeroU32, burst: NonZeroU32) -> Self {
        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        Self {
            endpoint,
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Consumes one token for `key`, or fails with 429.
    pub fn check(&self, key: &str) -> Result<(), AppError> {
        let key = key.trim().to_lowercase();
        self.limiter.check_key(&key).map_err(|_| {
            track_rate_limited(self.endpoint);
            tracing::warn!(endpoint = self.endpoint, key = %key, "Rate limit exceeded");
            AppError::too_many_requests("Too many requests. Try again later.".to_string())
        })
    }

    /// Drops buckets that are full again.
    pub fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

impl std::fmt::Debug for KeyedLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedLimiter")
            .field("endpoint", &self.endpoint)
            .field("keys", &self.limiter.len())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct RateLimiters {
    pub login: KeyedLimiter,
    pub otp: KeyedLimiter,
}

impl RateLimiters {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            login: KeyedLimiter::new("login", config.login_per_minute, config.login_burst),
            otp: KeyedLimiter::new("otp", config.otp_per_minute, config.otp_burst),
        }
    }

    pub fn sweep(&self) {
        self.login.sweep();
        self.otp.sweep();
    }
}

//! Rate limiting configuration.
//!
//! Login and OTP endpoints are reachable without a token. Each gets a token
//! bucket keyed by the submitted username or mobile number:
//!
//! - `RATE_LIMIT_LOGIN_PER_MINUTE` (default 10)
//! - `RATE_LIMIT_LOGIN_BURST` (default 5)
//! - `RATE_LIMIT_OTP_PER_MINUTE` (default 2)
//! - `RATE_LIMIT_OTP_BURST` (default 3)
//!
//! Zero values are clamped to one.

use std::num::NonZeroU32;

use crate::env::parse_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub login_per_minute: NonZeroU32,
    pub login_burst: NonZeroU32,
    pub otp_per_minute: NonZeroU32,
    pub otp_burst: NonZeroU32,
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_per_minute: non_zero(10),
            login_burst: non_zero(5),
            otp_per_minute: non_zero(2),
            otp_burst: non_zero(3),
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            login_per_minute: non_zero(parse_or("RATE_LIMIT_LOGIN_PER_MINUTE", 10)),
            login_burst: non_zero(parse_or("RATE_LIMIT_LOGIN_BURST", 5)),
            otp_per_minute: non_zero(parse_or("RATE_LIMIT_OTP_PER_MINUTE", 2)),
            otp_burst: non_zero(parse_or("RATE_LIMIT_OTP_BURST", 3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.login_per_minute.get(), 10);
        assert_eq!(config.login_burst.get(), 5);
        assert_eq!(config.otp_per_minute.get(), 2);
        assert_eq!(config.otp_burst.get(), 3);
    }

    #[test]
    fn test_zero_is_clamped() {
        assert_eq!(non_zero(0).get(), 1);
    }

    #[test]
    fn test_config_clone() {
        let config = RateLimitConfig::default();
        assert_eq!(config.clone(), config);
    }
}

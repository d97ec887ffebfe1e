use std::time::Duration;

use crate::env::parse_or;

/// One-time password policy for mobile verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpConfig {
    /// How long a code stays valid.
    pub expiry: Duration,
    /// Sends allowed per mobile number inside one expiry window.
    pub max_attempts: u32,
    /// Wrong codes tolerated before the entry is discarded.
    pub max_failed_checks: u32,
    /// Interval of the background sweep removing expired entries.
    pub sweep_interval: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(5 * 60),
            max_attempts: 3,
            max_failed_checks: 5,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl OtpConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expiry: Duration::from_secs(parse_or(
                "OTP_EXPIRY_SECONDS",
                defaults.expiry.as_secs(),
            )),
            max_attempts: parse_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            max_failed_checks: parse_or("OTP_MAX_FAILED_CHECKS", defaults.max_failed_checks),
            sweep_interval: Duration::from_secs(parse_or(
                "OTP_SWEEP_INTERVAL_SECONDS",
                defaults.sweep_interval.as_secs(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = OtpConfig::default();
        assert_eq!(config.expiry, Duration::from_secs(300));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_failed_checks, 5);
    }
}

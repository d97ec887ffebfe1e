//! Process-local OTP entries keyed by mobile number.
//!
//! Entries are not persisted; a restart forgets every pending code. Expired
//! entries are dropped when read and by [`OtpStore::sweep`].

use std::collections::HashMap;
use std::time::Instant;

use admitdesk_config::OtpConfig;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct OtpEntry {
    /// `None` while a send is in flight or after the code was burned by
    /// failed checks.
    otp: Option<String>,
    expires_at: Instant,
    /// Codes sent in the current window.
    attempts: u32,
    failed_checks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    NotRequested,
    Expired,
    Mismatch,
}

#[derive(Debug)]
pub struct OtpStore {
    config: OtpConfig,
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl OtpStore {
    pub fn new(config: OtpConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Counts a send against `mobile`'s window. Returns false, and counts
    /// nothing, when the window already holds the maximum number of sends.
    pub async fn reserve_send(&self, mobile: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;
        if entries.get(mobile).is_some_and(|e| e.expires_at <= now) {
            entries.remove(mobile);
        }

        match entries.get_mut(mobile) {
            Some(entry) if entry.attempts >= self.config.max_attempts => false,
            Some(entry) => {
                entry.attempts += 1;
                true
            }
            None => {
                entries.insert(
                    mobile.to_string(),
                    OtpEntry {
                        otp: None,
                        expires_at: now + self.config.expiry,
                        attempts: 1,
                        failed_checks: 0,
                    },
                );
                true
            }
        }
    }

    /// Gives back a reservation whose code was never delivered.
    pub async fn release_send(&self, mobile: &str) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(mobile) else {
            return;
        };
        entry.attempts = entry.attempts.saturating_sub(1);
        if entry.attempts == 0 && entry.otp.is_none() {
            entries.remove(mobile);
        }
    }

    /// Stores a delivered code for a reserved send, replacing any previous
    /// code and restarting the expiry.
    pub async fn record_sent(&self, mobile: &str, otp: String, now: Instant) {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(mobile.to_string()).or_insert(OtpEntry {
            otp: None,
            expires_at: now,
            attempts: 1,
            failed_checks: 0,
        });
        entry.otp = Some(otp);
        entry.expires_at = now + self.config.expiry;
        entry.failed_checks = 0;
    }

    /// Checks a submitted code. A verified or expired entry is removed. At
    /// the failed check limit only the code is burned; the send count stays
    /// until the window expires.
    pub async fn verify(&self, mobile: &str, otp: &str, now: Instant) -> VerifyOutcome {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(mobile) else {
            return VerifyOutcome::NotRequested;
        };

        if entry.expires_at <= now {
            entries.remove(mobile);
            return VerifyOutcome::Expired;
        }

        let Some(expected) = entry.otp.as_deref() else {
            return VerifyOutcome::NotRequested;
        };

        if expected != otp {
            entry.failed_checks += 1;
            if entry.failed_checks >= self.config.max_failed_checks {
                entry.otp = None;
            }
            return VerifyOutcome::Mismatch;
        }

        entries.remove(mobile);
        VerifyOutcome::Verified
    }

    /// Removes expired entries and returns how many were dropped.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn store() -> OtpStore {
        OtpStore::new(OtpConfig::default())
    }

    const MOBILE: &str = "9876543210";

    async fn send(store: &OtpStore, otp: &str, now: Instant) -> bool {
        if !store.reserve_send(MOBILE, now).await {
            return false;
        }
        store.record_sent(MOBILE, otp.to_string(), now).await;
        true
    }

    #[tokio::test]
    async fn test_fourth_send_in_window_is_refused() {
        let store = store();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(send(&store, "111111", now).await);
        }
        assert!(!store.reserve_send(MOBILE, now).await);
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let store = store();
        let now = Instant::now();
        for _ in 0..3 {
            send(&store, "111111", now).await;
        }

        let later = now + Duration::from_secs(301);
        assert!(send(&store, "222222", later).await);
        assert!(store.reserve_send(MOBILE, later).await);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_respect_limit() {
        let store = Arc::new(store());
        let now = Instant::now();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.reserve_send(MOBILE, now).await })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 3);
    }

    #[tokio::test]
    async fn test_released_reservation_is_not_counted() {
        let store = store();
        let now = Instant::now();

        assert!(store.reserve_send(MOBILE, now).await);
        store.release_send(MOBILE).await;
        assert_eq!(store.len().await, 0);

        for _ in 0..3 {
            assert!(send(&store, "111111", now).await);
        }
    }

    #[tokio::test]
    async fn test_verify_once() {
        let store = store();
        let now = Instant::now();
        send(&store, "123456", now).await;

        assert_eq!(
            store.verify(MOBILE, "123456", now).await,
            VerifyOutcome::Verified
        );
        assert_eq!(
            store.verify(MOBILE, "123456", now).await,
            VerifyOutcome::NotRequested
        );
    }

    #[tokio::test]
    async fn test_expired_code_is_removed() {
        let store = store();
        let now = Instant::now();
        send(&store, "123456", now).await;

        let later = now + Duration::from_secs(300);
        assert_eq!(
            store.verify(MOBILE, "123456", later).await,
            VerifyOutcome::Expired
        );
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_repeated_mismatches_burn_code() {
        let store = store();
        let now = Instant::now();
        send(&store, "123456", now).await;

        for _ in 0..5 {
            assert_eq!(
                store.verify(MOBILE, "000000", now).await,
                VerifyOutcome::Mismatch
            );
        }
        assert_eq!(
            store.verify(MOBILE, "123456", now).await,
            VerifyOutcome::NotRequested
        );

        // A fresh code works again
        assert!(send(&store, "654321", now).await);
        assert_eq!(
            store.verify(MOBILE, "654321", now).await,
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn test_failed_checks_keep_send_limit() {
        let store = store();
        let now = Instant::now();
        for _ in 0..3 {
            send(&store, "123456", now).await;
        }

        for _ in 0..5 {
            store.verify(MOBILE, "000000", now).await;
        }
        assert!(!store.reserve_send(MOBILE, now).await);
        assert!(
            store
                .reserve_send(MOBILE, now + Duration::from_secs(301))
                .await
        );
    }

    #[tokio::test]
    async fn test_sweep_drops_only_expired() {
        let store = store();
        let now = Instant::now();
        store.reserve_send("1111111111", now).await;
        store.record_sent("1111111111", "1".to_string(), now).await;
        let later = now + Duration::from_secs(200);
        store.reserve_send("2222222222", later).await;
        store.record_sent("2222222222", "2".to_string(), later).await;

        let removed = store.sweep(now + Duration::from_secs(301)).await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
    }
}

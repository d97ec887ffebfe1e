use std::time::Instant;

use admitdesk_core::errors::AppError;
use admitdesk_models::otp::OtpResponse;
use admitdesk_models::students::is_valid_mobile;
use anyhow::anyhow;
use rand::Rng;
use tracing::instrument;

use crate::metrics::{track_otp_sent, track_otp_verification};
use crate::modules::otp::store::{OtpStore, VerifyOutcome};
use crate::utils::rate_limit::KeyedLimiter;
use crate::utils::sms::SmsGateway;

fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

fn ok(message: &str) -> OtpResponse {
    OtpResponse {
        success: true,
        message: message.to_string(),
    }
}

pub struct OtpService;

impl OtpService {
    #[instrument(skip(store, sms, limiter))]
    pub async fn send_otp(
        store: &OtpStore,
        sms: &dyn SmsGateway,
        limiter: &KeyedLimiter,
        mobile: &str,
    ) -> Result<OtpResponse, AppError> {
        let mobile = mobile.trim();
        if !is_valid_mobile(mobile) {
            return Err(AppError::bad_request(anyhow!("Invalid mobile number")));
        }

        if !store.reserve_send(mobile, Instant::now()).await {
            return Err(AppError::too_many_requests(
                "Too many OTP requests. Try again later.".to_string(),
            ));
        }
        if let Err(e) = limiter.check(mobile) {
            store.release_send(mobile).await;
            return Err(e);
        }

        let otp = generate_otp();
        if let Err(e) = sms.send_otp(mobile, &otp).await {
            store.release_send(mobile).await;
            track_otp_sent(false);
            return Err(e);
        }

        store.record_sent(mobile, otp, Instant::now()).await;
        track_otp_sent(true);

        Ok(ok("OTP sent successfully!"))
    }

    #[instrument(skip(store, otp))]
    pub async fn verify_otp(
        store: &OtpStore,
        mobile: &str,
        otp: &str,
    ) -> Result<OtpResponse, AppError> {
        let (mobile, otp) = (mobile.trim(), otp.trim());
        if mobile.is_empty() || otp.is_empty() {
            return Err(AppError::bad_request(anyhow!("Mobile and OTP required")));
        }

        let outcome = store.verify(mobile, otp, Instant::now()).await;
        let label = match outcome {
            VerifyOutcome::Verified => "verified",
            VerifyOutcome::NotRequested => "not_requested",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::Mismatch => "mismatch",
        };
        track_otp_verification(label);

        match outcome {
            VerifyOutcome::Verified => Ok(ok("OTP verified successfully!")),
            VerifyOutcome::NotRequested => {
                Err(AppError::bad_request(anyhow!("OTP expired or not requested")))
            }
            VerifyOutcome::Expired => {
                Err(AppError::bad_request(anyhow!("OTP expired. Generate new one.")))
            }
            VerifyOutcome::Mismatch => Err(AppError::bad_request(anyhow!("Invalid OTP. Try again."))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_config::OtpConfig;
    use async_trait::async_trait;
    use std::num::NonZeroU32;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingSms {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SmsGateway for CapturingSms {
        async fn send_otp(&self, mobile: &str, otp: &str) -> Result<(), AppError> {
            self.sent
                .lock()
                .unwrap()
                .push((mobile.to_string(), otp.to_string()));
            Ok(())
        }
    }

    struct FailingSms;

    #[async_trait]
    impl SmsGateway for FailingSms {
        async fn send_otp(&self, _: &str, _: &str) -> Result<(), AppError> {
            Err(AppError::internal_error("Invalid Numbers".to_string()))
        }
    }

    fn limiter() -> KeyedLimiter {
        let n = NonZeroU32::new(100).unwrap();
        KeyedLimiter::new("otp", n, n)
    }

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_send_then_verify() {
        let store = OtpStore::new(OtpConfig::default());
        let sms = CapturingSms::default();

        let res = OtpService::send_otp(&store, &sms, &limiter(), "9876543210")
            .await
            .unwrap();
        assert_eq!(res.message, "OTP sent successfully!");

        let otp = sms.sent.lock().unwrap()[0].1.clone();
        let res = OtpService::verify_otp(&store, "9876543210", &otp)
            .await
            .unwrap();
        assert_eq!(res.message, "OTP verified successfully!");
    }

    #[tokio::test]
    async fn test_invalid_mobile() {
        let store = OtpStore::new(OtpConfig::default());
        let err = OtpService::send_otp(&store, &CapturingSms::default(), &limiter(), "12345")
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(err.error.to_string(), "Invalid mobile number");
    }

    #[tokio::test]
    async fn test_gateway_failure_does_not_store() {
        let store = OtpStore::new(OtpConfig::default());
        let err = OtpService::send_otp(&store, &FailingSms, &limiter(), "9876543210")
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 500);
        assert_eq!(err.error.to_string(), "Invalid Numbers");
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_sends_stop_at_limit() {
        let store = std::sync::Arc::new(OtpStore::new(OtpConfig::default()));
        let sms = std::sync::Arc::new(CapturingSms::default());
        let limiter = std::sync::Arc::new(limiter());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (store, sms, limiter) = (store.clone(), sms.clone(), limiter.clone());
                tokio::spawn(async move {
                    OtpService::send_otp(&store, sms.as_ref(), &limiter, "9876543210").await
                })
            })
            .collect();

        let mut refused = 0;
        for handle in handles {
            if let Err(err) = handle.await.unwrap() {
                assert_eq!(err.status.as_u16(), 429);
                refused += 1;
            }
        }
        assert_eq!(refused, 5);
        assert_eq!(sms.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_wrong_guesses_do_not_lift_send_limit() {
        let store = OtpStore::new(OtpConfig::default());
        let sms = CapturingSms::default();
        for _ in 0..3 {
            OtpService::send_otp(&store, &sms, &limiter(), "9876543210")
                .await
                .unwrap();
        }

        for _ in 0..5 {
            let _ = OtpService::verify_otp(&store, "9876543210", "000000").await;
        }

        let err = OtpService::send_otp(&store, &sms, &limiter(), "9876543210")
            .await
            .unwrap_err();
        assert_eq!(err.error.to_string(), "Too many OTP requests. Try again later.");
    }

    #[tokio::test]
    async fn test_verify_requires_both_fields() {
        let store = OtpStore::new(OtpConfig::default());
        let err = OtpService::verify_otp(&store, "9876543210", "")
            .await
            .unwrap_err();
        assert_eq!(err.error.to_string(), "Mobile and OTP required");
    }
}

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{NewLoginLog, Store};
use crate::services::challenge_store::{Challenge, ChallengeStore, VerifyOutcome};
use crate::services::notify::Mailer;
use crate::services::otp_service::{ClientInfo, OtpError, OtpService, VerifiedLogin};
use crate::services::token_service::{TokenKind, TokenService};
use crate::services::useragent;

const CHALLENGE_TTL_MINUTES: i64 = 10;

/// OTP login flow backed by the relational store for identities, the
/// in-process challenge table for codes and the mailer for delivery.
pub struct DefaultOtpService {
    store: Store,
    challenges: Arc<ChallengeStore>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
}

impl DefaultOtpService {
    #[must_use]
    pub fn new(
        store: Store,
        challenges: Arc<ChallengeStore>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            challenges,
            tokens,
            mailer,
        }
    }

    /// Six decimal digits, uniform over [100000, 999999].
    fn generate_code() -> String {
        let code: u32 = rand::rng().random_range(100_000..=999_999);
        code.to_string()
    }

    async fn lookup_active_registrant(
        &self,
        email: &str,
    ) -> Result<crate::entities::registrations::Model, OtpError> {
        let registrant = self
            .store
            .get_registration_by_email(email)
            .await
            .map_err(|e| OtpError::Database(e.to_string()))?
            .ok_or(OtpError::NotRegistered)?;

        if registrant.status == "blocked" {
            return Err(OtpError::Blocked);
        }

        Ok(registrant)
    }
}

#[async_trait]
impl OtpService for DefaultOtpService {
    async fn request_challenge(&self, email: &str) -> Result<String, OtpError> {
        let registrant = self.lookup_active_registrant(email).await?;

        let code = Self::generate_code();
        self.challenges.put(
            &registrant.email,
            Challenge {
                code: code.clone(),
                expires_at: Utc::now() + Duration::minutes(CHALLENGE_TTL_MINUTES),
            },
        );

        info!(email = %registrant.email, "Issued login code");

        // Mail delivery is best effort. The challenge is already live, so a
        // transport failure must not fail the request.
        if let Err(e) = self.mailer.send_login_code(&registrant.email, &code).await {
            warn!(email = %registrant.email, error = %e, "Failed to send login code email");
        }

        Ok(code)
    }

    async fn verify_challenge(
        &self,
        email: &str,
        code: &str,
        client: &ClientInfo,
    ) -> Result<VerifiedLogin, OtpError> {
        let registrant = self.lookup_active_registrant(email).await?;

        match self
            .challenges
            .verify_and_consume(&registrant.email, code, Utc::now())
        {
            VerifyOutcome::Consumed => {}
            VerifyOutcome::NoChallenge => return Err(OtpError::NoChallenge),
            VerifyOutcome::Expired => return Err(OtpError::Expired),
            VerifyOutcome::Mismatch => return Err(OtpError::Mismatch),
        }

        let agent = useragent::classify(client.user_agent.as_deref().unwrap_or(""));
        let log = NewLoginLog {
            email: registrant.email.clone(),
            user_agent: client.user_agent.clone(),
            browser: agent.browser,
            os: agent.os,
            device: agent.device,
            ip: client.ip.clone(),
        };

        // The login itself already succeeded; a lost audit row is logged,
        // not surfaced.
        if let Err(e) = self.store.add_login_log(&log).await {
            warn!(email = %registrant.email, error = %e, "Failed to record login");
        }

        let token = self
            .tokens
            .mint(TokenKind::Registrant, &registrant.email)
            .map_err(|e| OtpError::Internal(e.to_string()))?;

        info!(email = %registrant.email, "Registrant logged in");

        Ok(VerifiedLogin {
            token,
            name: registrant.name,
            email: registrant.email,
        })
    }
}

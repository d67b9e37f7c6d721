use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("email is not registered")]
    NotRegistered,

    #[error("account is blocked")]
    Blocked,

    #[error("no active code for this email")]
    NoChallenge,

    #[error("code has expired")]
    Expired,

    #[error("incorrect code")]
    Mismatch,

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Request metadata captured for the login audit trail.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// A successful OTP verification: a freshly minted session token plus the
/// registrant's profile basics for the client to display.
#[derive(Debug, Clone)]
pub struct VerifiedLogin {
    pub token: String,
    pub name: String,
    pub email: String,
}

/// One-time-code login flow for registrants.
#[async_trait]
pub trait OtpService: Send + Sync {
    /// Issues a fresh challenge for a registered, non-blocked email and
    /// dispatches it by mail. Returns the code so the caller can decide
    /// whether to echo it (development only).
    async fn request_challenge(&self, email: &str) -> Result<String, OtpError>;

    /// Verifies a submitted code, consumes the challenge, records the login
    /// and mints a registrant session token.
    async fn verify_challenge(
        &self,
        email: &str,
        code: &str,
        client: &ClientInfo,
    ) -> Result<VerifiedLogin, OtpError>;
}

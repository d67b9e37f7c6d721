//! Stateless bearer tokens for the two client populations.
//!
//! Registrant and admin tokens are signed with separate secrets, so a token
//! minted for one surface can never authenticate against the other even if
//! the claim shapes are identical.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Which population a token authenticates. The two keyspaces are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Registrant,
    Admin,
}

pub struct TokenService {
    registrant_encoding: EncodingKey,
    registrant_decoding: DecodingKey,
    admin_encoding: EncodingKey,
    admin_decoding: DecodingKey,
    registrant_lifetime: Duration,
    admin_lifetime: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(
        registrant_secret: &str,
        admin_secret: &str,
        registrant_token_hours: i64,
        admin_token_hours: i64,
    ) -> Self {
        Self {
            registrant_encoding: EncodingKey::from_secret(registrant_secret.as_bytes()),
            registrant_decoding: DecodingKey::from_secret(registrant_secret.as_bytes()),
            admin_encoding: EncodingKey::from_secret(admin_secret.as_bytes()),
            admin_decoding: DecodingKey::from_secret(admin_secret.as_bytes()),
            registrant_lifetime: Duration::hours(registrant_token_hours),
            admin_lifetime: Duration::hours(admin_token_hours),
        }
    }

    /// Mints a signed token carrying the subject email, lowercased.
    pub fn mint(&self, kind: TokenKind, email: &str) -> Result<String, TokenError> {
        let (key, lifetime) = match kind {
            TokenKind::Registrant => (&self.registrant_encoding, self.registrant_lifetime),
            TokenKind::Admin => (&self.admin_encoding, self.admin_lifetime),
        };

        let claims = Claims {
            sub: email.to_lowercase(),
            exp: (Utc::now() + lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, key).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature and expiry, returning the subject email.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<String, TokenError> {
        let key = match kind {
            TokenKind::Registrant => &self.registrant_decoding,
            TokenKind::Admin => &self.admin_decoding,
        };

        let data = decode::<Claims>(token, key, &Validation::default()).map_err(|e| {
            if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) {
                TokenError::Expired
            } else {
                TokenError::Invalid(e.to_string())
            }
        })?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("registrant-secret", "admin-secret", 24, 8)
    }

    #[test]
    fn round_trips_the_subject() {
        let svc = service();
        let token = svc.mint(TokenKind::Registrant, "Alice@Example.com").unwrap();
        let subject = svc.verify(TokenKind::Registrant, &token).unwrap();
        assert_eq!(subject, "alice@example.com");
    }

    #[test]
    fn populations_are_disjoint() {
        let svc = service();

        let registrant = svc.mint(TokenKind::Registrant, "a@example.com").unwrap();
        assert!(svc.verify(TokenKind::Admin, &registrant).is_err());

        let admin = svc.mint(TokenKind::Admin, "admin@example.com").unwrap();
        assert!(svc.verify(TokenKind::Registrant, &admin).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let svc = service();
        assert!(svc.verify(TokenKind::Registrant, "not-a-token").is_err());
    }
}

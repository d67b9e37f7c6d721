//! Outbound registrant email.
//!
//! Delivery goes through an HTTP mail API. Every send is a single attempt
//! with a hard timeout; callers decide whether a failure matters (for login
//! codes and confirmations it never does, the failure is logged and the
//! request proceeds).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::EmailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a one-time login code to the registrant.
    async fn send_login_code(&self, to: &str, code: &str) -> Result<()>;

    /// Sends the post-registration confirmation, with a link back into the
    /// event portal.
    async fn send_registration_confirmation(&self, to: &str, name: &str) -> Result<()>;
}

/// Mailer backed by a JSON-over-HTTP transactional mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
    from_name: String,
    portal_url: String,
}

impl HttpMailer {
    pub fn new(email: &EmailConfig, portal_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(email.request_timeout_seconds.into()))
            .build()
            .context("Failed to build mail HTTP client")?;

        Ok(Self {
            client,
            api_url: email.api_url.clone(),
            api_key: email.api_key.clone(),
            from_address: email.from_address.clone(),
            from_name: email.from_name.clone(),
            portal_url: portal_url.to_string(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let body = json!({
            "from": { "email": self.from_address, "name": self.from_name },
            "to": [{ "email": to }],
            "subject": subject,
            "html": html,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Mail API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API returned {status}: {detail}");
        }

        debug!(%to, %subject, "Email dispatched");
        Ok(())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_login_code(&self, to: &str, code: &str) -> Result<()> {
        self.send(to, "Your login code", &login_code_html(code)).await
    }

    async fn send_registration_confirmation(&self, to: &str, name: &str) -> Result<()> {
        let link = portal_login_link(&self.portal_url, to);
        self.send(
            to,
            "Registration confirmed",
            &confirmation_html(name, &link),
        )
        .await
    }
}

/// Mailer that records sends at debug level and delivers nothing. Used when
/// email is disabled in config and throughout the test suite.
#[derive(Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_login_code(&self, to: &str, _code: &str) -> Result<()> {
        debug!(%to, "Email disabled; skipping login code delivery");
        Ok(())
    }

    async fn send_registration_confirmation(&self, to: &str, _name: &str) -> Result<()> {
        debug!(%to, "Email disabled; skipping confirmation delivery");
        Ok(())
    }
}

fn portal_login_link(portal_url: &str, email: &str) -> String {
    format!(
        "{}/login?email={}",
        portal_url.trim_end_matches('/'),
        urlencoding::encode(email)
    )
}

fn login_code_html(code: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 480px;\">\
         <h2>Your login code</h2>\
         <p>Use this code to sign in. It expires in 10 minutes.</p>\
         <p style=\"font-size: 32px; letter-spacing: 8px; font-weight: bold;\">{code}</p>\
         <p>If you did not request this code, you can ignore this email.</p>\
         </div>"
    )
}

fn confirmation_html(name: &str, portal_link: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 480px;\">\
         <h2>You're registered!</h2>\
         <p>Hi {name}, your registration is confirmed.</p>\
         <p><a href=\"{portal_link}\">Open the event portal</a> to access \
         videos and materials once the event begins.</p>\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_link_encodes_the_email() {
        let link = portal_login_link("https://portal.example.com/", "a+b@example.com");
        assert_eq!(
            link,
            "https://portal.example.com/login?email=a%2Bb%40example.com"
        );
    }

    #[test]
    fn login_code_html_embeds_the_code() {
        assert!(login_code_html("123456").contains("123456"));
    }
}

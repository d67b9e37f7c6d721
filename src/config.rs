use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub email: EmailConfig,

    pub content: ContentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/eventgate.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Public base URL of the registrant-facing frontend, used in
    /// confirmation emails to build the portal link.
    pub frontend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Signing secret for registrant session tokens.
    pub registrant_secret: String,

    /// Signing secret for admin session tokens. Must differ from
    /// `registrant_secret`; the disjoint secrets are what keep the two token
    /// kinds non-interchangeable. Also gates the /admin/create bootstrap.
    pub admin_secret: String,

    /// Registrant token lifetime in hours (default: 24)
    pub registrant_token_hours: i64,

    /// Admin token lifetime in hours (default: 8)
    pub admin_token_hours: i64,

    /// When true, /auth/request-otp echoes the issued code in the response
    /// body. LOCAL TESTING ONLY; never enable on a reachable deployment.
    pub expose_otp_in_response: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            registrant_secret: "change-me-registrant".to_string(),
            admin_secret: "change-me-admin".to_string(),
            registrant_token_hours: 24,
            admin_token_hours: 8,
            expose_otp_in_response: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,

    /// HTTP email API endpoint (messages are POSTed as JSON).
    pub api_url: String,

    pub api_key: String,

    pub from_address: String,

    pub from_name: String,

    /// Request timeout in seconds (default: 20)
    pub request_timeout_seconds: u32,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.example-mailer.com/v1/send".to_string(),
            api_key: "change-me".to_string(),
            from_address: "events@example.com".to_string(),
            from_name: "Event App".to_string(),
            request_timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Default content URLs, overridable per key by admins at runtime.
    pub videos_url: String,

    pub pdf_url: String,

    pub feedback_url: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            videos_url: String::new(),
            pdf_url: String::new(),
            feedback_url: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets and content URLs can come from the environment instead of the
    /// config file, which keeps them out of checked-in config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EVENTGATE_JWT_SECRET") {
            self.auth.registrant_secret = v;
        }
        if let Ok(v) = std::env::var("EVENTGATE_JWT_ADMIN_SECRET") {
            self.auth.admin_secret = v;
        }
        if let Ok(v) = std::env::var("EVENTGATE_EMAIL_API_KEY") {
            self.email.api_key = v;
        }
        if let Ok(v) = std::env::var("EVENTGATE_VIDEOS_URL") {
            self.content.videos_url = v;
        }
        if let Ok(v) = std::env::var("EVENTGATE_PDF_URL") {
            self.content.pdf_url = v;
        }
        if let Ok(v) = std::env::var("EVENTGATE_FEEDBACK_URL") {
            self.content.feedback_url = v;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("eventgate").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".eventgate").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.registrant_secret == self.auth.admin_secret {
            anyhow::bail!("Registrant and admin token secrets must differ");
        }

        if self.email.enabled && self.email.api_url.is_empty() {
            anyhow::bail!("Email API URL cannot be empty when email is enabled");
        }

        if self.auth.registrant_token_hours <= 0 || self.auth.admin_token_hours <= 0 {
            anyhow::bail!("Token lifetimes must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.registrant_token_hours, 24);
        assert_eq!(config.auth.admin_token_hours, 8);
        assert!(!config.auth.expose_otp_in_response);
        assert_eq!(config.email.request_timeout_seconds, 20);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[auth]"));
        assert!(toml_str.contains("[email]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            registrant_token_hours = 12
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.registrant_token_hours, 12);

        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_rejects_shared_secret() {
        let mut config = Config::default();
        config.auth.registrant_secret = "same".to_string();
        config.auth.admin_secret = "same".to_string();
        assert!(config.validate().is_err());
    }
}

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ChallengeStore, DefaultOtpService, HttpMailer, Mailer, NoopMailer, OtpService, TokenService,
};

/// Everything the request handlers need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub challenges: Arc<ChallengeStore>,

    pub tokens: Arc<TokenService>,

    pub mailer: Arc<dyn Mailer>,

    pub otp: Arc<dyn OtpService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let challenges = Arc::new(ChallengeStore::new());

        let tokens = Arc::new(TokenService::new(
            &config.auth.registrant_secret,
            &config.auth.admin_secret,
            config.auth.registrant_token_hours,
            config.auth.admin_token_hours,
        ));

        let mailer: Arc<dyn Mailer> = if config.email.enabled {
            Arc::new(HttpMailer::new(&config.email, &config.server.frontend_url)?)
        } else {
            Arc::new(NoopMailer)
        };

        let otp: Arc<dyn OtpService> = Arc::new(DefaultOtpService::new(
            store.clone(),
            challenges.clone(),
            tokens.clone(),
            mailer.clone(),
        ));

        Ok(Arc::new(Self {
            config,
            store,
            challenges,
            tokens,
            mailer,
            otp,
        }))
    }
}

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{content_config, login_logs, registrations};

pub mod migrator;
pub mod repositories;

pub use repositories::admin::Admin;
pub use repositories::login_log::{LoginLogFilter, NewLoginLog};
pub use repositories::registration::{NewRegistration, RegistrationFilter};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory database gets its own
        // database, so the pool must stay at a single connection there.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn registration_repo(&self) -> repositories::registration::RegistrationRepository {
        repositories::registration::RegistrationRepository::new(self.conn.clone())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn login_log_repo(&self) -> repositories::login_log::LoginLogRepository {
        repositories::login_log::LoginLogRepository::new(self.conn.clone())
    }

    fn content_log_repo(&self) -> repositories::content_log::ContentLogRepository {
        repositories::content_log::ContentLogRepository::new(self.conn.clone())
    }

    fn content_config_repo(&self) -> repositories::content_config::ContentConfigRepository {
        repositories::content_config::ContentConfigRepository::new(self.conn.clone())
    }

    // ========== Registrations ==========

    pub async fn create_registration(
        &self,
        input: &NewRegistration,
    ) -> Result<registrations::Model> {
        self.registration_repo().create(input).await
    }

    pub async fn get_registration_by_email(
        &self,
        email: &str,
    ) -> Result<Option<registrations::Model>> {
        self.registration_repo().find_by_email(email).await
    }

    pub async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<registrations::Model>, u64)> {
        self.registration_repo()
            .list_filtered(filter, page, page_size)
            .await
    }

    pub async fn list_all_registrations(&self) -> Result<Vec<registrations::Model>> {
        self.registration_repo().list_all().await
    }

    pub async fn update_registration_status(
        &self,
        id: i32,
        status: &str,
    ) -> Result<Option<registrations::Model>> {
        self.registration_repo().update_status(id, status).await
    }

    pub async fn registration_count(&self) -> Result<u64> {
        self.registration_repo().count().await
    }

    pub async fn blocked_registration_count(&self) -> Result<u64> {
        self.registration_repo().count_blocked().await
    }

    pub async fn registrations_by_ticket_type(&self) -> Result<Vec<(String, i64)>> {
        self.registration_repo().count_by_ticket_type().await
    }

    // ========== Admins ==========

    pub async fn get_admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        self.admin_repo().find_by_email(email).await
    }

    pub async fn create_admin(&self, email: &str, name: &str, password: &str) -> Result<Admin> {
        self.admin_repo().create(email, name, password).await
    }

    pub async fn verify_admin_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Admin>> {
        self.admin_repo().verify_password(email, password).await
    }

    // ========== Login logs ==========

    pub async fn add_login_log(&self, log: &NewLoginLog) -> Result<()> {
        self.login_log_repo().add(log).await
    }

    pub async fn list_login_logs(
        &self,
        filter: &LoginLogFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<login_logs::Model>, u64)> {
        self.login_log_repo()
            .list_filtered(filter, page, page_size)
            .await
    }

    pub async fn list_all_login_logs(&self) -> Result<Vec<login_logs::Model>> {
        self.login_log_repo().list_all().await
    }

    pub async fn login_count(&self) -> Result<u64> {
        self.login_log_repo().count().await
    }

    pub async fn unique_login_count(&self) -> Result<u64> {
        self.login_log_repo().count_distinct_emails().await
    }

    pub async fn login_times_since(&self, cutoff: &str) -> Result<Vec<String>> {
        self.login_log_repo().login_times_since(cutoff).await
    }

    // ========== Content ==========

    pub async fn add_content_log(&self, email: &str, content_type: &str) -> Result<()> {
        self.content_log_repo().add(email, content_type).await
    }

    pub async fn upsert_content_url(&self, key: &str, url: &str, updated_by: &str) -> Result<()> {
        self.content_config_repo()
            .upsert(key, url, updated_by)
            .await
    }

    pub async fn list_content_config(&self) -> Result<Vec<content_config::Model>> {
        self.content_config_repo().list_all().await
    }
}

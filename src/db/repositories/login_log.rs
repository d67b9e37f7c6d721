use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{login_logs, prelude::*};

/// Client metadata captured alongside a successful login.
#[derive(Debug, Clone)]
pub struct NewLoginLog {
    pub email: String,
    pub user_agent: Option<String>,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginLogFilter {
    /// Substring match against the email.
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub struct LoginLogRepository {
    conn: DatabaseConnection,
}

impl LoginLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, log: &NewLoginLog) -> Result<()> {
        let active = login_logs::ActiveModel {
            email: Set(log.email.to_lowercase()),
            login_time: Set(chrono::Utc::now().to_rfc3339()),
            user_agent: Set(log.user_agent.clone()),
            browser: Set(log.browser.clone()),
            os: Set(log.os.clone()),
            device: Set(log.device.clone()),
            ip: Set(log.ip.clone()),
            ..Default::default()
        };

        LoginLogs::insert(active).exec(&self.conn).await?;
        Ok(())
    }

    fn filtered_query(filter: &LoginLogFilter) -> sea_orm::Select<LoginLogs> {
        let mut query = LoginLogs::find().order_by_desc(login_logs::Column::LoginTime);

        if let Some(search) = &filter.search {
            query = query.filter(login_logs::Column::Email.contains(search));
        }

        if let Some(start) = &filter.start_date {
            query = query.filter(login_logs::Column::LoginTime.gte(start));
        }

        if let Some(end) = &filter.end_date {
            query = query.filter(login_logs::Column::LoginTime.lte(end));
        }

        query
    }

    pub async fn list_filtered(
        &self,
        filter: &LoginLogFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<login_logs::Model>, u64)> {
        let paginator = Self::filtered_query(filter).paginate(&self.conn, page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    pub async fn list_all(&self) -> Result<Vec<login_logs::Model>> {
        let items = LoginLogs::find()
            .order_by_desc(login_logs::Column::LoginTime)
            .all(&self.conn)
            .await?;

        Ok(items)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = LoginLogs::find().count(&self.conn).await?;
        Ok(count)
    }

    /// Number of distinct registrant identities that have logged in.
    pub async fn count_distinct_emails(&self) -> Result<u64> {
        let emails: Vec<String> = LoginLogs::find()
            .select_only()
            .column(login_logs::Column::Email)
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(emails.len() as u64)
    }

    /// Raw login timestamps at or after the cutoff; day bucketing happens in
    /// the reporting layer so the query stays backend-agnostic.
    pub async fn login_times_since(&self, cutoff: &str) -> Result<Vec<String>> {
        let times: Vec<String> = LoginLogs::find()
            .select_only()
            .column(login_logs::Column::LoginTime)
            .filter(login_logs::Column::LoginTime.gte(cutoff))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(times)
    }
}

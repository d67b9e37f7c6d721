use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::{content_logs, prelude::*};

pub struct ContentLogRepository {
    conn: DatabaseConnection,
}

impl ContentLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Appends one access record. No deduplication; repeated accesses all log.
    pub async fn add(&self, email: &str, content_type: &str) -> Result<()> {
        let active = content_logs::ActiveModel {
            email: Set(email.to_lowercase()),
            content_type: Set(content_type.to_string()),
            opened_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        ContentLogs::insert(active).exec(&self.conn).await?;
        Ok(())
    }
}

use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{content_config, prelude::*};

pub struct ContentConfigRepository {
    conn: DatabaseConnection,
}

impl ContentConfigRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert-or-update the URL for one content key.
    pub async fn upsert(&self, key: &str, url: &str, updated_by: &str) -> Result<()> {
        let existing = ContentConfig::find()
            .filter(content_config::Column::Key.eq(key))
            .one(&self.conn)
            .await
            .context("Failed to query content config")?;

        let now = chrono::Utc::now().to_rfc3339();

        if let Some(model) = existing {
            let mut active: content_config::ActiveModel = model.into();
            active.url = Set(url.to_string());
            active.updated_by = Set(updated_by.to_string());
            active.updated_at = Set(now);
            active.update(&self.conn).await?;
        } else {
            let active = content_config::ActiveModel {
                key: Set(key.to_string()),
                url: Set(url.to_string()),
                label: Set(None),
                updated_by: Set(updated_by.to_string()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            active.insert(&self.conn).await?;
        }

        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<content_config::Model>> {
        let items = ContentConfig::find().all(&self.conn).await?;
        Ok(items)
    }
}

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{prelude::*, registrations};

/// Filters for the admin listing; all optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    /// Substring match against name, email or phone.
    pub search: Option<String>,
    pub ticket_type: Option<String>,
    pub gender: Option<String>,
    /// Inclusive created_at range (RFC 3339 strings compare lexically).
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Input for creating a registrant. Email is lowercased before storage.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub ticket_type: String,
    pub source: String,
}

pub struct RegistrationRepository {
    conn: DatabaseConnection,
}

impl RegistrationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: &NewRegistration) -> Result<registrations::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = registrations::ActiveModel {
            name: Set(input.name.clone()),
            email: Set(input.email.to_lowercase()),
            phone: Set(input.phone.clone()),
            gender: Set(input.gender.clone()),
            ticket_type: Set(input.ticket_type.clone()),
            status: Set("active".to_string()),
            registration_source: Set(input.source.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert registration")?;

        Ok(model)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<registrations::Model>> {
        let model = Registrations::find()
            .filter(registrations::Column::Email.eq(email.to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query registration by email")?;

        Ok(model)
    }

    fn filtered_query(filter: &RegistrationFilter) -> sea_orm::Select<Registrations> {
        let mut query =
            Registrations::find().order_by_desc(registrations::Column::CreatedAt);

        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(registrations::Column::Name.contains(search))
                    .add(registrations::Column::Email.contains(search))
                    .add(registrations::Column::Phone.contains(search)),
            );
        }

        if let Some(ticket_type) = &filter.ticket_type {
            query = query.filter(registrations::Column::TicketType.eq(ticket_type));
        }

        if let Some(gender) = &filter.gender {
            query = query.filter(registrations::Column::Gender.eq(gender));
        }

        if let Some(start) = &filter.start_date {
            query = query.filter(registrations::Column::CreatedAt.gte(start));
        }

        if let Some(end) = &filter.end_date {
            query = query.filter(registrations::Column::CreatedAt.lte(end));
        }

        query
    }

    /// Paginated filtered listing, newest first. Page is 1-based.
    pub async fn list_filtered(
        &self,
        filter: &RegistrationFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<registrations::Model>, u64)> {
        let paginator = Self::filtered_query(filter).paginate(&self.conn, page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    pub async fn list_all(&self) -> Result<Vec<registrations::Model>> {
        let items = Registrations::find()
            .order_by_desc(registrations::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        Ok(items)
    }

    /// Updates status in place; returns the updated row, or None for an
    /// unknown id.
    pub async fn update_status(
        &self,
        id: i32,
        status: &str,
    ) -> Result<Option<registrations::Model>> {
        let Some(model) = Registrations::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: registrations::ActiveModel = model.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Registrations::find().count(&self.conn).await?;
        Ok(count)
    }

    pub async fn count_blocked(&self) -> Result<u64> {
        let count = Registrations::find()
            .filter(registrations::Column::Status.eq("blocked"))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Registrant counts grouped by ticket class.
    pub async fn count_by_ticket_type(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = Registrations::find()
            .select_only()
            .column(registrations::Column::TicketType)
            .column_as(registrations::Column::Id.count(), "count")
            .group_by(registrations::Column::TicketType)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}

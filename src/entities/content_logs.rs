use sea_orm::entity::prelude::*;

/// Append-only audit record of gated content access.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub email: String,

    /// One of: videos, pdf, feedback
    pub content_type: String,

    pub opened_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

/// Per-key content URL override; falls back to config defaults when absent.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One of: videos, pdf, feedback
    #[sea_orm(unique)]
    pub key: String,

    pub url: String,

    pub label: Option<String>,

    /// Email of the admin that last set this key.
    pub updated_by: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

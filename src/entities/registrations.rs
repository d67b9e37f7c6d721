use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Stored lowercase; uniqueness is effectively case-insensitive.
    #[sea_orm(unique)]
    pub email: String,

    pub phone: String,

    /// One of: male, female, other, prefer-not-to-say
    pub gender: String,

    /// One of: standard, vip, premium, student
    pub ticket_type: String,

    /// One of: active, blocked. Gates all authentication.
    pub status: String,

    pub registration_source: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

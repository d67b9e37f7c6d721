use sea_orm::entity::prelude::*;

/// Append-only audit record of successful OTP logins.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub email: String,

    pub login_time: String,

    pub user_agent: Option<String>,

    pub browser: String,

    pub os: String,

    /// Desktop, Mobile or Tablet
    pub device: String,

    pub ip: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum StudentStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Inactive")]
    Inactive,
    #[sea_orm(string_value = "Graduated")]
    Graduated,
}

/// One student record per user, created at registration approval and
/// managed by the admin endpoints afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Current roll-number field. Nullable because old records predate it.
    pub roll_no: Option<String>,
    /// Legacy alias kept for records imported before the rename.
    pub roll_number: Option<String>,
    pub name: String,
    pub department: String,
    pub semester: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub status: StudentStatus,
    pub address: String,
    pub dob: Date,
    #[sea_orm(unique)]
    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::marksheet::Entity")]
    Marksheet,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::marksheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marksheet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

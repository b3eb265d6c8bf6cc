use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role attached to an identity record. Only faculty and students register
/// through the frontend; admins are seeded from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "faculty")]
    Faculty,
    #[sea_orm(string_value = "student")]
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Faculty => "faculty",
            UserRole::Student => "student",
        }
    }
}

/// Identity record. Created at registration approval or by admin seeding.
/// The role is immutable by workflow convention, not by the schema.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub role: UserRole,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub address: String,
    pub dob: Date,
    pub department: Option<String>,
    // Student-specific fields
    pub semester: Option<String>,
    pub roll_no: Option<String>,
    // Faculty-specific fields
    pub designation: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student::Entity")]
    Student,
    #[sea_orm(has_many = "super::faculty::Entity")]
    Faculty,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::faculty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Faculty.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

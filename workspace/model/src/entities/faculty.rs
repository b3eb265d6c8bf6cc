use crate::subject_codes::SubjectCodes;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FacultyStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Inactive")]
    Inactive,
    #[sea_orm(string_value = "On Leave")]
    #[serde(rename = "On Leave")]
    OnLeave,
}

/// Faculty record. Created at registration approval, or lazily materialized
/// when a profile or assignment lookup finds a faculty user without one.
/// `user_id` is nullable: imported rows may lack the reference until the
/// self-heal in the registrar backfills it from the users table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "faculty")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub department: String,
    pub semester: String,
    pub phone: Option<String>,
    pub status: FacultyStatus,
    pub address: String,
    pub designation: String,
    pub dob: Date,
    /// Subject codes this faculty teaches. Kept in agreement with
    /// `faculty_profiles.profile_subjects` by the reconciler.
    #[sea_orm(column_type = "Json")]
    pub subjects: SubjectCodes,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_one = "super::faculty_profile::Entity")]
    FacultyProfile,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::faculty_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FacultyProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

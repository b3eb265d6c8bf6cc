use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SemesterStatus {
    #[sea_orm(string_value = "Upcoming")]
    Upcoming,
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Completed")]
    Completed,
}

/// Academic-term metadata, independently CRUD-managed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "semesters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub academic_year: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: SemesterStatus,
    pub total_subjects: i32,
    pub total_students: i32,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

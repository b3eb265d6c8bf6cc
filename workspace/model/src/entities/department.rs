use sea_orm::entity::prelude::*;

/// Administrative department metadata. `dept_id` is the externally visible
/// identifier the CRUD endpoints key on; department-name consistency with
/// students and subjects is soft, via the shared normalizer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub dept_id: String,
    pub name: String,
    pub hod: String,
    pub total_faculty: i32,
    pub total_students: i32,
    pub established: Option<String>,
    pub contact: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use crate::subject_codes::SubjectCodes;
use sea_orm::entity::prelude::*;

/// Extended profile data for a faculty record, one per faculty.
///
/// `faculty_id` is NOT NULL and unique at the schema level; the source
/// system enforced this with a save hook and a periodic cleanup of null
/// rows, the schema makes that class of bad data unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "faculty_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub faculty_id: i32,
    pub user_id: i32,
    pub qualification: String,
    pub experience: String,
    pub joining_date: DateTime,
    /// Profile copy of the taught subject codes, reconciled with
    /// `faculty.subjects`.
    #[sea_orm(column_type = "Json")]
    pub profile_subjects: SubjectCodes,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::faculty::Entity",
        from = "Column::FacultyId",
        to = "super::faculty::Column::Id"
    )]
    Faculty,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::faculty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Faculty.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

/// Per-student, per-subject marks. At most one row per (student, subject)
/// pair; the marksheet engine upserts on that key.
///
/// The name/code columns are denormalized snapshots of the student and
/// subject rows taken at write time. They go stale if either source row is
/// edited afterwards and are refreshed on the next write through the
/// engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "marksheets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub subject_id: i32,
    pub student_name: String,
    pub roll_no: Option<String>,
    pub subject_name: String,
    pub subject_code: String,
    pub mid1: i32,
    pub mid2: i32,
    pub assignment: i32,
    pub attendance: i32,
    pub external: i32,
    /// max(mid1, mid2), the effective midterm component.
    pub best_of_two: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

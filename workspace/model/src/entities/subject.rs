use sea_orm::entity::prelude::*;

/// A taught subject. `faculty` is a free-text identifier (name or email)
/// rather than a foreign key; the subject gate requires it to resolve to an
/// existing faculty row at write time, and the reconciler keeps the
/// denormalized assignment lists in step with it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub department: String,
    pub semester: i32,
    pub faculty: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::marksheet::Entity")]
    Marksheet,
}

impl Related<super::marksheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marksheet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

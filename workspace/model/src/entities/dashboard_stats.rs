use sea_orm::entity::prelude::*;

/// Singleton cached projection of the entity counts shown on the admin
/// dashboard. Always recomputed from the live collections, never authored
/// by hand (the PUT endpoint exists for raw access but the aggregator
/// overwrites it on the next mutation).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dashboard_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub total_students: i32,
    pub total_faculty: i32,
    pub departments: i32,
    pub subjects: i32,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

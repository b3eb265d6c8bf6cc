//! Dashboard aggregation.
//!
//! Two read paths exist on purpose: `live_counts` answers dashboard reads
//! straight from the source tables, and `recompute` refreshes the cached
//! singleton row after a mutation so the raw stats endpoint never drifts
//! far from reality.

use chrono::Utc;
use model::entities::dashboard_stats;
use model::entities::prelude::{DashboardStats, Department, Faculty, Student, Subject};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::{debug, instrument};

use crate::error::Result;

/// Entity counts taken directly from the live tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveCounts {
    pub total_students: i32,
    pub total_faculty: i32,
    pub departments: i32,
    pub subjects: i32,
}

/// Counts students, faculty, departments and subjects without touching the
/// cached singleton.
#[instrument(skip(db))]
pub async fn live_counts(db: &DatabaseConnection) -> Result<LiveCounts> {
    let (students, faculty, departments, subjects) = tokio::try_join!(
        Student::find().count(db),
        Faculty::find().count(db),
        Department::find().count(db),
        Subject::find().count(db),
    )?;
    Ok(LiveCounts {
        total_students: students as i32,
        total_faculty: faculty as i32,
        departments: departments as i32,
        subjects: subjects as i32,
    })
}

/// Recomputes the singleton stats row from the live tables, creating it on
/// first use. Returns the refreshed row.
#[instrument(skip(db))]
pub async fn recompute(db: &DatabaseConnection) -> Result<dashboard_stats::Model> {
    let counts = live_counts(db).await?;
    let now = Utc::now().naive_utc();

    let existing = DashboardStats::find().one(db).await?;
    let saved = match existing {
        Some(row) => {
            let mut active: dashboard_stats::ActiveModel = row.into();
            active.total_students = Set(counts.total_students);
            active.total_faculty = Set(counts.total_faculty);
            active.departments = Set(counts.departments);
            active.subjects = Set(counts.subjects);
            active.updated_at = Set(now);
            active.update(db).await?
        }
        None => {
            dashboard_stats::ActiveModel {
                total_students: Set(counts.total_students),
                total_faculty: Set(counts.total_faculty),
                departments: Set(counts.departments),
                subjects: Set(counts.subjects),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    debug!(
        total_students = saved.total_students,
        total_faculty = saved.total_faculty,
        departments = saved.departments,
        subjects = saved.subjects,
        "dashboard stats recomputed"
    );
    Ok(saved)
}

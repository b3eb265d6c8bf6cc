//! The single creation and resolution path for faculty records and their
//! profiles.
//!
//! Faculty rows can come into existence lazily: a user registered with the
//! faculty role may have no faculty record yet when a profile read or a
//! subject assignment first touches them. Every call site goes through the
//! get-or-create functions here so the lazily created rows always carry the
//! same defaults.

use chrono::Utc;
use model::entities::{faculty, faculty_profile, user};
use model::entities::prelude::{Faculty, FacultyProfile, User};
use model::SubjectCodes;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;

/// Department used when a faculty row is materialized from a user that
/// never filled one in.
const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Resolves a free-text faculty identifier to a faculty row by exact match
/// on email or name, in that order of intent but as a single query.
///
/// When several faculty share a display name the lowest id wins; the
/// system defines no tie-break beyond that.
#[instrument(skip(db))]
pub async fn resolve_faculty(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<faculty::Model>> {
    let found = Faculty::find()
        .filter(
            faculty::Column::Email
                .eq(identifier)
                .or(faculty::Column::Name.eq(identifier)),
        )
        .order_by_asc(faculty::Column::Id)
        .one(db)
        .await?;
    debug!(identifier, found = found.is_some(), "resolved faculty identifier");
    Ok(found)
}

/// Backfills a missing `user_id` on a faculty row from the users table.
///
/// Returns the (possibly updated) faculty row. When no matching faculty
/// user exists the row is returned untouched; callers treat the missing
/// reference as "skip profile creation", not as an error.
#[instrument(skip(db, faculty), fields(faculty_email = %faculty.email))]
pub async fn heal_user_reference(
    db: &DatabaseConnection,
    faculty: faculty::Model,
) -> Result<faculty::Model> {
    if faculty.user_id.is_some() {
        return Ok(faculty);
    }

    let matching_user = User::find()
        .filter(
            user::Column::Email
                .eq(faculty.email.clone())
                .and(user::Column::Role.eq(user::UserRole::Faculty)),
        )
        .one(db)
        .await?;

    match matching_user {
        Some(user_row) => {
            info!(email = %faculty.email, "backfilled missing user reference on faculty");
            let mut active: faculty::ActiveModel = faculty.into();
            active.user_id = Set(Some(user_row.id));
            Ok(active.update(db).await?)
        }
        None => {
            warn!(
                email = %faculty.email,
                "no matching user for faculty; profile creation will be skipped"
            );
            Ok(faculty)
        }
    }
}

/// Gets the profile for a faculty row, creating it if absent.
///
/// Returns `None` when the faculty row has no user reference even after
/// the self-heal: a profile must point at a user, so creation is deferred
/// until the reference exists.
#[instrument(skip(db, faculty), fields(faculty_id = faculty.id))]
pub async fn get_or_create_profile(
    db: &DatabaseConnection,
    faculty: &faculty::Model,
) -> Result<Option<faculty_profile::Model>> {
    if let Some(profile) = FacultyProfile::find()
        .filter(faculty_profile::Column::FacultyId.eq(faculty.id))
        .one(db)
        .await?
    {
        return Ok(Some(profile));
    }

    let Some(user_id) = faculty.user_id else {
        warn!(
            faculty_id = faculty.id,
            "faculty is missing a user reference; skipping profile creation"
        );
        return Ok(None);
    };

    let now = Utc::now().naive_utc();
    let profile = faculty_profile::ActiveModel {
        faculty_id: Set(faculty.id),
        user_id: Set(user_id),
        qualification: Set(String::new()),
        experience: Set(String::new()),
        joining_date: Set(now),
        // Seed from the faculty's current assignments so a profile created
        // on first read already agrees with the faculty row.
        profile_subjects: Set(faculty.subjects.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(faculty_id = faculty.id, "created faculty profile");
    Ok(Some(profile))
}

/// Gets the faculty row for a faculty-role user, creating it from the user
/// record if absent. Lookup order: by user reference, then by email; a row
/// found by email with no user reference gets it backfilled.
#[instrument(skip(db, user_row), fields(user_id = user_row.id, email = %user_row.email))]
pub async fn get_or_create_faculty_for_user(
    db: &DatabaseConnection,
    user_row: &user::Model,
) -> Result<faculty::Model> {
    if let Some(found) = Faculty::find()
        .filter(faculty::Column::UserId.eq(user_row.id))
        .one(db)
        .await?
    {
        return Ok(found);
    }

    if let Some(found) = Faculty::find()
        .filter(faculty::Column::Email.eq(user_row.email.clone()))
        .one(db)
        .await?
    {
        if found.user_id.is_none() {
            let mut active: faculty::ActiveModel = found.into();
            active.user_id = Set(Some(user_row.id));
            return Ok(active.update(db).await?);
        }
        return Ok(found);
    }

    let created = faculty::ActiveModel {
        user_id: Set(Some(user_row.id)),
        name: Set(user_row.name.clone()),
        email: Set(user_row.email.clone()),
        department: Set(user_row
            .department
            .clone()
            .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string())),
        semester: Set(user_row.semester.clone().unwrap_or_else(|| "1".to_string())),
        phone: Set(Some(user_row.phone.clone())),
        status: Set(faculty::FacultyStatus::Active),
        address: Set(user_row.address.clone()),
        designation: Set(user_row.designation.clone().unwrap_or_default()),
        dob: Set(user_row.dob),
        subjects: Set(SubjectCodes::new()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(email = %user_row.email, "materialized faculty record for faculty user");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_faculty, insert_user, setup_db};
    use model::entities::user::UserRole;

    #[tokio::test]
    async fn resolve_matches_email_and_name() {
        let db = setup_db().await;
        let user = insert_user(&db, UserRole::Faculty, "Asha Rao", "asha@example.com").await;
        insert_faculty(&db, Some(user.id), "Asha Rao", "asha@example.com", "Computer Science", &[])
            .await;

        let by_email = resolve_faculty(&db, "asha@example.com").await.unwrap();
        assert!(by_email.is_some());

        let by_name = resolve_faculty(&db, "Asha Rao").await.unwrap();
        assert!(by_name.is_some());

        let missing = resolve_faculty(&db, "nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn heal_backfills_user_reference() {
        let db = setup_db().await;
        let user = insert_user(&db, UserRole::Faculty, "Asha Rao", "asha@example.com").await;
        let faculty =
            insert_faculty(&db, None, "Asha Rao", "asha@example.com", "Computer Science", &[])
                .await;
        assert!(faculty.user_id.is_none());

        let healed = heal_user_reference(&db, faculty).await.unwrap();
        assert_eq!(healed.user_id, Some(user.id));
    }

    #[tokio::test]
    async fn heal_without_matching_user_is_a_no_op() {
        let db = setup_db().await;
        let faculty =
            insert_faculty(&db, None, "Ghost", "ghost@example.com", "Computer Science", &[]).await;
        let healed = heal_user_reference(&db, faculty).await.unwrap();
        assert!(healed.user_id.is_none());
    }

    #[tokio::test]
    async fn profile_creation_is_deferred_without_user_reference() {
        let db = setup_db().await;
        let faculty =
            insert_faculty(&db, None, "Ghost", "ghost@example.com", "Computer Science", &[]).await;
        let profile = get_or_create_profile(&db, &faculty).await.unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn profile_is_created_once() {
        let db = setup_db().await;
        let user = insert_user(&db, UserRole::Faculty, "Asha Rao", "asha@example.com").await;
        let faculty = insert_faculty(
            &db,
            Some(user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &["CS201"],
        )
        .await;

        let first = get_or_create_profile(&db, &faculty).await.unwrap().unwrap();
        // Seeded from the faculty's current subjects.
        assert!(first.profile_subjects.contains("CS201"));

        let second = get_or_create_profile(&db, &faculty).await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn faculty_is_materialized_from_user() {
        let db = setup_db().await;
        let user = insert_user(&db, UserRole::Faculty, "New Hire", "new@example.com").await;

        let created = get_or_create_faculty_for_user(&db, &user).await.unwrap();
        assert_eq!(created.email, "new@example.com");
        assert_eq!(created.user_id, Some(user.id));
        assert!(created.subjects.is_empty());

        let again = get_or_create_faculty_for_user(&db, &user).await.unwrap();
        assert_eq!(created.id, again.id);
    }
}

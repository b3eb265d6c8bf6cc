//! Keeps the three denormalized copies of subject-to-faculty assignment in
//! agreement: `subjects.faculty` (free text, the trigger), `faculty.subjects`
//! and `faculty_profiles.profile_subjects`.

use model::entities::faculty_profile;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::faculty_link;

/// Reconciles faculty assignment lists after a subject is created or its
/// faculty changes.
///
/// Every step is a set operation, so re-running a reconciliation that was
/// interrupted halfway converges instead of duplicating entries. A faculty
/// identifier that no longer resolves is logged and skipped; the subject
/// write it came from already passed validation and must not be blocked
/// retroactively.
#[derive(Debug)]
pub struct AssignmentReconciler;

impl AssignmentReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Adds `subject_code` to the new faculty's assignment lists and, when
    /// the subject moved, removes it from the previous faculty's lists.
    #[instrument(skip(db))]
    pub async fn reconcile(
        &self,
        db: &DatabaseConnection,
        new_identifier: Option<&str>,
        subject_code: &str,
        prev_identifier: Option<&str>,
    ) -> Result<()> {
        if let Some(identifier) = new_identifier {
            self.assign(db, identifier, subject_code).await?;
        }

        if let Some(prev) = prev_identifier {
            if new_identifier != Some(prev) {
                self.unassign(db, prev, subject_code).await?;
            }
        }

        Ok(())
    }

    async fn assign(
        &self,
        db: &DatabaseConnection,
        identifier: &str,
        subject_code: &str,
    ) -> Result<()> {
        let Some(faculty) = faculty_link::resolve_faculty(db, identifier).await? else {
            warn!(identifier, subject_code, "assignment target not found; skipping");
            return Ok(());
        };

        // Backfill a missing user reference before touching the profile;
        // profiles must point at a user.
        let faculty = faculty_link::heal_user_reference(db, faculty).await?;

        if let Some(profile) = faculty_link::get_or_create_profile(db, &faculty).await? {
            let mut subjects = profile.profile_subjects.clone();
            if subjects.insert(subject_code) {
                let mut active: faculty_profile::ActiveModel = profile.into();
                active.profile_subjects = Set(subjects);
                active.updated_at = Set(chrono::Utc::now().naive_utc());
                active.update(db).await?;
                debug!(identifier, subject_code, "added subject to profile assignments");
            }
        }

        let mut subjects = faculty.subjects.clone();
        if subjects.insert(subject_code) {
            let mut active: model::entities::faculty::ActiveModel = faculty.into();
            active.subjects = Set(subjects);
            active.update(db).await?;
            debug!(identifier, subject_code, "added subject to faculty assignments");
        }

        Ok(())
    }

    async fn unassign(
        &self,
        db: &DatabaseConnection,
        identifier: &str,
        subject_code: &str,
    ) -> Result<()> {
        let Some(prev_faculty) = faculty_link::resolve_faculty(db, identifier).await? else {
            debug!(identifier, subject_code, "previous faculty not found; nothing to remove");
            return Ok(());
        };

        if let Some(profile) = faculty_link::get_or_create_profile(db, &prev_faculty).await? {
            let mut subjects = profile.profile_subjects.clone();
            if subjects.remove(subject_code) {
                let mut active: faculty_profile::ActiveModel = profile.into();
                active.profile_subjects = Set(subjects);
                active.updated_at = Set(chrono::Utc::now().naive_utc());
                active.update(db).await?;
                debug!(identifier, subject_code, "removed subject from previous profile");
            }
        }

        let mut subjects = prev_faculty.subjects.clone();
        if subjects.remove(subject_code) {
            let mut active: model::entities::faculty::ActiveModel = prev_faculty.into();
            active.subjects = Set(subjects);
            active.update(db).await?;
            debug!(identifier, subject_code, "removed subject from previous faculty");
        }

        Ok(())
    }
}

impl Default for AssignmentReconciler {
    fn default() -> Self {
        Self::new()
    }
}

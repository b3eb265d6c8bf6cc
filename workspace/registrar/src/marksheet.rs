//! Marksheet authorization and upsert engine.
//!
//! The one place in the system allowed to write marks. A faculty member may
//! record marks only for students of their own department, only for
//! subjects they are assigned to teach, and only when the subject itself
//! belongs to the student's department. All department comparisons go
//! through the shared normalizer.

use common::normalize_department;
use model::entities::prelude::{Faculty, Marksheet, Student, Subject};
use model::entities::{faculty, marksheet, student, subject};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info, instrument};

use crate::error::{RegistrarError, Result};

/// A mark-entry request, after transport decoding but before any checking.
/// Score fields are optional; absent scores are recorded as zero.
#[derive(Debug, Clone, Default)]
pub struct MarkEntry {
    pub roll_no: Option<String>,
    pub subject_code: Option<String>,
    pub mid1: Option<i32>,
    pub mid2: Option<i32>,
    pub assignment: Option<i32>,
    pub attendance: Option<i32>,
    pub external: Option<i32>,
}

/// Finds a student by roll number, matching the current `roll_no` column or
/// the legacy `roll_number` alias, case-insensitively but exactly.
pub async fn find_student_by_roll(
    db: &DatabaseConnection,
    roll_no: &str,
) -> Result<Option<student::Model>> {
    let needle = roll_no.trim().to_lowercase();
    let found = Student::find()
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        student::Entity,
                        student::Column::RollNo,
                    ))))
                    .eq(needle.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        student::Entity,
                        student::Column::RollNumber,
                    ))))
                    .eq(needle),
                ),
        )
        .one(db)
        .await?;
    Ok(found)
}

/// Runs the full authorization chain and upserts the marksheet.
#[derive(Debug)]
pub struct MarksheetEngine;

impl MarksheetEngine {
    pub fn new() -> Self {
        Self
    }

    /// Validates, authorizes and persists a mark entry made by the faculty
    /// user identified by `faculty_user_id`.
    ///
    /// Checks run in a fixed order and short-circuit on the first failure,
    /// each with its own error category so callers can tell a missing
    /// assignment from a department mismatch. On success exactly one
    /// marksheet row exists for the (student, subject) pair, with every
    /// denormalized snapshot field refreshed from the rows resolved here.
    #[instrument(skip(db, entry), fields(faculty_user_id))]
    pub async fn save_marks(
        &self,
        db: &DatabaseConnection,
        faculty_user_id: i32,
        entry: MarkEntry,
    ) -> Result<marksheet::Model> {
        let roll_no = match entry.roll_no.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => return Err(RegistrarError::Validation("rollNo is required".to_string())),
        };
        let subject_code = match entry.subject_code.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                return Err(RegistrarError::Validation(
                    "subjectCode is required".to_string(),
                ))
            }
        };

        // Resolve the three parties concurrently; none depends on another.
        let faculty_fut = async {
            Ok::<_, RegistrarError>(
                Faculty::find()
                    .filter(faculty::Column::UserId.eq(faculty_user_id))
                    .one(db)
                    .await?,
            )
        };
        let student_fut = find_student_by_roll(db, &roll_no);
        let subject_fut = async {
            Ok::<_, RegistrarError>(
                Subject::find()
                    .filter(subject::Column::Code.eq(subject_code.clone()))
                    .one(db)
                    .await?,
            )
        };
        let (acting_faculty, student, subject) =
            tokio::try_join!(faculty_fut, student_fut, subject_fut)?;

        let acting_faculty = match acting_faculty {
            Some(f) if !f.department.trim().is_empty() => f,
            _ => {
                return Err(RegistrarError::Authorization(
                    "Authorization error: Your profile is incomplete or not assigned to a department."
                        .to_string(),
                ))
            }
        };
        let student = student
            .ok_or_else(|| RegistrarError::NotFound("Student not found.".to_string()))?;
        let subject = subject
            .ok_or_else(|| RegistrarError::NotFound("Subject not found.".to_string()))?;

        let faculty_dept = normalize_department(&acting_faculty.department);
        let student_dept = normalize_department(&student.department);
        let subject_dept = normalize_department(&subject.department);

        if faculty_dept != student_dept {
            return Err(RegistrarError::Authorization(
                "Authorization error: You can only save marks for students in your own department."
                    .to_string(),
            ));
        }

        if !acting_faculty.subjects.contains(&subject_code) {
            return Err(RegistrarError::Authorization(
                "Authorization error: You are not assigned to teach this subject.".to_string(),
            ));
        }

        if subject_dept != student_dept {
            return Err(RegistrarError::Validation(
                "Data integrity error: This subject does not belong to the student's department."
                    .to_string(),
            ));
        }

        let best_of_two = entry.mid1.unwrap_or(0).max(entry.mid2.unwrap_or(0));
        debug!(
            student_id = student.id,
            subject_id = subject.id,
            best_of_two,
            "authorization chain passed"
        );

        let existing = Marksheet::find()
            .filter(
                marksheet::Column::StudentId
                    .eq(student.id)
                    .and(marksheet::Column::SubjectId.eq(subject.id)),
            )
            .one(db)
            .await?;

        let saved = match existing {
            Some(row) => {
                let mut active: marksheet::ActiveModel = row.into();
                active.mid1 = Set(entry.mid1.unwrap_or(0));
                active.mid2 = Set(entry.mid2.unwrap_or(0));
                active.assignment = Set(entry.assignment.unwrap_or(0));
                active.attendance = Set(entry.attendance.unwrap_or(0));
                active.external = Set(entry.external.unwrap_or(0));
                active.best_of_two = Set(best_of_two);
                // Refresh the denormalized snapshot from the live rows.
                active.student_name = Set(student.name.clone());
                active.roll_no = Set(student.roll_no.clone());
                active.subject_name = Set(subject.name.clone());
                active.subject_code = Set(subject.code.clone());
                active.update(db).await?
            }
            None => {
                marksheet::ActiveModel {
                    student_id: Set(student.id),
                    subject_id: Set(subject.id),
                    student_name: Set(student.name.clone()),
                    roll_no: Set(student.roll_no.clone()),
                    subject_name: Set(subject.name.clone()),
                    subject_code: Set(subject.code.clone()),
                    mid1: Set(entry.mid1.unwrap_or(0)),
                    mid2: Set(entry.mid2.unwrap_or(0)),
                    assignment: Set(entry.assignment.unwrap_or(0)),
                    attendance: Set(entry.attendance.unwrap_or(0)),
                    external: Set(entry.external.unwrap_or(0)),
                    best_of_two: Set(best_of_two),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        info!(
            marksheet_id = saved.id,
            student_id = saved.student_id,
            subject_id = saved.subject_id,
            "marks saved"
        );
        Ok(saved)
    }
}

impl Default for MarksheetEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_faculty, insert_student, insert_subject, insert_user, setup_db};
    use model::entities::user::UserRole;
    use sea_orm::{DatabaseConnection, PaginatorTrait};

    fn entry(roll: &str, code: &str, mid1: i32, mid2: i32) -> MarkEntry {
        MarkEntry {
            roll_no: Some(roll.to_string()),
            subject_code: Some(code.to_string()),
            mid1: Some(mid1),
            mid2: Some(mid2),
            assignment: Some(9),
            attendance: Some(8),
            external: Some(55),
        }
    }

    /// Faculty in "Computer Science", student registered under the "cse"
    /// abbreviation, subject under the full name. Only normalization makes
    /// these agree.
    async fn seed_scenario(db: &DatabaseConnection, faculty_subjects: &[&str]) -> i32 {
        let faculty_user =
            insert_user(db, UserRole::Faculty, "Asha Rao", "asha@example.com").await;
        insert_faculty(
            db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            faculty_subjects,
        )
        .await;
        let student_user =
            insert_user(db, UserRole::Student, "Ravi Kumar", "ravi@example.com").await;
        insert_student(db, student_user.id, "Ravi Kumar", "ravi@example.com", "CS101", "cse").await;
        insert_subject(db, "CS201", "Data Structures", "Computer Science", "asha@example.com")
            .await;
        faculty_user.id
    }

    #[tokio::test]
    async fn accepts_in_department_assigned_faculty() {
        let db = setup_db().await;
        let faculty_user_id = seed_scenario(&db, &["CS201"]).await;

        let saved = MarksheetEngine::new()
            .save_marks(&db, faculty_user_id, entry("CS101", "CS201", 18, 15))
            .await
            .unwrap();

        assert_eq!(saved.best_of_two, 18);
        assert_eq!(saved.student_name, "Ravi Kumar");
        assert_eq!(saved.subject_code, "CS201");
    }

    #[tokio::test]
    async fn roll_number_match_is_case_insensitive() {
        let db = setup_db().await;
        let faculty_user_id = seed_scenario(&db, &["CS201"]).await;

        let saved = MarksheetEngine::new()
            .save_marks(&db, faculty_user_id, entry("cs101", "CS201", 10, 12))
            .await
            .unwrap();
        assert_eq!(saved.best_of_two, 12);
    }

    #[tokio::test]
    async fn rejects_unassigned_subject() {
        let db = setup_db().await;
        let faculty_user_id = seed_scenario(&db, &["CS202"]).await;

        let err = MarksheetEngine::new()
            .save_marks(&db, faculty_user_id, entry("CS101", "CS201", 18, 15))
            .await
            .unwrap_err();

        match err {
            RegistrarError::Authorization(msg) => {
                assert!(msg.contains("not assigned to teach this subject"))
            }
            other => panic!("expected authorization error, got {other:?}"),
        }
        assert_eq!(Marksheet::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_cross_department_faculty() {
        let db = setup_db().await;
        let faculty_user =
            insert_user(&db, UserRole::Faculty, "Mira Shah", "mira@example.com").await;
        insert_faculty(
            &db,
            Some(faculty_user.id),
            "Mira Shah",
            "mira@example.com",
            "Mechanical Engineering",
            &["CS201"],
        )
        .await;
        let student_user =
            insert_user(&db, UserRole::Student, "Ravi Kumar", "ravi@example.com").await;
        insert_student(&db, student_user.id, "Ravi Kumar", "ravi@example.com", "CS101", "cse")
            .await;
        insert_subject(&db, "CS201", "Data Structures", "Computer Science", "mira@example.com")
            .await;

        let err = MarksheetEngine::new()
            .save_marks(&db, faculty_user.id, entry("CS101", "CS201", 18, 15))
            .await
            .unwrap_err();

        match err {
            RegistrarError::Authorization(msg) => assert!(msg.contains("own department")),
            other => panic!("expected authorization error, got {other:?}"),
        }
        assert_eq!(Marksheet::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_subject_outside_student_department() {
        let db = setup_db().await;
        let faculty_user =
            insert_user(&db, UserRole::Faculty, "Asha Rao", "asha@example.com").await;
        insert_faculty(
            &db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &["ME301"],
        )
        .await;
        let student_user =
            insert_user(&db, UserRole::Student, "Ravi Kumar", "ravi@example.com").await;
        insert_student(&db, student_user.id, "Ravi Kumar", "ravi@example.com", "CS101", "cse")
            .await;
        insert_subject(&db, "ME301", "Thermodynamics", "Mechanical Engineering", "asha@example.com")
            .await;

        let err = MarksheetEngine::new()
            .save_marks(&db, faculty_user.id, entry("CS101", "ME301", 18, 15))
            .await
            .unwrap_err();

        match err {
            RegistrarError::Validation(msg) => {
                assert!(msg.contains("does not belong to the student's department"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_missing_identifiers() {
        let db = setup_db().await;
        let engine = MarksheetEngine::new();

        let err = engine
            .save_marks(&db, 1, MarkEntry { subject_code: Some("CS201".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Validation(ref m) if m.contains("rollNo")));

        let err = engine
            .save_marks(&db, 1, MarkEntry { roll_no: Some("CS101".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Validation(ref m) if m.contains("subjectCode")));
    }

    #[tokio::test]
    async fn rejects_faculty_without_record() {
        let db = setup_db().await;
        let err = MarksheetEngine::new()
            .save_marks(&db, 999, entry("CS101", "CS201", 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Authorization(ref m) if m.contains("incomplete")));
    }

    #[tokio::test]
    async fn second_write_updates_in_place() {
        let db = setup_db().await;
        let faculty_user_id = seed_scenario(&db, &["CS201"]).await;
        let engine = MarksheetEngine::new();

        let first = engine
            .save_marks(&db, faculty_user_id, entry("CS101", "CS201", 18, 15))
            .await
            .unwrap();
        let second = engine
            .save_marks(&db, faculty_user_id, entry("CS101", "CS201", 12, 20))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.best_of_two, 20);
        assert_eq!(Marksheet::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn absent_scores_default_to_zero() {
        let db = setup_db().await;
        let faculty_user_id = seed_scenario(&db, &["CS201"]).await;

        let saved = MarksheetEngine::new()
            .save_marks(
                &db,
                faculty_user_id,
                MarkEntry {
                    roll_no: Some("CS101".to_string()),
                    subject_code: Some("CS201".to_string()),
                    mid1: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.mid2, 0);
        assert_eq!(saved.external, 0);
        assert_eq!(saved.best_of_two, 7);
    }
}

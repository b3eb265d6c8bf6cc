//! Registration approval workflow.
//!
//! Self-registrations land in `pending_registrations` and wait for an admin
//! decision. Approval validates the role-specific required fields before it
//! creates anything, so a rejected approval leaves no half-created user
//! behind.

use chrono::{NaiveDate, Utc};
use model::entities::prelude::{Faculty, PendingRegistration, Student, User};
use model::entities::{faculty, pending_registration, student, user};
use model::SubjectCodes;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, instrument, warn};

use crate::error::{RegistrarError, Result};

/// A registration request after transport decoding. The password is already
/// hashed; this module never sees a plaintext secret.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: user::UserRole,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub roll_no: Option<String>,
    pub designation: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

fn is_blank(value: &Option<String>) -> bool {
    !matches!(value.as_deref().map(str::trim), Some(v) if !v.is_empty())
}

/// Records a registration request as pending.
///
/// Rejects duplicates against both existing users and an already-pending
/// request for the same email. A previously decided request for the email
/// is reopened in place rather than inserted again.
#[instrument(skip(db, input), fields(email = %input.email, role = ?input.role))]
pub async fn submit(
    db: &DatabaseConnection,
    input: RegistrationInput,
) -> Result<pending_registration::Model> {
    if input.name.trim().is_empty() || input.email.trim().is_empty() {
        return Err(RegistrarError::Validation(
            "Missing required fields.".to_string(),
        ));
    }
    match input.role {
        user::UserRole::Admin => {
            return Err(RegistrarError::Validation(
                "Role must be student or faculty".to_string(),
            ))
        }
        user::UserRole::Student => {
            if is_blank(&input.department) || is_blank(&input.semester) || is_blank(&input.roll_no)
            {
                return Err(RegistrarError::Validation(
                    "Missing student fields.".to_string(),
                ));
            }
        }
        user::UserRole::Faculty => {
            if is_blank(&input.department) || is_blank(&input.designation) {
                return Err(RegistrarError::Validation(
                    "Missing faculty fields.".to_string(),
                ));
            }
        }
    }

    let existing_user = User::find()
        .filter(user::Column::Email.eq(input.email.clone()))
        .one(db)
        .await?;
    if existing_user.is_some() {
        return Err(RegistrarError::Conflict("User already exists.".to_string()));
    }

    let previous = PendingRegistration::find()
        .filter(pending_registration::Column::Email.eq(input.email.clone()))
        .one(db)
        .await?;

    let saved = match previous {
        Some(row) if row.status == pending_registration::RegistrationStatus::Pending => {
            return Err(RegistrarError::Conflict(
                "Registration already pending.".to_string(),
            ));
        }
        Some(row) => {
            // Decided earlier; reopen with the new payload.
            let mut active: pending_registration::ActiveModel = row.into();
            active.name = Set(input.name);
            active.password_hash = Set(input.password_hash);
            active.role = Set(input.role);
            active.department = Set(input.department);
            active.semester = Set(input.semester);
            active.roll_no = Set(input.roll_no);
            active.designation = Set(input.designation);
            active.phone_number = Set(input.phone_number);
            active.address = Set(input.address);
            active.date_of_birth = Set(input.date_of_birth);
            active.status = Set(pending_registration::RegistrationStatus::Pending);
            active.created_at = Set(Utc::now().naive_utc());
            active.update(db).await?
        }
        None => {
            pending_registration::ActiveModel {
                name: Set(input.name),
                email: Set(input.email),
                password_hash: Set(input.password_hash),
                role: Set(input.role),
                department: Set(input.department),
                semester: Set(input.semester),
                roll_no: Set(input.roll_no),
                designation: Set(input.designation),
                phone_number: Set(input.phone_number),
                address: Set(input.address),
                date_of_birth: Set(input.date_of_birth),
                status: Set(pending_registration::RegistrationStatus::Pending),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    info!(registration_id = saved.id, "registration request submitted");
    Ok(saved)
}

/// Lists requests still waiting for a decision.
pub async fn list_pending(db: &DatabaseConnection) -> Result<Vec<pending_registration::Model>> {
    Ok(PendingRegistration::find()
        .filter(
            pending_registration::Column::Status
                .eq(pending_registration::RegistrationStatus::Pending),
        )
        .all(db)
        .await?)
}

async fn load_pending(
    db: &DatabaseConnection,
    id: i32,
) -> Result<pending_registration::Model> {
    let row = PendingRegistration::find_by_id(id).one(db).await?;
    match row {
        Some(row) if row.status == pending_registration::RegistrationStatus::Pending => Ok(row),
        _ => Err(RegistrarError::NotFound(
            "Registration not found.".to_string(),
        )),
    }
}

fn missing_student_fields(pending: &pending_registration::Model) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if is_blank(&pending.roll_no) {
        missing.push("rollNo");
    }
    if pending.name.trim().is_empty() {
        missing.push("name");
    }
    if is_blank(&pending.department) {
        missing.push("department");
    }
    match pending.semester.as_deref().map(str::trim) {
        Some(s) if s.parse::<i32>().is_ok() => {}
        _ => missing.push("semester"),
    }
    if pending.email.trim().is_empty() {
        missing.push("email");
    }
    if is_blank(&pending.phone_number) {
        missing.push("phone");
    }
    if is_blank(&pending.address) {
        missing.push("address");
    }
    if pending.date_of_birth.is_none() {
        missing.push("dob");
    }
    missing
}

fn missing_faculty_fields(pending: &pending_registration::Model) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if pending.name.trim().is_empty() {
        missing.push("name");
    }
    if pending.email.trim().is_empty() {
        missing.push("email");
    }
    if is_blank(&pending.department) {
        missing.push("department");
    }
    if is_blank(&pending.semester) {
        missing.push("semester");
    }
    if is_blank(&pending.address) {
        missing.push("address");
    }
    if is_blank(&pending.designation) {
        missing.push("designation");
    }
    if pending.date_of_birth.is_none() {
        missing.push("dob");
    }
    missing
}

/// Approves a pending registration: validates the role-specific required
/// fields, creates the user plus the student or faculty record, then marks
/// the request approved. Validation runs before any insert, so a failed
/// approval leaves the database unchanged.
#[instrument(skip(db))]
pub async fn approve(db: &DatabaseConnection, id: i32) -> Result<user::Model> {
    let pending = load_pending(db, id).await?;

    let missing = match pending.role {
        user::UserRole::Student => missing_student_fields(&pending),
        user::UserRole::Faculty => missing_faculty_fields(&pending),
        user::UserRole::Admin => {
            warn!(registration_id = pending.id, "pending registration carries the admin role");
            return Err(RegistrarError::Validation(
                "Role must be student or faculty".to_string(),
            ));
        }
    };
    if !missing.is_empty() {
        let label = match pending.role {
            user::UserRole::Student => "student",
            _ => "faculty",
        };
        return Err(RegistrarError::Validation(format!(
            "Missing required {label} fields: {}",
            missing.join(", ")
        )));
    }

    // Checked non-empty above for both roles.
    let dob = pending
        .date_of_birth
        .ok_or_else(|| RegistrarError::Validation("Missing required fields.".to_string()))?;

    let created_user = user::ActiveModel {
        role: Set(pending.role),
        name: Set(pending.name.clone()),
        email: Set(pending.email.clone()),
        phone: Set(pending.phone_number.clone().unwrap_or_default()),
        password_hash: Set(pending.password_hash.clone()),
        address: Set(pending.address.clone().unwrap_or_default()),
        dob: Set(dob),
        department: Set(pending.department.clone()),
        semester: Set(pending.semester.clone()),
        roll_no: Set(pending.roll_no.clone()),
        designation: Set(pending.designation.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    match pending.role {
        user::UserRole::Student => {
            let semester = pending
                .semester
                .as_deref()
                .map(str::trim)
                .and_then(|s| s.parse::<i32>().ok())
                .unwrap_or(1);
            student::ActiveModel {
                user_id: Set(created_user.id),
                name: Set(pending.name.clone()),
                email: Set(pending.email.clone()),
                department: Set(pending.department.clone().unwrap_or_default()),
                semester: Set(semester),
                roll_no: Set(pending.roll_no.clone()),
                phone: Set(pending.phone_number.clone().unwrap_or_default()),
                status: Set(student::StudentStatus::Active),
                address: Set(pending.address.clone().unwrap_or_default()),
                dob: Set(dob),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        user::UserRole::Faculty => {
            faculty::ActiveModel {
                user_id: Set(Some(created_user.id)),
                name: Set(pending.name.clone()),
                email: Set(pending.email.clone()),
                department: Set(pending.department.clone().unwrap_or_default()),
                semester: Set(pending.semester.clone().unwrap_or_default()),
                phone: Set(pending.phone_number.clone()),
                status: Set(faculty::FacultyStatus::Active),
                address: Set(pending.address.clone().unwrap_or_default()),
                designation: Set(pending.designation.clone().unwrap_or_default()),
                dob: Set(dob),
                subjects: Set(SubjectCodes::new()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        user::UserRole::Admin => unreachable!("rejected above"),
    }

    let mut active: pending_registration::ActiveModel = pending.into();
    active.status = Set(pending_registration::RegistrationStatus::Approved);
    active.update(db).await?;

    info!(user_id = created_user.id, "registration approved");
    Ok(created_user)
}

/// Rejects a pending registration. Only flips the status; nothing else is
/// touched.
#[instrument(skip(db))]
pub async fn reject(db: &DatabaseConnection, id: i32) -> Result<pending_registration::Model> {
    let pending = load_pending(db, id).await?;
    let mut active: pending_registration::ActiveModel = pending.into();
    active.status = Set(pending_registration::RegistrationStatus::Rejected);
    let saved = active.update(db).await?;
    info!(registration_id = saved.id, "registration rejected");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;
    use sea_orm::PaginatorTrait;

    fn student_input(email: &str) -> RegistrationInput {
        RegistrationInput {
            name: "Ravi Kumar".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: user::UserRole::Student,
            department: Some("cse".to_string()),
            semester: Some("3".to_string()),
            roll_no: Some("CS101".to_string()),
            designation: None,
            phone_number: Some("9000000001".to_string()),
            address: Some("Hostel A".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(2004, 6, 1),
        }
    }

    fn faculty_input(email: &str) -> RegistrationInput {
        RegistrationInput {
            name: "Asha Rao".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: user::UserRole::Faculty,
            department: Some("Computer Science".to_string()),
            semester: Some("3".to_string()),
            roll_no: None,
            designation: Some("Professor".to_string()),
            phone_number: Some("9000000000".to_string()),
            address: Some("Campus Rd".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 2, 11),
        }
    }

    #[tokio::test]
    async fn submit_rejects_incomplete_student_requests() {
        let db = setup_db().await;
        let mut input = student_input("ravi@example.com");
        input.roll_no = None;

        let err = submit(&db, input).await.unwrap_err();
        assert!(matches!(err, RegistrarError::Validation(ref m) if m == "Missing student fields."));
    }

    #[tokio::test]
    async fn submit_rejects_duplicate_pending_requests() {
        let db = setup_db().await;
        submit(&db, student_input("ravi@example.com")).await.unwrap();

        let err = submit(&db, student_input("ravi@example.com")).await.unwrap_err();
        assert!(
            matches!(err, RegistrarError::Conflict(ref m) if m == "Registration already pending.")
        );
    }

    #[tokio::test]
    async fn submit_reopens_a_rejected_request() {
        let db = setup_db().await;
        let first = submit(&db, student_input("ravi@example.com")).await.unwrap();
        reject(&db, first.id).await.unwrap();

        let second = submit(&db, student_input("ravi@example.com")).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, pending_registration::RegistrationStatus::Pending);
        assert_eq!(PendingRegistration::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn approve_creates_user_and_student() {
        let db = setup_db().await;
        let pending = submit(&db, student_input("ravi@example.com")).await.unwrap();

        let created = approve(&db, pending.id).await.unwrap();
        assert_eq!(created.role, user::UserRole::Student);

        let student = Student::find()
            .filter(student::Column::Email.eq("ravi@example.com"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.user_id, created.id);
        assert_eq!(student.semester, 3);
        assert_eq!(student.roll_no.as_deref(), Some("CS101"));
    }

    #[tokio::test]
    async fn approve_creates_user_and_faculty() {
        let db = setup_db().await;
        let pending = submit(&db, faculty_input("asha@example.com")).await.unwrap();

        let created = approve(&db, pending.id).await.unwrap();
        let faculty = Faculty::find()
            .filter(faculty::Column::Email.eq("asha@example.com"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(faculty.user_id, Some(created.id));
        assert!(faculty.subjects.is_empty());
    }

    #[tokio::test]
    async fn approve_with_missing_fields_creates_nothing() {
        let db = setup_db().await;
        let pending = submit(&db, student_input("ravi@example.com")).await.unwrap();
        // Simulate a request that slipped in without a roll number.
        let mut active: pending_registration::ActiveModel = pending.clone().into();
        active.roll_no = Set(None);
        active.update(&db).await.unwrap();

        let err = approve(&db, pending.id).await.unwrap_err();
        match err {
            RegistrarError::Validation(msg) => {
                assert_eq!(msg, "Missing required student fields: rollNo")
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert_eq!(User::find().count(&db).await.unwrap(), 0);
        assert_eq!(Student::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn approve_is_single_shot() {
        let db = setup_db().await;
        let pending = submit(&db, faculty_input("asha@example.com")).await.unwrap();
        approve(&db, pending.id).await.unwrap();

        let err = approve(&db, pending.id).await.unwrap_err();
        assert!(matches!(err, RegistrarError::NotFound(ref m) if m == "Registration not found."));
    }

    #[tokio::test]
    async fn reject_only_flips_status() {
        let db = setup_db().await;
        let pending = submit(&db, student_input("ravi@example.com")).await.unwrap();

        let rejected = reject(&db, pending.id).await.unwrap();
        assert_eq!(rejected.status, pending_registration::RegistrationStatus::Rejected);
        assert_eq!(User::find().count(&db).await.unwrap(), 0);
        assert!(list_pending(&db).await.unwrap().is_empty());
    }
}

//! Shared fixtures for the registrar unit tests: an in-memory SQLite
//! database with the migrations applied and insert helpers for the rows
//! most tests need.

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::{faculty, student, subject, user};
use model::SubjectCodes;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None).await.expect("Migrations failed");
    db
}

pub fn dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

pub async fn insert_user(
    db: &DatabaseConnection,
    role: user::UserRole,
    name: &str,
    email: &str,
) -> user::Model {
    user::ActiveModel {
        role: Set(role),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set("9000000000".to_string()),
        password_hash: Set("hash".to_string()),
        address: Set("Campus Rd".to_string()),
        dob: Set(dob()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn insert_faculty(
    db: &DatabaseConnection,
    user_id: Option<i32>,
    name: &str,
    email: &str,
    department: &str,
    subjects: &[&str],
) -> faculty::Model {
    faculty::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        department: Set(department.to_string()),
        semester: Set("3".to_string()),
        status: Set(faculty::FacultyStatus::Active),
        address: Set("Campus Rd".to_string()),
        designation: Set("Professor".to_string()),
        dob: Set(dob()),
        subjects: Set(SubjectCodes::from(
            subjects.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert faculty")
}

pub async fn insert_student(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
    email: &str,
    roll_no: &str,
    department: &str,
) -> student::Model {
    student::ActiveModel {
        roll_no: Set(Some(roll_no.to_string())),
        name: Set(name.to_string()),
        department: Set(department.to_string()),
        semester: Set(3),
        email: Set(email.to_string()),
        phone: Set("9000000001".to_string()),
        status: Set(student::StudentStatus::Active),
        address: Set("Hostel A".to_string()),
        dob: Set(dob()),
        user_id: Set(user_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert student")
}

pub async fn insert_subject(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    department: &str,
    faculty_identifier: &str,
) -> subject::Model {
    subject::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        department: Set(department.to_string()),
        semester: Set(3),
        faculty: Set(faculty_identifier.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert subject")
}

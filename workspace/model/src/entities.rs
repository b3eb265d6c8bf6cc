//! This file serves as the root for all SeaORM entity modules.
//! The data models mirror the collections of the academic records system:
//! identities, student and faculty records, subjects, marksheets and the
//! administrative metadata around them.

pub mod dashboard_stats;
pub mod department;
pub mod faculty;
pub mod faculty_profile;
pub mod marksheet;
pub mod pending_registration;
pub mod semester;
pub mod student;
pub mod subject;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::dashboard_stats::Entity as DashboardStats;
    pub use super::department::Entity as Department;
    pub use super::faculty::Entity as Faculty;
    pub use super::faculty_profile::Entity as FacultyProfile;
    pub use super::marksheet::Entity as Marksheet;
    pub use super::pending_registration::Entity as PendingRegistration;
    pub use super::semester::Entity as Semester;
    pub use super::student::Entity as Student;
    pub use super::subject::Entity as Subject;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use crate::SubjectCodes;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let faculty_user = user::ActiveModel {
            role: Set(user::UserRole::Faculty),
            name: Set("Asha Rao".to_string()),
            email: Set("asha@example.com".to_string()),
            phone: Set("9000000001".to_string()),
            password_hash: Set("hash".to_string()),
            address: Set("Campus Rd".to_string()),
            dob: Set(dob()),
            department: Set(Some("Computer Science".to_string())),
            designation: Set(Some("Professor".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let student_user = user::ActiveModel {
            role: Set(user::UserRole::Student),
            name: Set("Ravi Kumar".to_string()),
            email: Set("ravi@example.com".to_string()),
            phone: Set("9000000002".to_string()),
            password_hash: Set("hash".to_string()),
            address: Set("Hostel A".to_string()),
            dob: Set(dob()),
            roll_no: Set(Some("CS101".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let faculty = faculty::ActiveModel {
            user_id: Set(Some(faculty_user.id)),
            name: Set("Asha Rao".to_string()),
            email: Set("asha@example.com".to_string()),
            department: Set("Computer Science".to_string()),
            semester: Set("3".to_string()),
            status: Set(faculty::FacultyStatus::Active),
            address: Set("Campus Rd".to_string()),
            designation: Set("Professor".to_string()),
            dob: Set(dob()),
            subjects: Set(SubjectCodes::from(vec!["CS201".to_string()])),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let student = student::ActiveModel {
            roll_no: Set(Some("CS101".to_string())),
            name: Set("Ravi Kumar".to_string()),
            department: Set("Computer Science".to_string()),
            semester: Set(3),
            email: Set("ravi@example.com".to_string()),
            phone: Set("9000000002".to_string()),
            status: Set(student::StudentStatus::Active),
            address: Set("Hostel A".to_string()),
            dob: Set(dob()),
            user_id: Set(student_user.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let subject = subject::ActiveModel {
            code: Set("CS201".to_string()),
            name: Set("Data Structures".to_string()),
            department: Set("Computer Science".to_string()),
            semester: Set(3),
            faculty: Set("asha@example.com".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let marksheet = marksheet::ActiveModel {
            student_id: Set(student.id),
            subject_id: Set(subject.id),
            student_name: Set(student.name.clone()),
            roll_no: Set(student.roll_no.clone()),
            subject_name: Set(subject.name.clone()),
            subject_code: Set(subject.code.clone()),
            mid1: Set(18),
            mid2: Set(15),
            assignment: Set(9),
            attendance: Set(8),
            external: Set(55),
            best_of_two: Set(18),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Round-trip the JSON subject set through the database.
        let reloaded = Faculty::find_by_id(faculty.id).one(&db).await?.unwrap();
        assert!(reloaded.subjects.contains("CS201"));

        // Marksheet joins back to its sources.
        let with_subject = Marksheet::find_by_id(marksheet.id)
            .find_also_related(Subject)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(with_subject.1.unwrap().code, "CS201");

        let by_student = Marksheet::find()
            .filter(marksheet::Column::StudentId.eq(student.id))
            .all(&db)
            .await?;
        assert_eq!(by_student.len(), 1);
        assert_eq!(by_student[0].best_of_two, 18);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_constraints() -> Result<(), DbErr> {
        let db = setup_db().await?;

        user::ActiveModel {
            role: Set(user::UserRole::Admin),
            name: Set("Admin One".to_string()),
            email: Set("admin1@example.com".to_string()),
            phone: Set("9999999999".to_string()),
            password_hash: Set("hash".to_string()),
            address: Set("Admin Address 1".to_string()),
            dob: Set(dob()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let duplicate = user::ActiveModel {
            role: Set(user::UserRole::Admin),
            name: Set("Admin Clone".to_string()),
            email: Set("admin1@example.com".to_string()),
            phone: Set("8888888888".to_string()),
            password_hash: Set("hash".to_string()),
            address: Set("Elsewhere".to_string()),
            dob: Set(dob()),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err(), "duplicate email must be rejected");

        Ok(())
    }
}

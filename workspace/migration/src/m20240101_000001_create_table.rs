use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Role))
                    .col(string(Users::Name))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Phone))
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Address))
                    .col(date(Users::Dob))
                    .col(string_null(Users::Department))
                    .col(string_null(Users::Semester))
                    .col(string_null(Users::RollNo))
                    .col(string_null(Users::Designation))
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_auto(Students::Id))
                    .col(string_null(Students::RollNo))
                    .col(string_null(Students::RollNumber))
                    .col(string(Students::Name))
                    .col(string(Students::Department))
                    .col(integer(Students::Semester))
                    .col(string(Students::Email).unique_key())
                    .col(string(Students::Phone))
                    .col(string(Students::Status).default("Active"))
                    .col(string(Students::Address))
                    .col(date(Students::Dob))
                    .col(integer(Students::UserId).unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_user")
                            .from(Students::Table, Students::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create faculty table
        manager
            .create_table(
                Table::create()
                    .table(Faculty::Table)
                    .if_not_exists()
                    .col(pk_auto(Faculty::Id))
                    .col(integer_null(Faculty::UserId))
                    .col(string(Faculty::Name))
                    .col(string(Faculty::Email).unique_key())
                    .col(string(Faculty::Department))
                    .col(string(Faculty::Semester))
                    .col(string_null(Faculty::Phone))
                    .col(string(Faculty::Status).default("Active"))
                    .col(string(Faculty::Address))
                    .col(string(Faculty::Designation))
                    .col(date(Faculty::Dob))
                    .col(json(Faculty::Subjects))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faculty_user")
                            .from(Faculty::Table, Faculty::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create faculty_profiles table
        manager
            .create_table(
                Table::create()
                    .table(FacultyProfiles::Table)
                    .if_not_exists()
                    .col(pk_auto(FacultyProfiles::Id))
                    .col(integer(FacultyProfiles::FacultyId).unique_key())
                    .col(integer(FacultyProfiles::UserId))
                    .col(string(FacultyProfiles::Qualification).default(""))
                    .col(string(FacultyProfiles::Experience).default(""))
                    .col(date_time(FacultyProfiles::JoiningDate))
                    .col(json(FacultyProfiles::ProfileSubjects))
                    .col(date_time(FacultyProfiles::CreatedAt))
                    .col(date_time(FacultyProfiles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faculty_profile_faculty")
                            .from(FacultyProfiles::Table, FacultyProfiles::FacultyId)
                            .to(Faculty::Table, Faculty::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faculty_profile_user")
                            .from(FacultyProfiles::Table, FacultyProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create subjects table
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(pk_auto(Subjects::Id))
                    .col(string(Subjects::Code).unique_key())
                    .col(string(Subjects::Name))
                    .col(string(Subjects::Department))
                    .col(integer(Subjects::Semester))
                    .col(string(Subjects::Faculty))
                    .to_owned(),
            )
            .await?;

        // Create marksheets table
        manager
            .create_table(
                Table::create()
                    .table(Marksheets::Table)
                    .if_not_exists()
                    .col(pk_auto(Marksheets::Id))
                    .col(integer(Marksheets::StudentId))
                    .col(integer(Marksheets::SubjectId))
                    .col(string(Marksheets::StudentName))
                    .col(string_null(Marksheets::RollNo))
                    .col(string(Marksheets::SubjectName))
                    .col(string(Marksheets::SubjectCode))
                    .col(integer(Marksheets::Mid1))
                    .col(integer(Marksheets::Mid2))
                    .col(integer(Marksheets::Assignment))
                    .col(integer(Marksheets::Attendance))
                    .col(integer(Marksheets::External))
                    .col(integer(Marksheets::BestOfTwo))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marksheet_student")
                            .from(Marksheets::Table, Marksheets::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marksheet_subject")
                            .from(Marksheets::Table, Marksheets::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One marksheet per (student, subject) pair; the engine upserts on
        // this key.
        manager
            .create_index(
                Index::create()
                    .name("idx_marksheet_student_subject")
                    .table(Marksheets::Table)
                    .col(Marksheets::StudentId)
                    .col(Marksheets::SubjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create departments table
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(pk_auto(Departments::Id))
                    .col(string(Departments::DeptId).unique_key())
                    .col(string(Departments::Name))
                    .col(string(Departments::Hod))
                    .col(integer(Departments::TotalFaculty))
                    .col(integer(Departments::TotalStudents))
                    .col(string_null(Departments::Established))
                    .col(string_null(Departments::Contact))
                    .to_owned(),
            )
            .await?;

        // Create semesters table
        manager
            .create_table(
                Table::create()
                    .table(Semesters::Table)
                    .if_not_exists()
                    .col(pk_auto(Semesters::Id))
                    .col(string(Semesters::Name))
                    .col(string(Semesters::AcademicYear))
                    .col(date(Semesters::StartDate))
                    .col(date(Semesters::EndDate))
                    .col(string(Semesters::Status).default("Upcoming"))
                    .col(integer(Semesters::TotalSubjects))
                    .col(integer(Semesters::TotalStudents))
                    .col(string_null(Semesters::Description))
                    .to_owned(),
            )
            .await?;

        // Create dashboard_stats table (singleton projection)
        manager
            .create_table(
                Table::create()
                    .table(DashboardStats::Table)
                    .if_not_exists()
                    .col(pk_auto(DashboardStats::Id))
                    .col(integer(DashboardStats::TotalStudents).default(0))
                    .col(integer(DashboardStats::TotalFaculty).default(0))
                    .col(integer(DashboardStats::Departments).default(0))
                    .col(integer(DashboardStats::Subjects).default(0))
                    .col(date_time(DashboardStats::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create pending_registrations table
        manager
            .create_table(
                Table::create()
                    .table(PendingRegistrations::Table)
                    .if_not_exists()
                    .col(pk_auto(PendingRegistrations::Id))
                    .col(string(PendingRegistrations::Name))
                    .col(string(PendingRegistrations::Email).unique_key())
                    .col(string(PendingRegistrations::PasswordHash))
                    .col(string(PendingRegistrations::Role))
                    .col(string_null(PendingRegistrations::Department))
                    .col(string_null(PendingRegistrations::Semester))
                    .col(string_null(PendingRegistrations::RollNo))
                    .col(string_null(PendingRegistrations::Designation))
                    .col(string_null(PendingRegistrations::PhoneNumber))
                    .col(string_null(PendingRegistrations::Address))
                    .col(date_null(PendingRegistrations::DateOfBirth))
                    .col(string(PendingRegistrations::Status).default("pending"))
                    .col(date_time(PendingRegistrations::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingRegistrations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DashboardStats::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Semesters::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Marksheets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(FacultyProfiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Faculty::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Role,
    Name,
    Email,
    Phone,
    PasswordHash,
    Address,
    Dob,
    Department,
    Semester,
    RollNo,
    Designation,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    RollNo,
    RollNumber,
    Name,
    Department,
    Semester,
    Email,
    Phone,
    Status,
    Address,
    Dob,
    UserId,
}

#[derive(DeriveIden)]
enum Faculty {
    Table,
    Id,
    UserId,
    Name,
    Email,
    Department,
    Semester,
    Phone,
    Status,
    Address,
    Designation,
    Dob,
    Subjects,
}

#[derive(DeriveIden)]
enum FacultyProfiles {
    Table,
    Id,
    FacultyId,
    UserId,
    Qualification,
    Experience,
    JoiningDate,
    ProfileSubjects,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
    Code,
    Name,
    Department,
    Semester,
    Faculty,
}

#[derive(DeriveIden)]
enum Marksheets {
    Table,
    Id,
    StudentId,
    SubjectId,
    StudentName,
    RollNo,
    SubjectName,
    SubjectCode,
    Mid1,
    Mid2,
    Assignment,
    Attendance,
    External,
    BestOfTwo,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    DeptId,
    Name,
    Hod,
    TotalFaculty,
    TotalStudents,
    Established,
    Contact,
}

#[derive(DeriveIden)]
enum Semesters {
    Table,
    Id,
    Name,
    AcademicYear,
    StartDate,
    EndDate,
    Status,
    TotalSubjects,
    TotalStudents,
    Description,
}

#[derive(DeriveIden)]
enum DashboardStats {
    Table,
    Id,
    TotalStudents,
    TotalFaculty,
    Departments,
    Subjects,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PendingRegistrations {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    Department,
    Semester,
    RollNo,
    Designation,
    PhoneNumber,
    Address,
    DateOfBirth,
    Status,
    CreatedAt,
}

use axum::{http::StatusCode, response::Json};
use registrar::RegistrarError;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Secret used to sign and verify session tokens
    pub jwt_secret: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret must never land in trace output.
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Maps a domain error to the HTTP status and error envelope it is served
/// as. Database failures are served with a generic message; callers that
/// need the raw database text handle that variant themselves.
pub fn registrar_error_response(err: RegistrarError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, error) = match &err {
        RegistrarError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        RegistrarError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        RegistrarError::Authorization(msg) => {
            (StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR", msg.clone())
        }
        RegistrarError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        RegistrarError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "Internal server error".to_string(),
        ),
    };
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps a database error from a create or update to a response, promoting
/// unique constraint violations to a conflict the client can act on.
pub fn write_error_response(
    resource: &str,
    err: sea_orm::DbErr,
) -> (StatusCode, Json<ErrorResponse>) {
    if let sea_orm::DbErr::Exec(ref exec_err) = err {
        let error_msg = exec_err.to_string().to_lowercase();
        if error_msg.contains("unique") || error_msg.contains("constraint") {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("{resource} already exists"),
                    code: "CONFLICT".to_string(),
                    success: false,
                }),
            );
        }
    }
    registrar_error_response(RegistrarError::Database(err))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::students::get_students,
        crate::handlers::students::create_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::students::search_students,
        crate::handlers::faculty::get_faculty,
        crate::handlers::faculty::create_faculty,
        crate::handlers::faculty::update_faculty,
        crate::handlers::faculty::delete_faculty,
        crate::handlers::departments::get_departments,
        crate::handlers::departments::create_department,
        crate::handlers::departments::update_department,
        crate::handlers::departments::delete_department,
        crate::handlers::semesters::get_semesters,
        crate::handlers::semesters::create_semester,
        crate::handlers::semesters::update_semester,
        crate::handlers::semesters::delete_semester,
        crate::handlers::subjects::get_subjects,
        crate::handlers::subjects::create_subject,
        crate::handlers::subjects::update_subject,
        crate::handlers::subjects::delete_subject,
        crate::handlers::users::get_users_by_role,
        crate::handlers::users::get_admins,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::marksheets::save_marks,
        crate::handlers::marksheets::get_student_marksheets,
        crate::handlers::marksheets::search_marksheets,
        crate::handlers::faculty_profile::get_profile_for_user,
        crate::handlers::faculty_profile::get_profiles,
        crate::handlers::faculty_profile::get_profile,
        crate::handlers::faculty_profile::update_profile,
        crate::handlers::pending_registrations::submit_registration,
        crate::handlers::pending_registrations::get_pending_registrations,
        crate::handlers::pending_registrations::approve_registration,
        crate::handlers::pending_registrations::reject_registration,
        crate::handlers::dashboard::get_dashboard_counts,
        crate::handlers::dashboard::get_dashboard_stats,
        crate::handlers::dashboard::update_dashboard_stats,
        crate::handlers::student_dashboard::get_my_dashboard,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::users::UserResponse,
            crate::handlers::users::AdminResponse,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::students::StudentPayload,
            crate::handlers::students::StudentResponse,
            crate::handlers::students::StudentSearchResponse,
            crate::handlers::faculty::FacultyPayload,
            crate::handlers::faculty::FacultyResponse,
            crate::handlers::departments::DepartmentPayload,
            crate::handlers::departments::DepartmentResponse,
            crate::handlers::semesters::SemesterPayload,
            crate::handlers::semesters::SemesterResponse,
            crate::handlers::subjects::SubjectPayload,
            crate::handlers::subjects::SubjectResponse,
            crate::handlers::marksheets::SaveMarksRequest,
            crate::handlers::marksheets::MarksheetResponse,
            crate::handlers::marksheets::MarksheetSearchResponse,
            crate::handlers::faculty_profile::FacultyProfileView,
            crate::handlers::faculty_profile::ProfileUpdateRequest,
            crate::handlers::pending_registrations::RegisterRequest,
            crate::handlers::pending_registrations::PendingRegistrationResponse,
            crate::handlers::dashboard::DashboardCounts,
            crate::handlers::dashboard::DashboardStatsPayload,
            crate::handlers::dashboard::DashboardStatsResponse,
            crate::handlers::student_dashboard::StudentDashboardResponse,
            crate::handlers::student_dashboard::StudentInfo,
            crate::handlers::student_dashboard::SubjectMarks,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login and session tokens"),
        (name = "students", description = "Student management endpoints"),
        (name = "faculty", description = "Faculty management endpoints"),
        (name = "departments", description = "Department management endpoints"),
        (name = "semesters", description = "Semester management endpoints"),
        (name = "subjects", description = "Subject management and faculty assignment endpoints"),
        (name = "users", description = "User account endpoints"),
        (name = "marksheets", description = "Marksheet entry and lookup endpoints"),
        (name = "faculty-profile", description = "Faculty profile endpoints"),
        (name = "registrations", description = "Registration approval workflow endpoints"),
        (name = "dashboard", description = "Dashboard statistics endpoints"),
    ),
    info(
        title = "AcadRust API",
        description = "Academic records backend - role-based management of students, faculty, subjects and marksheets",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;

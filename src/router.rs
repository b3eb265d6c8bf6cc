use crate::handlers::{
    auth::login,
    dashboard::{get_dashboard_counts, get_dashboard_stats, update_dashboard_stats},
    departments::{create_department, delete_department, get_departments, update_department},
    faculty::{create_faculty, delete_faculty, get_faculty, update_faculty},
    faculty_profile::{get_profile, get_profile_for_user, get_profiles, update_profile},
    health::health_check,
    marksheets::{get_student_marksheets, save_marks, search_marksheets},
    pending_registrations::{
        approve_registration, get_pending_registrations, reject_registration, submit_registration,
    },
    semesters::{create_semester, delete_semester, get_semesters, update_semester},
    student_dashboard::get_my_dashboard,
    students::{create_student, delete_student, get_students, search_students, update_student},
    subjects::{create_subject, delete_subject, get_subjects, update_subject},
    users::{delete_user, get_admins, get_user, get_users_by_role, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/auth/login", post(login))
        // Student CRUD routes
        .route("/api/students", get(get_students))
        .route("/api/students", post(create_student))
        .route("/api/students/search", get(search_students))
        .route("/api/students/:student_id", put(update_student))
        .route("/api/students/:student_id", delete(delete_student))
        // Faculty CRUD routes
        .route("/api/faculty", get(get_faculty))
        .route("/api/faculty", post(create_faculty))
        .route("/api/faculty/:faculty_id", put(update_faculty))
        .route("/api/faculty/:faculty_id", delete(delete_faculty))
        // Department CRUD routes, keyed by the external identifier
        .route("/api/departments", get(get_departments))
        .route("/api/departments", post(create_department))
        .route("/api/departments/:dept_id", put(update_department))
        .route("/api/departments/:dept_id", delete(delete_department))
        // Semester CRUD routes
        .route("/api/semesters", get(get_semesters))
        .route("/api/semesters", post(create_semester))
        .route("/api/semesters/:semester_id", put(update_semester))
        .route("/api/semesters/:semester_id", delete(delete_semester))
        // Subject CRUD routes
        .route("/api/subjects", get(get_subjects))
        .route("/api/subjects", post(create_subject))
        .route("/api/subjects/:subject_id", put(update_subject))
        .route("/api/subjects/:subject_id", delete(delete_subject))
        // User routes
        .route("/api/users", get(get_users_by_role))
        .route("/api/users/admins", get(get_admins))
        .route("/api/users/:user_id", get(get_user))
        .route("/api/users/:user_id", put(update_user))
        .route("/api/users/:user_id", delete(delete_user))
        // Marksheet routes
        .route("/api/marksheets", post(save_marks))
        .route("/api/marksheets/search", get(search_marksheets))
        .route("/api/marksheets/student/:roll_no", get(get_student_marksheets))
        // Faculty profile routes
        .route("/api/faculty-profile", get(get_profiles))
        .route("/api/faculty-profile/user/:user_id", get(get_profile_for_user))
        .route("/api/faculty-profile/:faculty_id", get(get_profile))
        .route("/api/faculty-profile/:faculty_id", put(update_profile))
        // Registration approval routes
        .route("/api/pending-registrations", post(submit_registration))
        .route("/api/pending-registrations", get(get_pending_registrations))
        .route(
            "/api/pending-registrations/:registration_id/approve",
            post(approve_registration),
        )
        .route(
            "/api/pending-registrations/:registration_id/reject",
            post(reject_registration),
        )
        // Dashboard routes
        .route("/api/dashboard/stats", get(get_dashboard_counts))
        .route("/api/dashboard-stats", get(get_dashboard_stats))
        .route("/api/dashboard-stats", put(update_dashboard_stats))
        .route("/api/student-dashboard/me", get(get_my_dashboard))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

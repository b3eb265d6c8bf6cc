use crate::auth::AuthUser;
use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::prelude::{Marksheet, Student, User};
use model::entities::{marksheet, student};
use registrar::marksheet::find_student_by_roll;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};
use utoipa::ToSchema;

use super::students::student_not_found;

/// Header block of the student dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: String,
    pub roll_no: Option<String>,
    pub department: String,
    pub semester: i32,
    pub email: String,
    pub phone: String,
}

/// Per-subject marks line on the student dashboard. `best_of_two` is
/// recomputed from the stored mids so stale rows still render correctly.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMarks {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub mid1: i32,
    pub mid2: i32,
    pub best_of_two: i32,
    pub assignment: i32,
    pub external: i32,
    pub attendance: i32,
}

impl From<marksheet::Model> for SubjectMarks {
    fn from(model: marksheet::Model) -> Self {
        Self {
            id: model.id,
            code: model.subject_code,
            name: model.subject_name,
            mid1: model.mid1,
            mid2: model.mid2,
            best_of_two: model.mid1.max(model.mid2),
            assignment: model.assignment,
            external: model.external,
            attendance: model.attendance,
        }
    }
}

/// Everything the student dashboard page needs in one response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboardResponse {
    pub student_info: StudentInfo,
    pub subjects: Vec<SubjectMarks>,
}

/// Get the dashboard for the authenticated student.
///
/// The student record is located by user reference first, then by the
/// account email, then by the roll number carried on the user. Old records
/// imported without a user link still resolve through the fallbacks.
#[utoipa::path(
    get,
    path = "/api/student-dashboard/me",
    tag = "student-dashboard",
    responses(
        (status = 200, description = "Dashboard retrieved successfully", body = ApiResponse<StudentDashboardResponse>),
        (status = 401, description = "Missing access token", body = ErrorResponse),
        (status = 404, description = "User or student record not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state), fields(user_id = auth.id))]
pub async fn get_my_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StudentDashboardResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let user_row = User::find_by_id(auth.id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup user {}: {}", auth.id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Authenticated user {} no longer exists", auth.id);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".to_string(),
                    code: "NOT_FOUND".to_string(),
                    success: false,
                }),
            )
        })?;

    let mut student_row = Student::find()
        .filter(student::Column::UserId.eq(user_row.id))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup student by user reference: {}", e);
            registrar_error_response(e.into())
        })?;

    if student_row.is_none() {
        student_row = Student::find()
            .filter(student::Column::Email.eq(user_row.email.clone()))
            .one(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to lookup student by email: {}", e);
                registrar_error_response(e.into())
            })?;
    }

    if student_row.is_none() {
        if let Some(roll_no) = user_row.roll_no.as_deref() {
            student_row = find_student_by_roll(&state.db, roll_no).await.map_err(|e| {
                error!("Failed to lookup student by roll number: {}", e);
                registrar_error_response(e)
            })?;
        }
    }

    let student_row = student_row.ok_or_else(|| {
        warn!(user_id = user_row.id, "no student record behind this account");
        student_not_found()
    })?;

    let marksheets = Marksheet::find()
        .filter(marksheet::Column::StudentId.eq(student_row.id))
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to load marksheets for student {}: {}", student_row.id, e);
            registrar_error_response(e.into())
        })?;

    debug!(
        student_id = student_row.id,
        subjects = marksheets.len(),
        "student dashboard assembled"
    );

    let student_info = StudentInfo {
        name: if student_row.name.trim().is_empty() {
            user_row.name.clone()
        } else {
            student_row.name.clone()
        },
        roll_no: student_row.roll_no.clone().or(student_row.roll_number.clone()),
        department: student_row.department.clone(),
        semester: student_row.semester,
        email: if student_row.email.trim().is_empty() {
            user_row.email.clone()
        } else {
            student_row.email.clone()
        },
        phone: student_row.phone.clone(),
    };

    Ok(Json(ApiResponse {
        data: StudentDashboardResponse {
            student_info,
            subjects: marksheets.into_iter().map(SubjectMarks::from).collect(),
        },
        message: "Dashboard retrieved successfully".to_string(),
        success: true,
    }))
}

use crate::auth::AuthUser;
use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::marksheet;
use model::entities::prelude::Marksheet;
use registrar::marksheet::{find_student_by_roll, MarkEntry, MarksheetEngine};
use registrar::RegistrarError;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::students::{find_student_by_fragment, student_not_found, StudentResponse};

/// Request body for recording marks
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveMarksRequest {
    pub roll_no: Option<String>,
    pub subject_code: Option<String>,
    pub mid1: Option<i32>,
    pub mid2: Option<i32>,
    pub assignment: Option<i32>,
    pub attendance: Option<i32>,
    pub external: Option<i32>,
}

/// Marksheet response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarksheetResponse {
    pub id: i32,
    pub student_id: i32,
    pub subject_id: i32,
    pub student_name: String,
    pub roll_no: Option<String>,
    pub subject_name: String,
    pub subject_code: String,
    pub mid1: i32,
    pub mid2: i32,
    pub assignment: i32,
    pub attendance: i32,
    pub external: i32,
    pub best_of_two: i32,
}

impl From<marksheet::Model> for MarksheetResponse {
    fn from(model: marksheet::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            subject_id: model.subject_id,
            student_name: model.student_name,
            roll_no: model.roll_no,
            subject_name: model.subject_name,
            subject_code: model.subject_code,
            mid1: model.mid1,
            mid2: model.mid2,
            assignment: model.assignment,
            attendance: model.attendance,
            external: model.external,
            best_of_two: model.best_of_two,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarksheetSearchQuery {
    pub query: Option<String>,
}

/// A student and their marksheets.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarksheetSearchResponse {
    pub student: StudentResponse,
    pub subjects: Vec<MarksheetResponse>,
}

/// Record marks for a student in a subject. The caller must be the faculty
/// member assigned to the subject, in the student's department.
#[utoipa::path(
    post,
    path = "/api/marksheets",
    tag = "marksheets",
    request_body = SaveMarksRequest,
    responses(
        (status = 200, description = "Marks saved successfully", body = ApiResponse<MarksheetResponse>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Not authorized for this student or subject", body = ErrorResponse),
        (status = 404, description = "Student or subject not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(faculty_user_id = auth.id))]
pub async fn save_marks(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<SaveMarksRequest>,
) -> Result<Json<ApiResponse<MarksheetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let entry = MarkEntry {
        roll_no: request.roll_no,
        subject_code: request.subject_code,
        mid1: request.mid1,
        mid2: request.mid2,
        assignment: request.assignment,
        attendance: request.attendance,
        external: request.external,
    };

    let saved = MarksheetEngine::new()
        .save_marks(&state.db, auth.id, entry)
        .await
        .map_err(|e| match e {
            // This endpoint historically surfaces the raw database text.
            RegistrarError::Database(_) => {
                error!("Marksheet write failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: e.to_string(),
                        code: "DATABASE_ERROR".to_string(),
                        success: false,
                    }),
                )
            }
            other => {
                warn!("Marksheet write rejected: {}", other);
                registrar_error_response(other)
            }
        })?;

    info!(marksheet_id = saved.id, "marks saved");
    Ok(Json(ApiResponse {
        data: MarksheetResponse::from(saved),
        message: "Marks saved successfully".to_string(),
        success: true,
    }))
}

/// Get all marks for a student by roll number
#[utoipa::path(
    get,
    path = "/api/marksheets/student/{roll_no}",
    tag = "marksheets",
    params(
        ("roll_no" = String, Path, description = "Student roll number"),
    ),
    responses(
        (status = 200, description = "Marksheets retrieved successfully", body = ApiResponse<Vec<MarksheetResponse>>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student_marksheets(
    _auth: AuthUser,
    Path(roll_no): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MarksheetResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let student = find_student_by_roll(&state.db, &roll_no)
        .await
        .map_err(|e| {
            error!("Failed to look up student by roll number: {}", e);
            registrar_error_response(e)
        })?
        .ok_or_else(|| {
            warn!("No student with roll number {}", roll_no);
            student_not_found()
        })?;

    let marksheets = Marksheet::find()
        .filter(marksheet::Column::StudentId.eq(student.id))
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to load marksheets for student {}: {}", student.id, e);
            registrar_error_response(e.into())
        })?;

    Ok(Json(ApiResponse {
        data: marksheets.into_iter().map(MarksheetResponse::from).collect(),
        message: "Marksheets retrieved successfully".to_string(),
        success: true,
    }))
}

/// Search for a student and return their marksheets
#[utoipa::path(
    get,
    path = "/api/marksheets/search",
    tag = "marksheets",
    params(
        ("query" = String, Query, description = "Roll number, name or email fragment"),
    ),
    responses(
        (status = 200, description = "Student found", body = ApiResponse<MarksheetSearchResponse>),
        (status = 400, description = "Missing query parameter", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn search_marksheets(
    Query(query): Query<MarksheetSearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MarksheetSearchResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let Some(needle) = query.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Query parameter is required".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    };

    let student = find_student_by_fragment(&state, needle)
        .await?
        .ok_or_else(|| {
            warn!("No student matched marksheet search");
            student_not_found()
        })?;

    let subjects = Marksheet::find()
        .filter(marksheet::Column::StudentId.eq(student.id))
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to load marksheets for student {}: {}", student.id, e);
            registrar_error_response(e.into())
        })?;

    Ok(Json(ApiResponse {
        data: MarksheetSearchResponse {
            student: StudentResponse::from(student),
            subjects: subjects.into_iter().map(MarksheetResponse::from).collect(),
        },
        message: "Student retrieved successfully".to_string(),
        success: true,
    }))
}

use crate::schemas::{
    registrar_error_response, write_error_response, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::faculty::{self, FacultyStatus};
use model::entities::prelude::Faculty;
use model::SubjectCodes;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::dashboard::refresh_dashboard;

/// Request body for creating or replacing a faculty member.
///
/// There is deliberately no `subjects` field: assignment lists are owned by
/// the subject endpoints and change only through reconciliation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FacultyPayload {
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub department: String,
    pub semester: String,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>)]
    pub status: Option<FacultyStatus>,
    pub address: String,
    pub designation: String,
    pub dob: NaiveDate,
}

/// Faculty response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FacultyResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub department: String,
    pub semester: String,
    pub phone: Option<String>,
    #[schema(value_type = String)]
    pub status: FacultyStatus,
    pub address: String,
    pub designation: String,
    pub dob: NaiveDate,
    pub subjects: Vec<String>,
}

impl From<faculty::Model> for FacultyResponse {
    fn from(model: faculty::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            email: model.email,
            department: model.department,
            semester: model.semester,
            phone: model.phone,
            status: model.status,
            address: model.address,
            designation: model.designation,
            dob: model.dob,
            subjects: model.subjects.0,
        }
    }
}

/// List all faculty
#[utoipa::path(
    get,
    path = "/api/faculty",
    tag = "faculty",
    responses(
        (status = 200, description = "Faculty retrieved successfully", body = ApiResponse<Vec<FacultyResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_faculty(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FacultyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let faculty = Faculty::find().all(&state.db).await.map_err(|e| {
        error!("Failed to retrieve faculty: {}", e);
        registrar_error_response(e.into())
    })?;

    debug!("Retrieved {} faculty members", faculty.len());
    Ok(Json(ApiResponse {
        data: faculty.into_iter().map(FacultyResponse::from).collect(),
        message: "Faculty retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new faculty member
#[utoipa::path(
    post,
    path = "/api/faculty",
    tag = "faculty",
    request_body = FacultyPayload,
    responses(
        (status = 201, description = "Faculty created successfully", body = ApiResponse<FacultyResponse>),
        (status = 409, description = "Faculty already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create_faculty(
    State(state): State<AppState>,
    Json(request): Json<FacultyPayload>,
) -> Result<(StatusCode, Json<ApiResponse<FacultyResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let created = faculty::ActiveModel {
        user_id: Set(request.user_id),
        name: Set(request.name.clone()),
        email: Set(request.email.clone()),
        department: Set(request.department.clone()),
        semester: Set(request.semester.clone()),
        phone: Set(request.phone.clone()),
        status: Set(request.status.unwrap_or(FacultyStatus::Active)),
        address: Set(request.address.clone()),
        designation: Set(request.designation.clone()),
        dob: Set(request.dob),
        subjects: Set(SubjectCodes::new()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create faculty '{}': {}", request.email, e);
        write_error_response("Faculty", e)
    })?;

    info!("Faculty created successfully with ID: {}", created.id);
    refresh_dashboard(&state.db).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: FacultyResponse::from(created),
            message: "Faculty created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a faculty member. The assignment list is left untouched.
#[utoipa::path(
    put,
    path = "/api/faculty/{faculty_id}",
    tag = "faculty",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    request_body = FacultyPayload,
    responses(
        (status = 200, description = "Faculty updated successfully", body = ApiResponse<FacultyResponse>),
        (status = 404, description = "Faculty not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<FacultyPayload>,
) -> Result<Json<ApiResponse<FacultyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = Faculty::find_by_id(faculty_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup faculty {} for update: {}", faculty_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Faculty with ID {} not found for update", faculty_id);
            faculty_not_found()
        })?;

    let mut active: faculty::ActiveModel = existing.into();
    active.user_id = Set(request.user_id);
    active.name = Set(request.name.clone());
    active.email = Set(request.email.clone());
    active.department = Set(request.department.clone());
    active.semester = Set(request.semester.clone());
    active.phone = Set(request.phone.clone());
    if let Some(status) = request.status {
        active.status = Set(status);
    }
    active.address = Set(request.address.clone());
    active.designation = Set(request.designation.clone());
    active.dob = Set(request.dob);

    let updated = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update faculty {}: {}", faculty_id, e);
        registrar_error_response(e.into())
    })?;

    info!("Faculty with ID {} updated successfully", faculty_id);
    refresh_dashboard(&state.db).await;

    Ok(Json(ApiResponse {
        data: FacultyResponse::from(updated),
        message: "Faculty updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a faculty member
#[utoipa::path(
    delete,
    path = "/api/faculty/{faculty_id}",
    tag = "faculty",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    responses(
        (status = 200, description = "Faculty deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Faculty not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = Faculty::delete_by_id(faculty_id)
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete faculty {}: {}", faculty_id, e);
            registrar_error_response(e.into())
        })?;

    if result.rows_affected == 0 {
        warn!("Faculty with ID {} not found for deletion", faculty_id);
        return Err(faculty_not_found());
    }

    info!("Faculty with ID {} deleted successfully", faculty_id);
    refresh_dashboard(&state.db).await;

    Ok(Json(ApiResponse {
        data: format!("Faculty {} deleted", faculty_id),
        message: "Faculty deleted".to_string(),
        success: true,
    }))
}

pub(crate) fn faculty_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Faculty not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

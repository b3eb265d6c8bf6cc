use crate::schemas::{
    registrar_error_response, write_error_response, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::prelude::Semester;
use model::entities::semester::{self, SemesterStatus};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for creating or replacing a semester
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SemesterPayload {
    pub name: String,
    pub academic_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub status: Option<SemesterStatus>,
    pub total_subjects: Option<i32>,
    pub total_students: Option<i32>,
    pub description: Option<String>,
}

/// Semester response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SemesterResponse {
    pub id: i32,
    pub name: String,
    pub academic_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = String)]
    pub status: SemesterStatus,
    pub total_subjects: i32,
    pub total_students: i32,
    pub description: Option<String>,
}

impl From<semester::Model> for SemesterResponse {
    fn from(model: semester::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            academic_year: model.academic_year,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status,
            total_subjects: model.total_subjects,
            total_students: model.total_students,
            description: model.description,
        }
    }
}

/// List all semesters
#[utoipa::path(
    get,
    path = "/api/semesters",
    tag = "semesters",
    responses(
        (status = 200, description = "Semesters retrieved successfully", body = ApiResponse<Vec<SemesterResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_semesters(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SemesterResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let semesters = Semester::find().all(&state.db).await.map_err(|e| {
        error!("Failed to retrieve semesters: {}", e);
        registrar_error_response(e.into())
    })?;

    debug!("Retrieved {} semesters", semesters.len());
    Ok(Json(ApiResponse {
        data: semesters.into_iter().map(SemesterResponse::from).collect(),
        message: "Semesters retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new semester
#[utoipa::path(
    post,
    path = "/api/semesters",
    tag = "semesters",
    request_body = SemesterPayload,
    responses(
        (status = 201, description = "Semester created successfully", body = ApiResponse<SemesterResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn create_semester(
    State(state): State<AppState>,
    Json(request): Json<SemesterPayload>,
) -> Result<(StatusCode, Json<ApiResponse<SemesterResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let created = semester::ActiveModel {
        name: Set(request.name.clone()),
        academic_year: Set(request.academic_year.clone()),
        start_date: Set(request.start_date),
        end_date: Set(request.end_date),
        status: Set(request.status.unwrap_or(SemesterStatus::Upcoming)),
        total_subjects: Set(request.total_subjects.unwrap_or(0)),
        total_students: Set(request.total_students.unwrap_or(0)),
        description: Set(request.description.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create semester '{}': {}", request.name, e);
        write_error_response("Semester", e)
    })?;

    info!("Semester created successfully with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SemesterResponse::from(created),
            message: "Semester created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a semester
#[utoipa::path(
    put,
    path = "/api/semesters/{semester_id}",
    tag = "semesters",
    params(
        ("semester_id" = i32, Path, description = "Semester ID"),
    ),
    request_body = SemesterPayload,
    responses(
        (status = 200, description = "Semester updated successfully", body = ApiResponse<SemesterResponse>),
        (status = 404, description = "Semester not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_semester(
    Path(semester_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<SemesterPayload>,
) -> Result<Json<ApiResponse<SemesterResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = Semester::find_by_id(semester_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup semester {} for update: {}", semester_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Semester with ID {} not found for update", semester_id);
            semester_not_found()
        })?;

    let mut active: semester::ActiveModel = existing.into();
    active.name = Set(request.name.clone());
    active.academic_year = Set(request.academic_year.clone());
    active.start_date = Set(request.start_date);
    active.end_date = Set(request.end_date);
    if let Some(status) = request.status {
        active.status = Set(status);
    }
    if let Some(total_subjects) = request.total_subjects {
        active.total_subjects = Set(total_subjects);
    }
    if let Some(total_students) = request.total_students {
        active.total_students = Set(total_students);
    }
    active.description = Set(request.description.clone());

    let updated = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update semester {}: {}", semester_id, e);
        registrar_error_response(e.into())
    })?;

    info!("Semester with ID {} updated successfully", semester_id);
    Ok(Json(ApiResponse {
        data: SemesterResponse::from(updated),
        message: "Semester updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a semester
#[utoipa::path(
    delete,
    path = "/api/semesters/{semester_id}",
    tag = "semesters",
    params(
        ("semester_id" = i32, Path, description = "Semester ID"),
    ),
    responses(
        (status = 200, description = "Semester deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Semester not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_semester(
    Path(semester_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = Semester::delete_by_id(semester_id)
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete semester {}: {}", semester_id, e);
            registrar_error_response(e.into())
        })?;

    if result.rows_affected == 0 {
        warn!("Semester with ID {} not found for deletion", semester_id);
        return Err(semester_not_found());
    }

    info!("Semester with ID {} deleted successfully", semester_id);
    Ok(Json(ApiResponse {
        data: format!("Semester {} deleted", semester_id),
        message: "Semester deleted".to_string(),
        success: true,
    }))
}

fn semester_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Semester not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

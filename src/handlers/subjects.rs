use crate::schemas::{
    registrar_error_response, write_error_response, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::prelude::Subject;
use model::entities::subject;
use registrar::faculty_link::resolve_faculty;
use registrar::reconciler::AssignmentReconciler;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::dashboard::refresh_dashboard;

/// Request body for creating or replacing a subject. `faculty` is a name or
/// email and must resolve to an existing faculty member.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SubjectPayload {
    pub code: String,
    pub name: String,
    pub department: String,
    #[serde(deserialize_with = "coerce_semester")]
    #[schema(value_type = i32)]
    pub semester: i32,
    pub faculty: String,
}

fn coerce_semester<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(|v| v as i32)
            .ok_or_else(|| serde::de::Error::custom("semester must be an integer")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom("semester must be a number")),
        _ => Err(serde::de::Error::custom("semester must be a number")),
    }
}

/// Subject response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub department: String,
    pub semester: i32,
    pub faculty: String,
}

impl From<subject::Model> for SubjectResponse {
    fn from(model: subject::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            department: model.department,
            semester: model.semester,
            faculty: model.faculty,
        }
    }
}

/// List all subjects
#[utoipa::path(
    get,
    path = "/api/subjects",
    tag = "subjects",
    responses(
        (status = 200, description = "Subjects retrieved successfully", body = ApiResponse<Vec<SubjectResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_subjects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SubjectResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let subjects = Subject::find().all(&state.db).await.map_err(|e| {
        error!("Failed to retrieve subjects: {}", e);
        registrar_error_response(e.into())
    })?;

    debug!("Retrieved {} subjects", subjects.len());
    Ok(Json(ApiResponse {
        data: subjects.into_iter().map(SubjectResponse::from).collect(),
        message: "Subjects retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new subject and assign it to its faculty member
#[utoipa::path(
    post,
    path = "/api/subjects",
    tag = "subjects",
    request_body = SubjectPayload,
    responses(
        (status = 201, description = "Subject created successfully", body = ApiResponse<SubjectResponse>),
        (status = 400, description = "Faculty does not resolve", body = ErrorResponse),
        (status = 409, description = "Subject already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(code = %request.code))]
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<SubjectPayload>,
) -> Result<(StatusCode, Json<ApiResponse<SubjectResponse>>), (StatusCode, Json<ErrorResponse>)> {
    // The assignment gate: the identifier must resolve before anything is
    // written.
    ensure_faculty_resolves(&state, &request.faculty).await?;

    let created = subject::ActiveModel {
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        department: Set(request.department.clone()),
        semester: Set(request.semester),
        faculty: Set(request.faculty.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create subject '{}': {}", request.code, e);
        write_error_response("Subject", e)
    })?;

    info!("Subject created successfully with ID: {}", created.id);
    refresh_dashboard(&state.db).await;

    if let Err(e) = AssignmentReconciler::new()
        .reconcile(&state.db, Some(&created.faculty), &created.code, None)
        .await
    {
        error!("Assignment reconciliation failed for {}: {}", created.code, e);
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SubjectResponse::from(created),
            message: "Subject created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a subject, moving the assignment when the faculty changed
#[utoipa::path(
    put,
    path = "/api/subjects/{subject_id}",
    tag = "subjects",
    params(
        ("subject_id" = i32, Path, description = "Subject ID"),
    ),
    request_body = SubjectPayload,
    responses(
        (status = 200, description = "Subject updated successfully", body = ApiResponse<SubjectResponse>),
        (status = 400, description = "Faculty does not resolve", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_subject(
    Path(subject_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<SubjectPayload>,
) -> Result<Json<ApiResponse<SubjectResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = Subject::find_by_id(subject_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup subject {} for update: {}", subject_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Subject with ID {} not found for update", subject_id);
            subject_not_found()
        })?;

    ensure_faculty_resolves(&state, &request.faculty).await?;

    // Captured before the write so the reconciler can unassign the previous
    // faculty member.
    let prev_faculty = existing.faculty.clone();

    let mut active: subject::ActiveModel = existing.into();
    active.code = Set(request.code.clone());
    active.name = Set(request.name.clone());
    active.department = Set(request.department.clone());
    active.semester = Set(request.semester);
    active.faculty = Set(request.faculty.clone());

    let updated = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update subject {}: {}", subject_id, e);
        registrar_error_response(e.into())
    })?;

    info!("Subject with ID {} updated successfully", subject_id);
    refresh_dashboard(&state.db).await;

    if let Err(e) = AssignmentReconciler::new()
        .reconcile(
            &state.db,
            Some(&updated.faculty),
            &updated.code,
            Some(&prev_faculty),
        )
        .await
    {
        error!("Assignment reconciliation failed for {}: {}", updated.code, e);
    }

    Ok(Json(ApiResponse {
        data: SubjectResponse::from(updated),
        message: "Subject updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a subject
#[utoipa::path(
    delete,
    path = "/api/subjects/{subject_id}",
    tag = "subjects",
    params(
        ("subject_id" = i32, Path, description = "Subject ID"),
    ),
    responses(
        (status = 200, description = "Subject deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_subject(
    Path(subject_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = Subject::delete_by_id(subject_id)
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete subject {}: {}", subject_id, e);
            registrar_error_response(e.into())
        })?;

    if result.rows_affected == 0 {
        warn!("Subject with ID {} not found for deletion", subject_id);
        return Err(subject_not_found());
    }

    info!("Subject with ID {} deleted successfully", subject_id);
    refresh_dashboard(&state.db).await;

    Ok(Json(ApiResponse {
        data: format!("Subject {} deleted", subject_id),
        message: "Subject deleted".to_string(),
        success: true,
    }))
}

async fn ensure_faculty_resolves(
    state: &AppState,
    identifier: &str,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let resolved = resolve_faculty(&state.db, identifier).await.map_err(|e| {
        error!("Faculty resolution failed: {}", e);
        registrar_error_response(e)
    })?;
    if resolved.is_none() {
        warn!(identifier, "subject write rejected, faculty does not resolve");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Faculty not found. Please enter a valid faculty name or email."
                    .to_string(),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }
    Ok(())
}

fn subject_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Subject not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

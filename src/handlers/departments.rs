use crate::schemas::{
    registrar_error_response, write_error_response, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::department;
use model::entities::prelude::Department;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::dashboard::refresh_dashboard;

/// Request body for creating or replacing a department. `dept_id` is the
/// externally visible identifier the routes key on.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DepartmentPayload {
    pub dept_id: String,
    pub name: String,
    pub hod: String,
    pub total_faculty: Option<i32>,
    pub total_students: Option<i32>,
    pub established: Option<String>,
    pub contact: Option<String>,
}

/// Department response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: i32,
    pub dept_id: String,
    pub name: String,
    pub hod: String,
    pub total_faculty: i32,
    pub total_students: i32,
    pub established: Option<String>,
    pub contact: Option<String>,
}

impl From<department::Model> for DepartmentResponse {
    fn from(model: department::Model) -> Self {
        Self {
            id: model.id,
            dept_id: model.dept_id,
            name: model.name,
            hod: model.hod,
            total_faculty: model.total_faculty,
            total_students: model.total_students,
            established: model.established,
            contact: model.contact,
        }
    }
}

/// List all departments
#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "departments",
    responses(
        (status = 200, description = "Departments retrieved successfully", body = ApiResponse<Vec<DepartmentResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_departments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DepartmentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let departments = Department::find().all(&state.db).await.map_err(|e| {
        error!("Failed to retrieve departments: {}", e);
        registrar_error_response(e.into())
    })?;

    debug!("Retrieved {} departments", departments.len());
    Ok(Json(ApiResponse {
        data: departments.into_iter().map(DepartmentResponse::from).collect(),
        message: "Departments retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new department
#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "departments",
    request_body = DepartmentPayload,
    responses(
        (status = 201, description = "Department created successfully", body = ApiResponse<DepartmentResponse>),
        (status = 409, description = "Department already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(dept_id = %request.dept_id))]
pub async fn create_department(
    State(state): State<AppState>,
    Json(request): Json<DepartmentPayload>,
) -> Result<(StatusCode, Json<ApiResponse<DepartmentResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    let created = department::ActiveModel {
        dept_id: Set(request.dept_id.clone()),
        name: Set(request.name.clone()),
        hod: Set(request.hod.clone()),
        total_faculty: Set(request.total_faculty.unwrap_or(0)),
        total_students: Set(request.total_students.unwrap_or(0)),
        established: Set(request.established.clone()),
        contact: Set(request.contact.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create department '{}': {}", request.dept_id, e);
        write_error_response("Department", e)
    })?;

    info!("Department created successfully with ID: {}", created.id);
    refresh_dashboard(&state.db).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: DepartmentResponse::from(created),
            message: "Department created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a department by its external identifier
#[utoipa::path(
    put,
    path = "/api/departments/{dept_id}",
    tag = "departments",
    params(
        ("dept_id" = String, Path, description = "External department identifier"),
    ),
    request_body = DepartmentPayload,
    responses(
        (status = 200, description = "Department updated successfully", body = ApiResponse<DepartmentResponse>),
        (status = 404, description = "Department not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_department(
    Path(dept_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<DepartmentPayload>,
) -> Result<Json<ApiResponse<DepartmentResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = Department::find()
        .filter(department::Column::DeptId.eq(dept_id.clone()))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup department {} for update: {}", dept_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Department {} not found for update", dept_id);
            department_not_found()
        })?;

    let mut active: department::ActiveModel = existing.into();
    active.dept_id = Set(request.dept_id.clone());
    active.name = Set(request.name.clone());
    active.hod = Set(request.hod.clone());
    if let Some(total_faculty) = request.total_faculty {
        active.total_faculty = Set(total_faculty);
    }
    if let Some(total_students) = request.total_students {
        active.total_students = Set(total_students);
    }
    active.established = Set(request.established.clone());
    active.contact = Set(request.contact.clone());

    let updated = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update department {}: {}", dept_id, e);
        registrar_error_response(e.into())
    })?;

    info!("Department {} updated successfully", dept_id);
    refresh_dashboard(&state.db).await;

    Ok(Json(ApiResponse {
        data: DepartmentResponse::from(updated),
        message: "Department updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a department by its external identifier
#[utoipa::path(
    delete,
    path = "/api/departments/{dept_id}",
    tag = "departments",
    params(
        ("dept_id" = String, Path, description = "External department identifier"),
    ),
    responses(
        (status = 200, description = "Department deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Department not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_department(
    Path(dept_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = Department::delete_many()
        .filter(department::Column::DeptId.eq(dept_id.clone()))
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete department {}: {}", dept_id, e);
            registrar_error_response(e.into())
        })?;

    if result.rows_affected == 0 {
        warn!("Department {} not found for deletion", dept_id);
        return Err(department_not_found());
    }

    info!("Department {} deleted successfully", dept_id);
    refresh_dashboard(&state.db).await;

    Ok(Json(ApiResponse {
        data: format!("Department {} deleted", dept_id),
        message: "Department deleted".to_string(),
        success: true,
    }))
}

fn department_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Department not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

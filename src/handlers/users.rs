use crate::auth::AuthUser;
use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::user::{self, UserRole};
use model::entities::{faculty, prelude::Faculty};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// A user account without its password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    #[schema(value_type = String)]
    pub role: UserRole,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub dob: NaiveDate,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub roll_no: Option<String>,
    pub designation: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            role: model.role,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            dob: model.dob,
            department: model.department,
            semester: model.semester,
            roll_no: model.roll_no,
            designation: model.designation,
        }
    }
}

/// Name and email projection used by the admin listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleQuery {
    pub role: Option<String>,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub roll_no: Option<String>,
    pub designation: Option<String>,
}

/// List users with a given role
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(
        ("role" = Option<String>, Query, description = "Role to filter by (student or faculty)"),
    ),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users_by_role(
    Query(query): Query<RoleQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let role = match query.role.as_deref() {
        Some("student") => UserRole::Student,
        Some("faculty") => UserRole::Faculty,
        _ => {
            warn!(role = ?query.role, "rejected user listing with invalid role filter");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Role must be student or faculty".to_string(),
                    code: "VALIDATION_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    let users = user::Entity::find()
        .filter(user::Column::Role.eq(role))
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to retrieve users: {}", e);
            registrar_error_response(e.into())
        })?;

    debug!("Retrieved {} users", users.len());
    Ok(Json(ApiResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        message: "Users retrieved successfully".to_string(),
        success: true,
    }))
}

/// List admin accounts (name and email only)
#[utoipa::path(
    get,
    path = "/api/users/admins",
    tag = "users",
    responses(
        (status = 200, description = "Admins retrieved successfully", body = ApiResponse<Vec<AdminResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_admins(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AdminResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let admins = user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Admin))
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to retrieve admins: {}", e);
            registrar_error_response(e.into())
        })?;

    let data = admins
        .into_iter()
        .map(|a| AdminResponse {
            id: a.id,
            name: a.name,
            email: a.email,
        })
        .collect();
    Ok(Json(ApiResponse {
        data,
        message: "Admins retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    _auth: AuthUser,
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let found = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to retrieve user {}: {}", user_id, e);
            registrar_error_response(e.into())
        })?;

    match found {
        Some(model) => Ok(Json(ApiResponse {
            data: UserResponse::from(model),
            message: "User retrieved successfully".to_string(),
            success: true,
        })),
        None => {
            warn!("User with ID {} not found", user_id);
            Err(not_found())
        }
    }
}

/// Update a user. Faculty users also have their faculty record synced by
/// email so the two stay in agreement.
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    _auth: AuthUser,
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup user {} for update: {}", user_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("User with ID {} not found for update", user_id);
            not_found()
        })?;

    let role = existing.role;
    let mut active: user::ActiveModel = existing.into();
    if let Some(name) = request.name.clone() {
        active.name = Set(name);
    }
    if let Some(email) = request.email.clone() {
        active.email = Set(email);
    }
    if let Some(phone) = request.phone.clone() {
        active.phone = Set(phone);
    }
    if let Some(address) = request.address.clone() {
        active.address = Set(address);
    }
    if let Some(dob) = request.dob {
        active.dob = Set(dob);
    }
    if let Some(department) = request.department.clone() {
        active.department = Set(Some(department));
    }
    if let Some(semester) = request.semester.clone() {
        active.semester = Set(Some(semester));
    }
    if let Some(roll_no) = request.roll_no.clone() {
        active.roll_no = Set(Some(roll_no));
    }
    if let Some(designation) = request.designation.clone() {
        active.designation = Set(Some(designation));
    }

    let updated = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update user {}: {}", user_id, e);
        registrar_error_response(e.into())
    })?;

    if role == UserRole::Faculty {
        sync_faculty_record(&state, &updated, &request).await?;
    }

    info!("User with ID {} updated successfully", user_id);
    Ok(Json(ApiResponse {
        data: UserResponse::from(updated),
        message: "User updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a user, along with any faculty record sharing its email.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup user {} for deletion: {}", user_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("User with ID {} not found for deletion", user_id);
            not_found()
        })?;

    let email = existing.email.clone();
    user::Entity::delete_by_id(user_id)
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete user {}: {}", user_id, e);
            registrar_error_response(e.into())
        })?;

    // Keep the faculty collection consistent with the account deletion.
    let deleted = Faculty::delete_many()
        .filter(faculty::Column::Email.eq(email.clone()))
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete faculty record for {}: {}", email, e);
            registrar_error_response(e.into())
        })?;
    if deleted.rows_affected > 0 {
        debug!("Deleted {} faculty record(s) for {}", deleted.rows_affected, email);
    }

    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(ApiResponse {
        data: format!("User {} deleted", user_id),
        message: "User deleted".to_string(),
        success: true,
    }))
}

async fn sync_faculty_record(
    state: &AppState,
    updated: &user::Model,
    request: &UpdateUserRequest,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let found = Faculty::find()
        .filter(faculty::Column::Email.eq(updated.email.clone()))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup faculty record for sync: {}", e);
            registrar_error_response(e.into())
        })?;

    let Some(record) = found else {
        debug!(email = %updated.email, "no faculty record to sync");
        return Ok(());
    };

    let mut active: faculty::ActiveModel = record.into();
    if let Some(name) = request.name.clone() {
        active.name = Set(name);
    }
    if let Some(phone) = request.phone.clone() {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = request.address.clone() {
        active.address = Set(address);
    }
    if let Some(dob) = request.dob {
        active.dob = Set(dob);
    }
    if let Some(department) = request.department.clone() {
        active.department = Set(department);
    }
    if let Some(semester) = request.semester.clone() {
        active.semester = Set(semester);
    }
    if let Some(designation) = request.designation.clone() {
        active.designation = Set(designation);
    }
    active.update(&state.db).await.map_err(|e| {
        error!("Failed to sync faculty record: {}", e);
        registrar_error_response(e.into())
    })?;
    debug!(email = %updated.email, "faculty record synced with user update");
    Ok(())
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "User not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

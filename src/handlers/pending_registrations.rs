use crate::auth;
use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use model::entities::pending_registration::{self, RegistrationStatus};
use model::entities::user::UserRole;
use registrar::approval::{self, RegistrationInput};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::users::UserResponse;

/// Self-registration request. The password is hashed before the request
/// leaves this handler.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: String,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub roll_no: Option<String>,
    pub designation: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// A pending registration as returned to the admin review page. The
/// password hash never leaves the database.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistrationResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub roll_no: Option<String>,
    pub designation: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl From<pending_registration::Model> for PendingRegistrationResponse {
    fn from(model: pending_registration::Model) -> Self {
        let status = match model.status {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        };
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role.as_str().to_string(),
            department: model.department,
            semester: model.semester,
            roll_no: model.roll_no,
            designation: model.designation,
            phone_number: model.phone_number,
            address: model.address,
            date_of_birth: model.date_of_birth,
            status: status.to_string(),
            created_at: model.created_at,
        }
    }
}

/// Submit a registration request for admin review
#[utoipa::path(
    post,
    path = "/api/pending-registrations",
    tag = "registrations",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration request submitted", body = ApiResponse<PendingRegistrationResponse>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Duplicate registration", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email, role = %request.role))]
pub async fn submit_registration(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PendingRegistrationResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    if let Err(e) = request.validate() {
        warn!("Registration request failed validation: {}", e);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Validation failed: {}", e),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }

    let role = match request.role.trim().to_lowercase().as_str() {
        "student" => UserRole::Student,
        "faculty" => UserRole::Faculty,
        "admin" => UserRole::Admin,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Role must be student or faculty".to_string(),
                    code: "VALIDATION_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    };

    let password_hash = auth::hash_password(&request.password).map_err(|e| {
        error!("Failed to hash registration password: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
                code: "INTERNAL_ERROR".to_string(),
                success: false,
            }),
        )
    })?;

    let input = RegistrationInput {
        name: request.name,
        email: request.email,
        password_hash,
        role,
        department: request.department,
        semester: request.semester,
        roll_no: request.roll_no,
        designation: request.designation,
        phone_number: request.phone_number,
        address: request.address,
        date_of_birth: request.date_of_birth,
    };

    let saved = approval::submit(&state.db, input).await.map_err(|e| {
        warn!("Registration submission rejected: {}", e);
        registrar_error_response(e)
    })?;

    info!(registration_id = saved.id, "registration request recorded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: PendingRegistrationResponse::from(saved),
            message: "Registration request submitted.".to_string(),
            success: true,
        }),
    ))
}

/// List registration requests waiting for a decision
#[utoipa::path(
    get,
    path = "/api/pending-registrations",
    tag = "registrations",
    responses(
        (status = 200, description = "Pending registrations retrieved", body = ApiResponse<Vec<PendingRegistrationResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_pending_registrations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PendingRegistrationResponse>>>, (StatusCode, Json<ErrorResponse>)>
{
    let pending = approval::list_pending(&state.db).await.map_err(|e| {
        error!("Failed to list pending registrations: {}", e);
        registrar_error_response(e)
    })?;

    debug!("Retrieved {} pending registrations", pending.len());
    Ok(Json(ApiResponse {
        data: pending
            .into_iter()
            .map(PendingRegistrationResponse::from)
            .collect(),
        message: "Pending registrations retrieved".to_string(),
        success: true,
    }))
}

/// Approve a pending registration, creating the user and role record
#[utoipa::path(
    post,
    path = "/api/pending-registrations/{registration_id}/approve",
    tag = "registrations",
    params(
        ("registration_id" = i32, Path, description = "Pending registration ID"),
    ),
    responses(
        (status = 200, description = "Registration approved", body = ApiResponse<UserResponse>),
        (status = 400, description = "Required fields are missing", body = ErrorResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn approve_registration(
    Path(registration_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let created = approval::approve(&state.db, registration_id)
        .await
        .map_err(|e| {
            warn!("Approval of registration {} failed: {}", registration_id, e);
            registrar_error_response(e)
        })?;

    info!(user_id = created.id, "registration approved");
    super::dashboard::refresh_dashboard(&state.db).await;

    Ok(Json(ApiResponse {
        data: UserResponse::from(created),
        message: "Registration approved.".to_string(),
        success: true,
    }))
}

/// Reject a pending registration
#[utoipa::path(
    post,
    path = "/api/pending-registrations/{registration_id}/reject",
    tag = "registrations",
    params(
        ("registration_id" = i32, Path, description = "Pending registration ID"),
    ),
    responses(
        (status = 200, description = "Registration rejected", body = ApiResponse<PendingRegistrationResponse>),
        (status = 404, description = "Registration not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn reject_registration(
    Path(registration_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PendingRegistrationResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let rejected = approval::reject(&state.db, registration_id)
        .await
        .map_err(|e| {
            warn!("Rejection of registration {} failed: {}", registration_id, e);
            registrar_error_response(e)
        })?;

    info!(registration_id = rejected.id, "registration rejected");
    Ok(Json(ApiResponse {
        data: PendingRegistrationResponse::from(rejected),
        message: "Registration rejected.".to_string(),
        success: true,
    }))
}

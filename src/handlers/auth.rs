use crate::auth::{create_token, verify_password};
use crate::handlers::users::UserResponse;
use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::user::{self, UserRole};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

/// Login credentials. The role is part of the credentials: a student
/// logging in through the faculty form is rejected.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

fn role_name(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Faculty => "faculty",
        UserRole::Student => "student",
    }
}

fn login_rejection(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "VALIDATION_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Log in an approved user
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ErrorResponse>)> {
    // Email first; the error message must not reveal whether the role or
    // the password was the mismatch for an unknown address.
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.clone()))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to look up user for login: {}", e);
            registrar_error_response(e.into())
        })?;

    let Some(found) = found else {
        warn!("login attempt for unknown email");
        return Err(login_rejection(
            "User not found or not approved wait please for admin approval .",
        ));
    };

    if role_name(found.role) != request.role {
        warn!(expected = role_name(found.role), got = %request.role, "login role mismatch");
        return Err(login_rejection("Invalid credentials"));
    }

    if !verify_password(&request.password, &found.password_hash) {
        warn!(user_id = found.id, "login password mismatch");
        return Err(login_rejection("Password is incorrect"));
    }

    let token = create_token(&found, &state.jwt_secret).map_err(|e| {
        error!("Failed to create session token: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
                code: "TOKEN_ERROR".to_string(),
                success: false,
            }),
        )
    })?;

    info!(user_id = found.id, "login successful");
    Ok(Json(ApiResponse {
        data: LoginResponse {
            user: UserResponse::from(found),
            token,
        },
        message: "Login successful".to_string(),
        success: true,
    }))
}

use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use model::entities::prelude::{Faculty, FacultyProfile, User};
use model::entities::user::UserRole;
use model::entities::{faculty, faculty_profile, user};
use model::SubjectCodes;
use registrar::faculty_link::{get_or_create_faculty_for_user, get_or_create_profile};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::faculty::faculty_not_found;

/// Combined view over a user, their faculty record and the extended
/// profile. This is what the profile page renders.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FacultyProfileView {
    pub user_id: i32,
    #[schema(value_type = String)]
    pub user_role: UserRole,
    pub faculty_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub address: String,
    pub designation: String,
    pub dob: NaiveDate,
    #[schema(value_type = String)]
    pub status: faculty::FacultyStatus,
    pub semester: String,
    pub subjects: Vec<String>,
    pub qualification: String,
    pub experience: String,
    pub joining_date: NaiveDateTime,
    pub profile_subjects: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn combined_view(
    user_row: &user::Model,
    faculty_row: &faculty::Model,
    profile: &faculty_profile::Model,
) -> FacultyProfileView {
    FacultyProfileView {
        user_id: user_row.id,
        user_role: user_row.role,
        faculty_id: faculty_row.id,
        name: faculty_row.name.clone(),
        email: faculty_row.email.clone(),
        phone: faculty_row.phone.clone(),
        department: faculty_row.department.clone(),
        address: faculty_row.address.clone(),
        designation: faculty_row.designation.clone(),
        dob: faculty_row.dob,
        status: faculty_row.status,
        semester: faculty_row.semester.clone(),
        subjects: faculty_row.subjects.0.clone(),
        qualification: profile.qualification.clone(),
        experience: profile.experience.clone(),
        joining_date: profile.joining_date,
        profile_subjects: profile.profile_subjects.0.clone(),
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}

/// Fields a faculty member may edit on their own profile page.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub address: Option<String>,
    pub designation: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub joining_date: Option<NaiveDateTime>,
    pub subjects: Option<Vec<String>>,
}

/// Get the profile for the faculty member behind a user account. The
/// faculty record and profile are created on first read if absent.
#[utoipa::path(
    get,
    path = "/api/faculty-profile/user/{user_id}",
    tag = "faculty-profile",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<FacultyProfileView>),
        (status = 403, description = "User is not a faculty member", body = ErrorResponse),
        (status = 404, description = "User or faculty record not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profile_for_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FacultyProfileView>>, (StatusCode, Json<ErrorResponse>)> {
    let user_row = User::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup user {}: {}", user_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            user_not_found()
        })?;

    if user_row.role != UserRole::Faculty {
        warn!(user_id, role = ?user_row.role, "profile page denied for non-faculty user");
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Access denied. Only faculty members can view this page.".to_string(),
                code: "AUTHORIZATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }

    let mut faculty_row = get_or_create_faculty_for_user(&state.db, &user_row)
        .await
        .map_err(|e| {
            error!("Failed to resolve faculty for user {}: {}", user_id, e);
            registrar_error_response(e)
        })?;

    let profile = get_or_create_profile(&state.db, &faculty_row)
        .await
        .map_err(|e| {
            error!("Failed to load profile for faculty {}: {}", faculty_row.id, e);
            registrar_error_response(e)
        })?
        .ok_or_else(|| {
            warn!(faculty_id = faculty_row.id, "faculty has no user reference");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Faculty record not found for this user.".to_string(),
                    code: "NOT_FOUND".to_string(),
                    success: false,
                }),
            )
        })?;

    // The profile's subject list is the reconciled copy; pull the faculty
    // row back in line when the two drifted apart.
    if profile.profile_subjects != faculty_row.subjects {
        debug!(faculty_id = faculty_row.id, "syncing faculty subjects from profile");
        let mut active: faculty::ActiveModel = faculty_row.into();
        active.subjects = Set(profile.profile_subjects.clone());
        faculty_row = active.update(&state.db).await.map_err(|e| {
            error!("Failed to sync faculty subjects: {}", e);
            registrar_error_response(e.into())
        })?;
    }

    Ok(Json(ApiResponse {
        data: combined_view(&user_row, &faculty_row, &profile),
        message: "Profile retrieved successfully".to_string(),
        success: true,
    }))
}

/// List all faculty profiles
#[utoipa::path(
    get,
    path = "/api/faculty-profile",
    tag = "faculty-profile",
    responses(
        (status = 200, description = "Profiles retrieved successfully", body = ApiResponse<Vec<FacultyProfileView>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profiles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FacultyProfileView>>>, (StatusCode, Json<ErrorResponse>)> {
    let profiles = FacultyProfile::find().all(&state.db).await.map_err(|e| {
        error!("Failed to retrieve faculty profiles: {}", e);
        registrar_error_response(e.into())
    })?;

    let mut views = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let faculty_row = Faculty::find_by_id(profile.faculty_id)
            .one(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to load faculty {}: {}", profile.faculty_id, e);
                registrar_error_response(e.into())
            })?;
        let user_row = User::find_by_id(profile.user_id)
            .one(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to load user {}: {}", profile.user_id, e);
                registrar_error_response(e.into())
            })?;
        if let (Some(faculty_row), Some(user_row)) = (faculty_row, user_row) {
            views.push(combined_view(&user_row, &faculty_row, &profile));
        } else {
            warn!(profile_id = profile.id, "profile references a missing faculty or user");
        }
    }

    debug!("Retrieved {} faculty profiles", views.len());
    Ok(Json(ApiResponse {
        data: views,
        message: "Profiles retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a profile by faculty ID
#[utoipa::path(
    get,
    path = "/api/faculty-profile/{faculty_id}",
    tag = "faculty-profile",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<FacultyProfileView>),
        (status = 404, description = "Faculty or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profile(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FacultyProfileView>>, (StatusCode, Json<ErrorResponse>)> {
    let faculty_row = Faculty::find_by_id(faculty_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup faculty {}: {}", faculty_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Faculty with ID {} not found", faculty_id);
            faculty_not_found()
        })?;

    let user_row = match faculty_row.user_id {
        Some(user_id) => User::find_by_id(user_id).one(&state.db).await.map_err(|e| {
            error!("Failed to lookup user {}: {}", user_id, e);
            registrar_error_response(e.into())
        })?,
        None => None,
    }
    .ok_or_else(|| {
        warn!(faculty_id, "no user behind faculty record");
        user_not_found()
    })?;

    let profile = get_or_create_profile(&state.db, &faculty_row)
        .await
        .map_err(|e| {
            error!("Failed to load profile for faculty {}: {}", faculty_id, e);
            registrar_error_response(e)
        })?
        .ok_or_else(|| {
            warn!(faculty_id, "faculty has no user reference");
            faculty_not_found()
        })?;

    Ok(Json(ApiResponse {
        data: combined_view(&user_row, &faculty_row, &profile),
        message: "Profile retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a faculty member's record and profile in one call
#[utoipa::path(
    put,
    path = "/api/faculty-profile/{faculty_id}",
    tag = "faculty-profile",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID, or a user ID when no faculty record exists yet"),
    ),
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<FacultyProfileView>),
        (status = 404, description = "Faculty not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_profile(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<ApiResponse<FacultyProfileView>>, (StatusCode, Json<ErrorResponse>)> {
    // The profile page sends the faculty id when one exists, but a freshly
    // approved faculty user may only have a user id. Fall back to
    // materializing the faculty record from that user.
    let faculty_row = match Faculty::find_by_id(faculty_id).one(&state.db).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            let fallback_user = User::find()
                .filter(
                    user::Column::Id
                        .eq(faculty_id)
                        .and(user::Column::Role.eq(UserRole::Faculty)),
                )
                .one(&state.db)
                .await
                .map_err(|e| {
                    error!("Failed fallback user lookup for {}: {}", faculty_id, e);
                    registrar_error_response(e.into())
                })?
                .ok_or_else(|| {
                    warn!("No faculty or faculty user with ID {}", faculty_id);
                    faculty_not_found()
                })?;
            get_or_create_faculty_for_user(&state.db, &fallback_user)
                .await
                .map_err(|e| {
                    error!("Failed to materialize faculty for user {}: {}", faculty_id, e);
                    registrar_error_response(e)
                })?
        }
        Err(e) => {
            error!("Failed to lookup faculty {}: {}", faculty_id, e);
            return Err(registrar_error_response(e.into()));
        }
    };

    let user_row = match faculty_row.user_id {
        Some(user_id) => User::find_by_id(user_id).one(&state.db).await.map_err(|e| {
            error!("Failed to lookup user {}: {}", user_id, e);
            registrar_error_response(e.into())
        })?,
        None => None,
    }
    .ok_or_else(|| {
        warn!(faculty_id = faculty_row.id, "no user behind faculty record");
        user_not_found()
    })?;

    let subjects = request.subjects.clone().map(SubjectCodes::from);

    let mut active: faculty::ActiveModel = faculty_row.into();
    if let Some(name) = request.name.clone() {
        active.name = Set(name);
    }
    if let Some(phone) = request.phone.clone() {
        active.phone = Set(Some(phone));
    }
    if let Some(department) = request.department.clone() {
        active.department = Set(department);
    }
    if let Some(address) = request.address.clone() {
        active.address = Set(address);
    }
    if let Some(designation) = request.designation.clone() {
        active.designation = Set(designation);
    }
    if let Some(ref subjects) = subjects {
        active.subjects = Set(subjects.clone());
    }
    let faculty_row = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update faculty record: {}", e);
        registrar_error_response(e.into())
    })?;

    let existing_profile = FacultyProfile::find()
        .filter(faculty_profile::Column::FacultyId.eq(faculty_row.id))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to load profile for faculty {}: {}", faculty_row.id, e);
            registrar_error_response(e.into())
        })?;

    let now = Utc::now().naive_utc();
    let profile = match existing_profile {
        Some(profile) => {
            let mut active: faculty_profile::ActiveModel = profile.into();
            if let Some(qualification) = request.qualification.clone() {
                active.qualification = Set(qualification);
            }
            if let Some(experience) = request.experience.clone() {
                active.experience = Set(experience);
            }
            if let Some(joining_date) = request.joining_date {
                active.joining_date = Set(joining_date);
            }
            if let Some(ref subjects) = subjects {
                active.profile_subjects = Set(subjects.clone());
            }
            active.updated_at = Set(now);
            active.update(&state.db).await.map_err(|e| {
                error!("Failed to update profile: {}", e);
                registrar_error_response(e.into())
            })?
        }
        None => {
            let Some(user_id) = faculty_row.user_id else {
                warn!(faculty_id = faculty_row.id, "cannot create profile without user reference");
                return Err(user_not_found());
            };
            faculty_profile::ActiveModel {
                faculty_id: Set(faculty_row.id),
                user_id: Set(user_id),
                qualification: Set(request.qualification.clone().unwrap_or_default()),
                experience: Set(request.experience.clone().unwrap_or_default()),
                joining_date: Set(request.joining_date.unwrap_or(now)),
                profile_subjects: Set(subjects.unwrap_or_else(|| faculty_row.subjects.clone())),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to create profile: {}", e);
                registrar_error_response(e.into())
            })?
        }
    };

    info!(faculty_id = faculty_row.id, "faculty profile updated");
    Ok(Json(ApiResponse {
        data: combined_view(&user_row, &faculty_row, &profile),
        message: "Profile updated successfully".to_string(),
        success: true,
    }))
}

fn user_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "User not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

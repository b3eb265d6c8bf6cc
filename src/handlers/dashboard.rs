use crate::schemas::{registrar_error_response, ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{NaiveDateTime, Utc};
use model::entities::dashboard_stats;
use model::entities::prelude::DashboardStats;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

/// Entity counts computed from the live tables at request time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_students: i32,
    pub total_faculty: i32,
    pub departments: i32,
    pub subjects: i32,
}

/// The cached stats row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    pub id: i32,
    pub total_students: i32,
    pub total_faculty: i32,
    pub departments: i32,
    pub subjects: i32,
    pub updated_at: NaiveDateTime,
}

impl From<dashboard_stats::Model> for DashboardStatsResponse {
    fn from(model: dashboard_stats::Model) -> Self {
        Self {
            id: model.id,
            total_students: model.total_students,
            total_faculty: model.total_faculty,
            departments: model.departments,
            subjects: model.subjects,
            updated_at: model.updated_at,
        }
    }
}

/// Raw overwrite payload for the cached stats row.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsPayload {
    pub total_students: i32,
    pub total_faculty: i32,
    pub departments: i32,
    pub subjects: i32,
}

/// Refreshes the cached stats row after a mutation. Failures are logged,
/// never surfaced; the mutation that triggered the refresh already
/// succeeded.
pub(crate) async fn refresh_dashboard(db: &DatabaseConnection) {
    if let Err(e) = registrar::dashboard::recompute(db).await {
        error!("Failed to refresh dashboard stats: {}", e);
    }
}

/// Get dashboard statistics computed from the live tables
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<DashboardCounts>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dashboard_counts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardCounts>>, (StatusCode, Json<ErrorResponse>)> {
    let counts = registrar::dashboard::live_counts(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to compute dashboard counts: {}", e);
            registrar_error_response(e)
        })?;

    debug!(
        total_students = counts.total_students,
        total_faculty = counts.total_faculty,
        "dashboard counts computed"
    );
    Ok(Json(ApiResponse {
        data: DashboardCounts {
            total_students: counts.total_students,
            total_faculty: counts.total_faculty,
            departments: counts.departments,
            subjects: counts.subjects,
        },
        message: "Statistics retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get the cached stats row, creating it on first read
#[utoipa::path(
    get,
    path = "/api/dashboard-stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Stats retrieved successfully", body = ApiResponse<DashboardStatsResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStatsResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = DashboardStats::find().one(&state.db).await.map_err(|e| {
        error!("Failed to load dashboard stats: {}", e);
        registrar_error_response(e.into())
    })?;

    let stats = match existing {
        Some(row) => row,
        None => registrar::dashboard::recompute(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to create dashboard stats: {}", e);
                registrar_error_response(e)
            })?,
    };

    Ok(Json(ApiResponse {
        data: DashboardStatsResponse::from(stats),
        message: "Stats retrieved successfully".to_string(),
        success: true,
    }))
}

/// Overwrite the cached stats row. The aggregator will replace these
/// numbers on the next mutation.
#[utoipa::path(
    put,
    path = "/api/dashboard-stats",
    tag = "dashboard",
    request_body = DashboardStatsPayload,
    responses(
        (status = 200, description = "Stats updated successfully", body = ApiResponse<DashboardStatsResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_dashboard_stats(
    State(state): State<AppState>,
    Json(request): Json<DashboardStatsPayload>,
) -> Result<Json<ApiResponse<DashboardStatsResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = DashboardStats::find().one(&state.db).await.map_err(|e| {
        error!("Failed to load dashboard stats for update: {}", e);
        registrar_error_response(e.into())
    })?;

    let now = Utc::now().naive_utc();
    let saved = match existing {
        Some(row) => {
            let mut active: dashboard_stats::ActiveModel = row.into();
            active.total_students = Set(request.total_students);
            active.total_faculty = Set(request.total_faculty);
            active.departments = Set(request.departments);
            active.subjects = Set(request.subjects);
            active.updated_at = Set(now);
            active.update(&state.db).await
        }
        None => {
            dashboard_stats::ActiveModel {
                total_students: Set(request.total_students),
                total_faculty: Set(request.total_faculty),
                departments: Set(request.departments),
                subjects: Set(request.subjects),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&state.db)
            .await
        }
    }
    .map_err(|e| {
        error!("Failed to update dashboard stats: {}", e);
        registrar_error_response(e.into())
    })?;

    Ok(Json(ApiResponse {
        data: DashboardStatsResponse::from(saved),
        message: "Stats updated successfully".to_string(),
        success: true,
    }))
}

use crate::schemas::{
    registrar_error_response, write_error_response, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use common::normalize_department;
use model::entities::prelude::{Marksheet, Student};
use model::entities::student::{self, StudentStatus};
use model::entities::marksheet;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use super::dashboard::refresh_dashboard;
use super::marksheets::MarksheetResponse;

/// Request body for creating or replacing a student. The semester is
/// accepted as either a number or a numeric string; clients send both.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StudentPayload {
    pub roll_no: Option<String>,
    pub name: String,
    pub department: String,
    #[serde(deserialize_with = "coerce_semester")]
    #[schema(value_type = i32)]
    pub semester: i32,
    pub email: String,
    pub phone: String,
    #[schema(value_type = Option<String>)]
    pub status: Option<StudentStatus>,
    pub address: String,
    pub dob: NaiveDate,
    pub user_id: i32,
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

/// Student response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub roll_no: Option<String>,
    pub roll_number: Option<String>,
    pub name: String,
    pub department: String,
    pub semester: i32,
    pub email: String,
    pub phone: String,
    #[schema(value_type = String)]
    pub status: StudentStatus,
    pub address: String,
    pub dob: NaiveDate,
    pub user_id: i32,
}

impl From<student::Model> for StudentResponse {
    fn from(model: student::Model) -> Self {
        Self {
            id: model.id,
            roll_no: model.roll_no,
            roll_number: model.roll_number,
            name: model.name,
            department: model.department,
            semester: model.semester,
            email: model.email,
            phone: model.phone,
            status: model.status,
            address: model.address,
            dob: model.dob,
            user_id: model.user_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// A student and their recorded marks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentSearchResponse {
    pub student: StudentResponse,
    pub marks: Vec<MarksheetResponse>,
}

async fn all_students(state: &AppState) -> Result<Vec<StudentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let students = Student::find().all(&state.db).await.map_err(|e| {
        error!("Failed to retrieve students: {}", e);
        registrar_error_response(e.into())
    })?;
    Ok(students.into_iter().map(StudentResponse::from).collect())
}

/// List all students
#[utoipa::path(
    get,
    path = "/api/students",
    tag = "students",
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<StudentResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StudentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let data = all_students(&state).await?;
    debug!("Retrieved {} students", data.len());
    Ok(Json(ApiResponse {
        data,
        message: "Students retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new student. Responds with the full refreshed student list.
#[utoipa::path(
    post,
    path = "/api/students",
    tag = "students",
    request_body = StudentPayload,
    responses(
        (status = 201, description = "Student created successfully", body = ApiResponse<Vec<StudentResponse>>),
        (status = 409, description = "Student already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<StudentPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<StudentResponse>>>), (StatusCode, Json<ErrorResponse>)>
{
    let created = student::ActiveModel {
        roll_no: Set(request.roll_no.clone()),
        name: Set(request.name.clone()),
        department: Set(normalize_department(&request.department)),
        semester: Set(request.semester),
        email: Set(request.email.clone()),
        phone: Set(request.phone.clone()),
        status: Set(request.status.unwrap_or(StudentStatus::Active)),
        address: Set(request.address.clone()),
        dob: Set(request.dob),
        user_id: Set(request.user_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create student '{}': {}", request.email, e);
        write_error_response("Student", e)
    })?;

    info!("Student created successfully with ID: {}", created.id);
    refresh_dashboard(&state.db).await;

    let data = all_students(&state).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            message: "Student created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a student. Responds with the full refreshed student list.
#[utoipa::path(
    put,
    path = "/api/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    request_body = StudentPayload,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<Vec<StudentResponse>>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<StudentPayload>,
) -> Result<Json<ApiResponse<Vec<StudentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = Student::find_by_id(student_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to lookup student {} for update: {}", student_id, e);
            registrar_error_response(e.into())
        })?
        .ok_or_else(|| {
            warn!("Student with ID {} not found for update", student_id);
            student_not_found()
        })?;

    let mut active: student::ActiveModel = existing.into();
    active.roll_no = Set(request.roll_no.clone());
    active.name = Set(request.name.clone());
    active.department = Set(normalize_department(&request.department));
    active.semester = Set(request.semester);
    active.email = Set(request.email.clone());
    active.phone = Set(request.phone.clone());
    if let Some(status) = request.status {
        active.status = Set(status);
    }
    active.address = Set(request.address.clone());
    active.dob = Set(request.dob);
    active.update(&state.db).await.map_err(|e| {
        error!("Failed to update student {}: {}", student_id, e);
        registrar_error_response(e.into())
    })?;

    info!("Student with ID {} updated successfully", student_id);
    refresh_dashboard(&state.db).await;

    let data = all_students(&state).await?;
    Ok(Json(ApiResponse {
        data,
        message: "Student updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a student. Responds with the full refreshed student list.
#[utoipa::path(
    delete,
    path = "/api/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = ApiResponse<Vec<StudentResponse>>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StudentResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let result = Student::delete_by_id(student_id)
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete student {}: {}", student_id, e);
            registrar_error_response(e.into())
        })?;

    if result.rows_affected == 0 {
        warn!("Student with ID {} not found for deletion", student_id);
        return Err(student_not_found());
    }

    info!("Student with ID {} deleted successfully", student_id);
    refresh_dashboard(&state.db).await;

    let data = all_students(&state).await?;
    Ok(Json(ApiResponse {
        data,
        message: "Student deleted successfully".to_string(),
        success: true,
    }))
}

/// Search for a student by roll number, name or email and return their
/// marks. Matching is case-insensitive substring.
#[utoipa::path(
    get,
    path = "/api/students/search",
    tag = "students",
    params(
        ("query" = String, Query, description = "Roll number, name or email fragment"),
    ),
    responses(
        (status = 200, description = "Student found", body = ApiResponse<StudentSearchResponse>),
        (status = 400, description = "Missing query parameter", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn search_students(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StudentSearchResponse>>, (StatusCode, Json<ErrorResponse>)> {
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

    let found = find_student_by_fragment(&state, needle).await?;
    let Some(found) = found else {
        warn!("No student matched search query");
        return Err(student_not_found());
    };

    let marks = Marksheet::find()
        .filter(marksheet::Column::StudentId.eq(found.id))
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to load marksheets for student {}: {}", found.id, e);
            registrar_error_response(e.into())
        })?;

    Ok(Json(ApiResponse {
        data: StudentSearchResponse {
            student: StudentResponse::from(found),
            marks: marks.into_iter().map(MarksheetResponse::from).collect(),
        },
        message: "Student retrieved successfully".to_string(),
        success: true,
    }))
}

pub(crate) async fn find_student_by_fragment(
    state: &AppState,
    fragment: &str,
) -> Result<Option<student::Model>, (StatusCode, Json<ErrorResponse>)> {
    let pattern = format!("%{}%", fragment.to_lowercase());
    Student::find()
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        student::Entity,
                        student::Column::RollNo,
                    ))))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        student::Entity,
                        student::Column::Name,
                    ))))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        student::Entity,
                        student::Column::Email,
                    ))))
                    .like(pattern),
                ),
        )
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Student search failed: {}", e);
            registrar_error_response(e.into())
        })
}

pub(crate) fn student_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Student not found".to_string(),
            code: "NOT_FOUND".to_string(),
            success: false,
        }),
    )
}
